use crate::tables::Tag;

/// Errors produced while parsing a font buffer.
///
/// Header and required-table failures are fatal to [`crate::Font::parse`];
/// per-codepoint lookups report absent glyphs as `None` instead of erroring.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum FontError {
    #[error("unexpected end of font data")]
    Truncated,

    #[error("unknown sfnt version {0:#010X}")]
    UnknownSfntVersion(u32),

    #[error("bad head table magic {0:#010X}")]
    BadMagic(u32),

    #[error("required table {0} is missing")]
    MissingTable(Tag),

    #[error("no supported unicode cmap subtable, found (platform, encoding) pairs: {0:?}")]
    UnsupportedCmap(Vec<(u16, u16)>),

    #[error("unsupported cmap subtable format {0}")]
    UnsupportedCmapFormat(u16),

    #[error("only TrueType outlines are supported")]
    UnsupportedOutlineFormat,
}

pub type FontResult<T> = Result<T, FontError>;
