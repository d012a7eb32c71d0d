//! A small, self-contained TrueType/OpenType parser for icon fonts.
//!
//! Decodes just enough of the sfnt container to enumerate glyphs, map
//! Unicode codepoints to them, recover PostScript glyph names, and rebuild
//! each glyph's quadratic outline as a normalized SVG path string inside a
//! `0 0 100 100` viewBox.
//!
//! ```no_run
//! use icons_font::Font;
//!
//! # fn main() -> Result<(), icons_font::FontError> {
//! let font = Font::parse(std::fs::read("icons.ttf").expect("font file"))?;
//! if let Some(glyph) = font.glyph_by_codepoint(0xF0001)? {
//!     println!("{}", glyph.to_svg_path(false, None)?);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod font;
mod geom;
mod glyf;
mod names;
mod outline;
mod reader;
pub mod tables;

pub use error::{FontError, FontResult};
pub use font::{Font, FontInfo, FontKind, SPECIMEN_COLUMNS, SPECIMEN_PADDING, SPECIMEN_SIZE};
pub use geom::{Point, Transform};
pub use glyf::{Glyph, GlyphPoint};
pub use outline::{BBoxBuilder, DebugBuilder, OutlineBuilder, SvgPathBuilder};
pub use reader::Reader;
