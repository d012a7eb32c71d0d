//! Font bundle acquisition: per-source fetchers plus the on-disk bundle
//! format they produce.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use icons_font::Font;
use icons_store::manifest::FontMetadata;
use sha2::{Digest as _, Sha256};

pub mod sources;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Font(#[from] icons_font::FontError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("IO error accessing {path}: {0}", path = .1.display())]
    Io(std::io::Error, PathBuf),

    #[error("unknown font source {0}")]
    UnknownSource(String),

    #[error("[{0}] malformed upstream metadata: {1}")]
    Metadata(&'static str, String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// A fetched font bundle: the parsed font plus its icon → codepoint map.
///
/// Construction drops icons whose glyph is missing or empty, so the map
/// only ever names icons the font can actually render.
#[derive(Debug)]
pub struct FontData {
    pub name: String,
    pub family: String,
    pub names: BTreeMap<String, u32>,
    font: Font,
}

impl FontData {
    pub fn new(
        name: impl Into<String>,
        raw_names: BTreeMap<String, u32>,
        font_bytes: Vec<u8>,
    ) -> FetchResult<Self> {
        let font = Font::parse(font_bytes)?;
        let mut names = BTreeMap::new();
        for (icon, codepoint) in raw_names {
            match font.glyph_by_codepoint(codepoint)? {
                Some(glyph) if !glyph.is_empty() => {
                    names.insert(icon, codepoint);
                }
                _ => {}
            }
        }
        Ok(Self {
            name: name.into(),
            family: font.name().family.clone(),
            names,
            font,
        })
    }

    #[must_use]
    pub fn font_bytes(&self) -> &[u8] {
        self.font.data()
    }

    /// Writes `<name>.json` and `<name>.ttf` into the bundle directory.
    pub fn save(&self, fonts_dir: &Path) -> FetchResult<()> {
        let metadata = FontMetadata {
            family: self.family.clone(),
            names: self.names.clone(),
        };
        let metadata_path = fonts_dir.join(format!("{}.json", self.name));
        fs::write(&metadata_path, serde_json::to_vec_pretty(&metadata)?)
            .map_err(|e| FetchError::Io(e, metadata_path))?;
        let font_path = fonts_dir.join(format!("{}.ttf", self.name));
        fs::write(&font_path, self.font.data()).map_err(|e| FetchError::Io(e, font_path))?;
        Ok(())
    }

    /// Reads a previously saved bundle back, or `None` when either file
    /// is missing.
    pub fn load(name: &str, fonts_dir: &Path) -> FetchResult<Option<Self>> {
        let metadata_path = fonts_dir.join(format!("{name}.json"));
        let font_path = fonts_dir.join(format!("{name}.ttf"));
        if !metadata_path.exists() || !font_path.exists() {
            return Ok(None);
        }
        let metadata: FontMetadata = serde_json::from_slice(
            &fs::read(&metadata_path).map_err(|e| FetchError::Io(e, metadata_path.clone()))?,
        )?;
        let font_bytes = fs::read(&font_path).map_err(|e| FetchError::Io(e, font_path))?;
        Self::new(name, metadata.names, font_bytes).map(Some)
    }

    /// Content hash deciding whether a bundle on disk needs rewriting:
    /// sha256 over the bundle name, every icon name and codepoint in map
    /// order, and the raw font bytes.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        for (icon, codepoint) in &self.names {
            hasher.update(icon.as_bytes());
            hasher.update(codepoint.to_string().as_bytes());
        }
        hasher.update(self.font.data());

        let mut hex = String::with_capacity(64);
        for byte in hasher.finalize() {
            let _ = write!(hex, "{byte:02x}");
        }
        hex
    }
}
