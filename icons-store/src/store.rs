//! SQLite-backed icon catalog.
//!
//! Rows are `(icon name → zlib-compressed SVG path)` joined to the font
//! bundle they came from; `update()` is incremental and idempotent.

use std::collections::HashMap;
use std::fs;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use icons_font::Font;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Connection as _, Row as _, SqliteConnection, query, query_scalar};

use crate::errors::{StoreError, StoreResult};
use crate::manifest::{FontEntry, FontMetadata};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS icons (
        id        INTEGER PRIMARY KEY,
        name      TEXT NOT NULL UNIQUE,
        codepoint INTEGER NOT NULL,
        svg       BLOB NOT NULL,
        font_id   INTEGER NOT NULL
    ) STRICT",
    "CREATE INDEX IF NOT EXISTS icon_name ON icons(name)",
    "CREATE TABLE IF NOT EXISTS fonts (
        id        INTEGER PRIMARY KEY,
        name      TEXT NOT NULL UNIQUE,
        family    TEXT NOT NULL,
        file      TEXT NOT NULL,
        modified  INTEGER NOT NULL
    ) STRICT",
];

const UPSERT_FONT: &str = "\
INSERT INTO fonts(name, family, file, modified) VALUES(?, ?, ?, ?)
ON CONFLICT(name)
DO UPDATE SET
    family=excluded.family,
    file=excluded.file,
    modified=excluded.modified
RETURNING id";

const UPSERT_ICON: &str = "\
INSERT INTO icons(name, codepoint, svg, font_id) VALUES(?, ?, ?, ?)
ON CONFLICT(name)
DO UPDATE SET
    codepoint=excluded.codepoint,
    svg=excluded.svg,
    font_id=excluded.font_id";

/// A font bundle row of the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDesc {
    pub font_id: i64,
    pub name: String,
    pub family: String,
    pub file: String,
    /// Bundle freshness as Unix-epoch seconds.
    pub modified: i64,
}

/// A single icon with its SVG path decompressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Icon {
    pub icon_id: i64,
    /// Globally unique `{font}-{icon}` name.
    pub name: String,
    pub codepoint: u32,
    pub svg: String,
    pub font: FontDesc,
}

/// The catalog: one SQLite connection, single writer per process.
///
/// Reads are safe to share once `update()` has returned.
#[derive(Debug)]
pub struct IconStore {
    descs_path: PathBuf,
    db_path: PathBuf,
    conn: SqliteConnection,
    font_descs: Option<HashMap<i64, FontDesc>>,
}

impl IconStore {
    /// Opens (or creates) the catalog database.
    ///
    /// A store with no icons at all is populated from the manifest right
    /// away, so first use does not need an explicit `update` run.
    pub async fn open(descs_path: PathBuf, db_path: Option<PathBuf>) -> StoreResult<Self> {
        let db_path = db_path.unwrap_or_else(default_db_path);
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e, parent.to_path_buf()))?;
        }
        debug!("opening icon store at {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let mut conn = SqliteConnection::connect_with(&options).await?;
        for statement in SCHEMA {
            query(statement).execute(&mut conn).await?;
        }

        let mut store = Self {
            descs_path,
            db_path,
            conn,
            font_descs: None,
        };
        if store.icon_count().await? == 0 {
            store.update().await?;
        }
        Ok(store)
    }

    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub async fn icon_count(&mut self) -> StoreResult<i64> {
        Ok(query_scalar("SELECT count(*) FROM icons")
            .fetch_one(&mut self.conn)
            .await?)
    }

    pub async fn icon_names(&mut self) -> StoreResult<Vec<String>> {
        Ok(query_scalar("SELECT name FROM icons")
            .fetch_all(&mut self.conn)
            .await?)
    }

    /// Looks a single icon up by its `{font}-{icon}` name.
    pub async fn get_icon(&mut self, name: &str) -> StoreResult<Option<Icon>> {
        let row = query("SELECT id, name, codepoint, svg, font_id FROM icons WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let font_id: i64 = row.get("font_id");
        let font = self
            .get_fonts()
            .await?
            .get(&font_id)
            .cloned()
            .ok_or(StoreError::MissingFont(font_id))?;
        Ok(Some(Icon {
            icon_id: row.get("id"),
            name: row.get("name"),
            codepoint: row.get::<i64, _>("codepoint") as u32,
            svg: decompress(row.get("svg"))?,
            font,
        }))
    }

    /// Every icon in the catalog, joined with its font descriptor.
    pub async fn get_icons(&mut self) -> StoreResult<Vec<Icon>> {
        let rows = query("SELECT id, name, codepoint, svg, font_id FROM icons")
            .fetch_all(&mut self.conn)
            .await?;
        let fonts = self.get_fonts().await?;

        let mut icons = Vec::with_capacity(rows.len());
        for row in rows {
            let font_id: i64 = row.get("font_id");
            let font = fonts
                .get(&font_id)
                .cloned()
                .ok_or(StoreError::MissingFont(font_id))?;
            icons.push(Icon {
                icon_id: row.get("id"),
                name: row.get("name"),
                codepoint: row.get::<i64, _>("codepoint") as u32,
                svg: decompress(row.get("svg"))?,
                font,
            });
        }
        Ok(icons)
    }

    /// Font descriptors keyed by row id, cached until the next `update()`.
    pub async fn get_fonts(&mut self) -> StoreResult<&HashMap<i64, FontDesc>> {
        if self.font_descs.is_none() {
            let rows = query("SELECT id, name, family, file, modified FROM fonts")
                .fetch_all(&mut self.conn)
                .await?;
            let descs = rows
                .into_iter()
                .map(|row| {
                    let font_id: i64 = row.get("id");
                    let desc = FontDesc {
                        font_id,
                        name: row.get("name"),
                        family: row.get("family"),
                        file: row.get("file"),
                        modified: row.get("modified"),
                    };
                    (font_id, desc)
                })
                .collect();
            self.font_descs = Some(descs);
        }
        Ok(self.font_descs.as_ref().expect("cache was just filled"))
    }

    /// Brings the catalog in sync with the manifest.
    ///
    /// A font is re-parsed only when the mtime of its metadata or TTF file
    /// is newer than the stored row; each font commits separately, so an
    /// interrupted run leaves a consistent prefix behind.
    pub async fn update(&mut self) -> StoreResult<()> {
        if !self.descs_path.exists() {
            return Err(StoreError::ManifestNotFound(self.descs_path.clone()));
        }
        let manifest: Vec<FontEntry> = serde_json::from_slice(&read_file(&self.descs_path)?)?;
        let known: HashMap<String, i64> = self
            .get_fonts()
            .await?
            .values()
            .map(|desc| (desc.name.clone(), desc.modified))
            .collect();
        let base = self.descs_path.parent().unwrap_or_else(|| Path::new(""));

        for entry in manifest {
            let metadata_path = base.join(&entry.metadata);
            let font_path = base.join(&entry.font);
            let modified = mtime_epoch(&metadata_path)?.max(mtime_epoch(&font_path)?);
            if known.get(&entry.name).is_some_and(|&seen| seen >= modified) {
                debug!("font {} is up to date", entry.name);
                continue;
            }

            let metadata: FontMetadata = serde_json::from_slice(&read_file(&metadata_path)?)?;
            let font = Font::parse(read_file(&font_path)?)?;

            let mut tx = self.conn.begin().await?;
            let font_id: i64 = query_scalar(UPSERT_FONT)
                .bind(&entry.name)
                .bind(&metadata.family)
                .bind(font_path.to_string_lossy().into_owned())
                .bind(modified)
                .fetch_one(&mut *tx)
                .await?;

            let mut count = 0usize;
            for (icon_name, &codepoint) in &metadata.names {
                let Some(glyph) = font.glyph_by_codepoint(codepoint)? else {
                    continue;
                };
                let svg = glyph.to_svg_path(false, None)?;
                query(UPSERT_ICON)
                    .bind(format!("{}-{icon_name}", entry.name))
                    .bind(i64::from(codepoint))
                    .bind(compress(svg.as_bytes())?)
                    .bind(font_id)
                    .execute(&mut *tx)
                    .await?;
                count += 1;
            }
            tx.commit().await?;
            info!("font {}: stored {count} icons", entry.name);
        }

        self.font_descs = None;
        Ok(())
    }

    /// Total number of row changes on this connection; handy for
    /// verifying that a no-op update wrote nothing.
    pub async fn total_changes(&mut self) -> StoreResult<i64> {
        Ok(query_scalar("SELECT total_changes()")
            .fetch_one(&mut self.conn)
            .await?)
    }
}

fn default_db_path() -> PathBuf {
    std::env::home_dir().map_or_else(
        || PathBuf::from("icons.sqlite"),
        |home| home.join(".cache").join("icons.sqlite"),
    )
}

fn read_file(path: &Path) -> StoreResult<Vec<u8>> {
    fs::read(path).map_err(|e| StoreError::Io(e, path.to_path_buf()))
}

/// File mtime as Unix-epoch seconds, rounded up to whole seconds so that
/// a stored timestamp is never older than the file it was taken from.
fn mtime_epoch(path: &Path) -> StoreResult<i64> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|e| StoreError::Io(e, path.to_path_buf()))?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).unwrap_or_default();
    let mut seconds = since_epoch.as_secs() as i64;
    if since_epoch.subsec_nanos() > 0 {
        seconds += 1;
    }
    Ok(seconds)
}

fn compress(data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn decompress(data: Vec<u8>) -> StoreResult<String> {
    let mut decoder = ZlibDecoder::new(data.as_slice());
    let mut svg = String::new();
    decoder.read_to_string(&mut svg)?;
    Ok(svg)
}
