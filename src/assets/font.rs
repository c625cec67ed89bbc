use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use usvg::fontdb;

use crate::foundation::error::{OvermarkError, OvermarkResult};

/// Families tried, in order, before falling back to any available face.
const PREFERRED_FAMILIES: &[&str] = &[
    "Inter",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// Where text watermark glyphs come from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// Raw font file bytes (TTF/OTF), used as-is.
    Bytes(Arc<Vec<u8>>),
    /// Directory scanned for `.ttf`/`.otf`/`.ttc` files; a bold sans-serif face is preferred.
    Dir(PathBuf),
    /// Installed system fonts; a bold sans-serif face is preferred.
    System,
}

/// A single font face ready for layout and rasterization.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Backing font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index within `bytes` (non-zero only for collections).
    pub index: u32,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

/// Resolve `source` into one concrete face.
pub fn resolve_font(source: &FontSource) -> OvermarkResult<ResolvedFont> {
    match source {
        FontSource::Bytes(bytes) => {
            if bytes.is_empty() {
                return Err(OvermarkError::validation("font bytes must be non-empty"));
            }
            Ok(ResolvedFont {
                bytes: Arc::clone(bytes),
                index: 0,
            })
        }
        FontSource::Dir(dir) => {
            let mut db = fontdb::Database::new();
            load_fonts_from_dir(&mut db, dir);
            select_bold_sans(&db)
                .with_context(|| format!("no usable font in '{}'", dir.display()))
                .map_err(|e| OvermarkError::precondition(format!("{e:#}")))
        }
        FontSource::System => {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            select_bold_sans(&db)
                .context("no usable system font")
                .map_err(|e| OvermarkError::precondition(format!("{e:#}")))
        }
    }
}

fn select_bold_sans(db: &fontdb::Database) -> anyhow::Result<ResolvedFont> {
    let mut families: Vec<fontdb::Family<'_>> = PREFERRED_FAMILIES
        .iter()
        .map(|name| fontdb::Family::Name(*name))
        .collect();
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::BOLD,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .context("font database is empty")?;

    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .context("font face data unavailable")?;

    Ok(ResolvedFont {
        bytes: Arc::new(bytes),
        index,
    })
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(err) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), %err, "skipping unreadable font file");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
