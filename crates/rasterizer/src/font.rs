use std::path::PathBuf;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use fontdue::{Font, FontSettings};

use crate::RasterError;

/// Where the glyph outlines come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A TrueType/OpenType file on disk (first face of collections).
    File(PathBuf),
    /// Best system match for a CSS-style family (`sans-serif`, `serif`,
    /// `monospace`, or a family name).
    System { family: String, bold: bool },
}

impl FontSource {
    pub fn system(family: impl Into<String>, bold: bool) -> Self {
        Self::System {
            family: family.into(),
            bold,
        }
    }
}

/// A parsed font plus a human-readable name for logs.
pub struct LoadedFont {
    pub font: Font,
    pub name: String,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont").field("name", &self.name).finish()
    }
}

pub fn load_font(source: &FontSource) -> Result<LoadedFont, RasterError> {
    match source {
        FontSource::File(path) => {
            let data = std::fs::read(path).map_err(|source| RasterError::Io {
                path: path.clone(),
                source,
            })?;
            let font = parse_font(&data, 0, &path.display().to_string())?;
            Ok(LoadedFont {
                font,
                name: path.display().to_string(),
            })
        }
        FontSource::System { family, bold } => load_system_font(family, *bold),
    }
}

fn load_system_font(family: &str, bold: bool) -> Result<LoadedFont, RasterError> {
    let mut db = Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), family, bold, "loaded system font database");

    let weight = if bold { Weight::BOLD } else { Weight::NORMAL };
    let id = find_face(&db, family, weight).ok_or_else(|| RasterError::NoSystemFont {
        family: family.to_string(),
    })?;

    let name = db
        .face(id)
        .map(|face| face.post_script_name.clone())
        .unwrap_or_else(|| family.to_string());

    let parsed = db
        .with_face_data(id, |data, index| parse_font(data, index, &name))
        .ok_or_else(|| RasterError::Parse {
            origin: name.clone(),
            reason: "face data is no longer available".to_string(),
        })??;

    tracing::debug!(font = %name, "selected system font");
    Ok(LoadedFont { font: parsed, name })
}

fn find_face(db: &Database, family: &str, weight: Weight) -> Option<fontdb::ID> {
    let requested = generic_family(family);
    if let Some(id) = query_face(db, &[requested], weight) {
        return Some(id);
    }

    // fontdb maps generic families to fixed names that many Linux installs lack.
    let fallback_names: &[&str] = match requested {
        Family::Serif => &["DejaVu Serif", "Liberation Serif", "Noto Serif", "Times New Roman"],
        Family::Monospace => &["DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "Courier New"],
        _ => &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Helvetica", "Arial"],
    };
    for name in fallback_names {
        if let Some(id) = query_face(db, &[Family::Name(name)], weight) {
            tracing::debug!(requested = family, fallback = name, "using fallback font family");
            return Some(id);
        }
    }

    db.faces().next().map(|face| {
        tracing::warn!(
            requested = family,
            fallback = %face.post_script_name,
            "no font matched the requested family; using first available face"
        );
        face.id
    })
}

fn query_face(db: &Database, families: &[Family<'_>], weight: Weight) -> Option<fontdb::ID> {
    db.query(&Query {
        families,
        weight,
        stretch: Stretch::Normal,
        style: Style::Normal,
    })
}

fn generic_family(family: &str) -> Family<'_> {
    match family.trim().to_ascii_lowercase().as_str() {
        "sans-serif" | "sans" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" | "mono" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(family.trim()),
    }
}

fn parse_font(data: &[u8], index: u32, origin: &str) -> Result<Font, RasterError> {
    Font::from_bytes(
        data,
        FontSettings {
            collection_index: index,
            ..FontSettings::default()
        },
    )
    .map_err(|reason| RasterError::Parse {
        origin: origin.to_string(),
        reason: reason.to_string(),
    })
}
