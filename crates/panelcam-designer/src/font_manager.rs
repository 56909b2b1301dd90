use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use panelcam_core::{GeometryError, Result};
use rusttype::Font;
use std::{
    collections::{HashMap, HashSet},
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

/// Where a font comes from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontSpec {
    /// A TrueType/OpenType file on disk
    File(PathBuf),
    /// A family name looked up among the system fonts (`Sans`, `Serif`, `Monospace` or a name)
    Family(String),
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec::Family("Sans".to_string())
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSpec::File(path) => write!(f, "{}", path.display()),
            FontSpec::Family(name) => write!(f, "{}", name),
        }
    }
}

fn db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        db
    })
}

pub fn list_font_families() -> Vec<String> {
    let mut set = HashSet::new();
    for face in db().faces() {
        for (name, _) in &face.families {
            set.insert(name.clone());
        }
    }
    let mut out: Vec<_> = set.into_iter().collect();
    out.sort();
    out
}

/// Resolve a font, caching successful lookups for the life of the process.
///
/// There is no fallback face: a font that cannot be found or parsed is an error.
pub fn resolve(spec: &FontSpec) -> Result<&'static Font<'static>> {
    static CACHE: OnceLock<Mutex<HashMap<FontSpec, &'static Font<'static>>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));

    if let Some(font) = cache.lock().unwrap_or_else(|p| p.into_inner()).get(spec) {
        return Ok(font);
    }

    let loaded = match spec {
        FontSpec::File(path) => load_font_file(path),
        FontSpec::Family(family) => load_font_from_system(family),
    }
    .map_err(|reason| GeometryError::FontResolution {
        font: spec.to_string(),
        reason,
    })?;

    let font_ref: &'static Font<'static> = Box::leak(Box::new(loaded));
    cache
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .insert(spec.clone(), font_ref);
    Ok(font_ref)
}

fn load_font_file(path: &Path) -> std::result::Result<Font<'static>, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    Font::try_from_vec(bytes).ok_or_else(|| "not a valid TrueType/OpenType font".to_string())
}

fn load_font_from_system(family: &str) -> std::result::Result<Font<'static>, String> {
    let families: Vec<Family<'_>> = match family.trim() {
        "" | "Sans" => vec![Family::SansSerif],
        "Serif" => vec![Family::Serif],
        "Monospace" => vec![Family::Monospace],
        other => vec![Family::Name(other)],
    };

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };

    let id = db()
        .query(&query)
        .ok_or_else(|| "no matching system font".to_string())?;
    let face = db()
        .face(id)
        .ok_or_else(|| "font face disappeared from the database".to_string())?;

    let font = match &face.source {
        fontdb::Source::File(path) => {
            let bytes = fs::read(path).map_err(|e| e.to_string())?;
            Font::try_from_vec_and_index(bytes, face.index)
        }
        fontdb::Source::SharedFile(path, _) => {
            let bytes = fs::read(path).map_err(|e| e.to_string())?;
            Font::try_from_vec_and_index(bytes, face.index)
        }
        fontdb::Source::Binary(bytes) => {
            Font::try_from_vec_and_index(bytes.as_ref().as_ref().to_vec(), face.index)
        }
    };
    font.ok_or_else(|| "system font could not be parsed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file() {
        let spec = FontSpec::File(PathBuf::from("/nonexistent/panelcam/font.ttf"));
        let err = resolve(&spec).unwrap_err();
        assert!(matches!(
            err,
            panelcam_core::Error::Geometry(GeometryError::FontResolution { .. })
        ));
    }

    #[test]
    fn test_invalid_font_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"definitely not a font").unwrap();
        let spec = FontSpec::File(file.path().to_path_buf());
        assert!(resolve(&spec).is_err());
    }

    #[test]
    fn test_font_spec_display() {
        assert_eq!(FontSpec::default().to_string(), "Sans");
        assert_eq!(FontSpec::File(PathBuf::from("a.ttf")).to_string(), "a.ttf");
    }
}
