//! Language resource loading
//!
//! One `<code>.properties` file per language lives in the resource directory.

pub mod properties;

use std::collections::HashMap;
use std::path::Path;
use crate::application::errors::TranslateError;
use crate::domain::entities::LanguageBundle;

pub use properties::parse_properties;

/// Extension of language resource files
pub const RESOURCE_EXTENSION: &str = "properties";

/// Load a single resource file into a bundle named after its base name
pub fn load_bundle(path: &Path) -> Result<LanguageBundle, TranslateError> {
    let code = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TranslateError::Parse {
            file: path.display().to_string(),
            line: 0,
            reason: "file name is not a language code".to_string(),
        })?;

    let content = std::fs::read_to_string(path)?;
    let records = parse_properties(&path.display().to_string(), &content)?;
    Ok(LanguageBundle::from_records(code, records))
}

/// Load every resource file in `dir`.
///
/// A file that cannot be read or parsed is logged and skipped. Only a
/// missing or unreadable directory is an error.
pub fn load_bundles(dir: &Path) -> Result<HashMap<String, LanguageBundle>, TranslateError> {
    let mut bundles = HashMap::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RESOURCE_EXTENSION) {
            continue;
        }

        // Skip hidden files
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        match load_bundle(&path) {
            Ok(bundle) => {
                tracing::debug!("Loaded language {} ({} messages)", bundle.code, bundle.len());
                bundles.insert(bundle.code.clone(), bundle);
            }
            Err(e) => {
                tracing::warn!("Skipping language file {}: {}", path.display(), e);
            }
        }
    }

    Ok(bundles)
}
