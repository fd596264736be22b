use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use arc_swap::ArcSwap;
use crate::application::errors::TranslateError;
use crate::application::services::GuildConfigCache;
use crate::domain::entities::{format_template, LanguageBundle, LANGUAGE_KEY};
use crate::infrastructure::i18n;

/// Language used when a guild has none configured
pub const DEFAULT_LANGUAGE: &str = "en";

type Catalog = HashMap<String, Arc<LanguageBundle>>;

/// Resolves message keys to text in each guild's language.
///
/// The loaded bundles form one immutable snapshot that `load` replaces as a
/// whole, so a concurrent `translate` sees either the old or the new set.
pub struct Localizer {
    directory: PathBuf,
    default_language: String,
    catalog: ArcSwap<Catalog>,
    config: Arc<GuildConfigCache>,
}

impl Localizer {
    /// Create an empty localizer; call [`Localizer::load`] to read the bundles
    pub fn new(directory: impl Into<PathBuf>, config: Arc<GuildConfigCache>) -> Self {
        Self {
            directory: directory.into(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            catalog: ArcSwap::from_pointee(HashMap::new()),
            config,
        }
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Read all bundles from the resource directory and swap them in.
    ///
    /// Returns the number of languages loaded. When the directory itself
    /// cannot be read the previous bundles stay active.
    pub fn load(&self) -> Result<usize, TranslateError> {
        let bundles = i18n::load_bundles(&self.directory).map_err(|e| {
            tracing::error!("Failed to load languages from {}: {}", self.directory.display(), e);
            e
        })?;
        let count = bundles.len();
        self.replace(bundles.into_values());
        tracing::info!("Loaded {} languages from {}", count, self.directory.display());
        Ok(count)
    }

    pub fn reload(&self) -> Result<usize, TranslateError> {
        self.load()
    }

    /// Swap in a new set of bundles
    pub fn replace(&self, bundles: impl IntoIterator<Item = LanguageBundle>) {
        let catalog: Catalog = bundles
            .into_iter()
            .map(|b| (b.code.clone(), Arc::new(b)))
            .collect();
        self.catalog.store(Arc::new(catalog));
    }

    pub fn list_languages(&self) -> BTreeSet<String> {
        self.catalog.load().keys().cloned().collect()
    }

    pub fn has_language(&self, code: &str) -> bool {
        self.catalog.load().contains_key(code)
    }

    /// Translate `key` for a guild, using its `LANGUAGE` setting
    pub async fn translate(&self, guild_id: &str, key: &str, args: &[&str]) -> Result<String, TranslateError> {
        let language = self.config.get_setting(guild_id, LANGUAGE_KEY).await?;
        self.translate_in(language.as_deref(), key, args)
    }

    /// Translate `key` for an explicit language selection.
    ///
    /// An unset or unknown language falls back to the default bundle. A key
    /// missing from the chosen bundle is an error, not a second fallback.
    pub fn translate_in(&self, language: Option<&str>, key: &str, args: &[&str]) -> Result<String, TranslateError> {
        let catalog = self.catalog.load();
        let bundle = language
            .and_then(|code| catalog.get(code))
            .or_else(|| catalog.get(&self.default_language));

        let code = bundle.map(|b| b.code.as_str()).unwrap_or(self.default_language.as_str());
        let template = bundle.and_then(|b| b.get(key)).ok_or_else(|| TranslateError::MissingTranslation {
            language: code.to_string(),
            key: key.to_string(),
        })?;

        format_template(template, args).map_err(|reason| TranslateError::FormatMismatch {
            key: key.to_string(),
            reason,
        })
    }
}
