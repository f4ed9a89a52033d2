use crate::config::KNOWN_PROVIDERS;
use crate::context::AppContext;
use crate::error::{AppError, Result};
use std::sync::Arc;

/// Trait for translation backends; any type implementing it can be registered
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Stable provider id used in configuration
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// External tools that must be on PATH for this provider to work
    fn required_tools(&self) -> Vec<String> {
        Vec::new()
    }

    fn requires_internet(&self) -> bool {
        false
    }

    /// Whether the pair can be translated; may consult the installed backend
    async fn supports(&self, source_lang: &str, target_lang: &str) -> bool;

    /// Translate text; the caller bounds the call with a timeout
    async fn invoke(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// Factory function to create a provider by id, honoring the dry_run flag
pub fn create_provider(id: &str, ctx: &AppContext) -> Result<Arc<dyn TranslationProvider>> {
    if ctx.dry_run {
        return Ok(Arc::new(super::dry_run::DryRunProvider::new(id)));
    }

    let providers = &ctx.config.providers;
    match id {
        "apertium" => Ok(Arc::new(super::apertium::ApertiumProvider::new(
            providers.apertium.clone(),
        ))),
        "google" => Ok(Arc::new(super::google::GoogleProvider::new(
            providers.google.clone(),
        )?)),
        "libretranslate" => Ok(Arc::new(super::libretranslate::LibreTranslateProvider::new(
            providers.libretranslate.clone(),
        )?)),
        other => Err(AppError::UnknownProvider(format!(
            "{} (известные: {})",
            other,
            KNOWN_PROVIDERS.join(", ")
        ))),
    }
}

/// Общая пред- и постобработка текста провайдерами
pub(super) fn clean_text(text: &str) -> &str {
    text.trim()
}
