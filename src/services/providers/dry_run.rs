use super::r#trait::{clean_text, TranslationProvider};
use crate::error::Result;
use tracing::info;

/// Провайдер для режима сухого запуска: ничего не вызывает
pub struct DryRunProvider {
    id: String,
}

impl DryRunProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait::async_trait]
impl TranslationProvider for DryRunProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Эмуляция перевода (dry-run)"
    }

    async fn supports(&self, _source_lang: &str, _target_lang: &str) -> bool {
        true
    }

    async fn invoke(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        info!("[DRY RUN] {}: перевод {}->{}", self.id, source_lang, target_lang);
        Ok(format!("[{}->{}] {}", source_lang, target_lang, clean_text(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_echoes_text() {
        let provider = DryRunProvider::new("apertium");
        let out = provider.invoke("  hello ", "en", "es").await.unwrap();
        assert_eq!(out, "[en->es] hello");
        assert!(provider.required_tools().is_empty());
    }
}
