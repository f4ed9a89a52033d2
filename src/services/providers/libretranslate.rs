use super::google::USER_AGENT;
use super::languages::{pair_in, LIBRETRANSLATE_LANGUAGES};
use super::r#trait::{clean_text, TranslationProvider};
use crate::config::HttpProviderConfig;
use crate::debug_if_enabled;
use crate::error::{AppError, Result};
use crate::utils::text::preview;
use serde::Deserialize;

/// Открытый сервис LibreTranslate
pub struct LibreTranslateProvider {
    config: HttpProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslateProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { config, client })
    }
}

fn parse_response(body: &str) -> Option<String> {
    let response: LibreResponse = serde_json::from_str(body).ok()?;
    let text = clean_text(&response.translated_text);
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait::async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn id(&self) -> &str {
        "libretranslate"
    }

    fn description(&self) -> &str {
        "LibreTranslate (свободный онлайн-сервис)"
    }

    fn requires_internet(&self) -> bool {
        true
    }

    async fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
        pair_in(LIBRETRANSLATE_LANGUAGES, source_lang, target_lang)
    }

    async fn invoke(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let text = clean_text(text);
        debug_if_enabled!("Перевод LibreTranslate: {}", preview(text, 50));

        let mut form = vec![("q", text), ("source", source_lang), ("target", target_lang)];
        if let Some(key) = &self.config.api_key {
            form.push(("api_key", key.as_str()));
        }

        let body = self
            .client
            .post(&self.config.service_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_response(&body).ok_or_else(|| AppError::ProviderInvocationFailed {
            provider: self.id().to_string(),
            reason: "не удалось разобрать ответ".to_string(),
        })
    }
}
