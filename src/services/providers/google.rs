use super::languages::{pair_in, GOOGLE_LANGUAGES};
use super::r#trait::{clean_text, TranslationProvider};
use crate::config::HttpProviderConfig;
use crate::debug_if_enabled;
use crate::error::{AppError, Result};
use crate::utils::text::preview;
use serde_json::Value;

pub(super) const USER_AGENT: &str = concat!("select-translate/", env!("CARGO_PKG_VERSION"));

/// Бесплатный веб-эндпоинт Google Translate (`client=gtx`)
pub struct GoogleProvider {
    config: HttpProviderConfig,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { config, client })
    }
}

/// Склеить сегменты перевода из `data[0][i][0]`
fn parse_response(body: &str) -> Option<String> {
    let data: Value = serde_json::from_str(body).ok()?;
    let segments = data.get(0)?.as_array()?;

    let translation: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translation.trim().is_empty() {
        None
    } else {
        Some(translation)
    }
}

#[async_trait::async_trait]
impl TranslationProvider for GoogleProvider {
    fn id(&self) -> &str {
        "google"
    }

    fn description(&self) -> &str {
        "Google Translate (онлайн)"
    }

    fn requires_internet(&self) -> bool {
        true
    }

    async fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
        pair_in(GOOGLE_LANGUAGES, source_lang, target_lang)
    }

    async fn invoke(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let text = clean_text(text);
        debug_if_enabled!("Перевод Google: {}", preview(text, 50));

        let mut request = self.client.get(&self.config.service_url).query(&[
            ("client", "gtx"),
            ("sl", source_lang),
            ("tl", target_lang),
            ("dt", "t"),
            ("q", text),
        ]);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let body = request.send().await?.error_for_status()?.text().await?;

        parse_response(&body)
            .map(|t| clean_text(&t).to_string())
            .ok_or_else(|| AppError::ProviderInvocationFailed {
                provider: self.id().to_string(),
                reason: "не удалось разобрать ответ".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_segments() {
        let body = r#"[[["Hola ","Hello ",null,null,10],["mundo","world",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).as_deref(), Some("Hola mundo"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_response("not json"), None);
        assert_eq!(parse_response("{}"), None);
        assert_eq!(parse_response("[[]]"), None);
    }
}
