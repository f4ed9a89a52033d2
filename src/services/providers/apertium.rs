use super::languages::APERTIUM_CODES;
use super::r#trait::{clean_text, TranslationProvider};
use crate::config::ApertiumConfig;
use crate::debug_if_enabled;
use crate::error::{AppError, Result};
use crate::utils::{text::preview, ToolCommand};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Верхняя граница для самого процесса; основной таймаут задаёт диспетчер
const PROCESS_BACKSTOP: Duration = Duration::from_secs(60);

const LIST_TIMEOUT: Duration = Duration::from_secs(5);

/// Пары, которые считаем установленными, если `apertium -l` не отвечает
const FALLBACK_PAIRS: &[&str] = &["eng-spa", "spa-eng", "eng-fra", "fra-eng", "eng-cat", "cat-eng"];

/// Офлайн-перевод через `apertium <пара>`
pub struct ApertiumProvider {
    config: ApertiumConfig,
    /// Установленные пары, запрашиваются один раз
    installed: OnceCell<Vec<String>>,
}

impl ApertiumProvider {
    pub fn new(config: ApertiumConfig) -> Self {
        Self {
            config,
            installed: OnceCell::new(),
        }
    }

    /// Преобразовать ISO-коды в пару Apertium, например en/es -> eng-spa
    pub fn apertium_pair(source_lang: &str, target_lang: &str) -> Option<String> {
        let source = APERTIUM_CODES.get(source_lang)?;
        let target = APERTIUM_CODES.get(target_lang)?;
        Some(format!("{}-{}", source, target))
    }

    async fn installed_pairs(&self) -> &[String] {
        self.installed
            .get_or_init(|| list_pairs(&self.config.engine))
            .await
    }

    /// Пара для перевода с учётом установленных модулей
    async fn resolve(&self, source_lang: &str, target_lang: &str) -> Option<String> {
        if source_lang == target_lang {
            return None;
        }
        resolve_pair(
            self.installed_pairs().await,
            source_lang,
            target_lang,
            self.config.default_pair.as_deref(),
        )
    }
}

/// Список пар из `apertium -l`; при ошибке используется запасной набор
async fn list_pairs(engine: &str) -> Vec<String> {
    let output = ToolCommand::new(engine).arg("-l").timeout(LIST_TIMEOUT).output().await;

    match output {
        Ok(output) => {
            let pairs = parse_pair_list(&output);
            info!("Установленные пары Apertium: {:?}", pairs);
            pairs
        }
        Err(e) => {
            warn!("Не удалось получить список пар Apertium: {}", e);
            FALLBACK_PAIRS.iter().map(|p| p.to_string()).collect()
        }
    }
}

fn parse_pair_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Прямая пара (трёх- или двухбуквенные коды), затем обратная, затем пара по умолчанию
fn resolve_pair(
    installed: &[String],
    source_lang: &str,
    target_lang: &str,
    default_pair: Option<&str>,
) -> Option<String> {
    let code = |lang: &str| APERTIUM_CODES.get(lang).copied().unwrap_or(lang).to_string();
    let (source, target) = (code(source_lang), code(target_lang));

    let direct = [
        format!("{}-{}", source, target),
        format!("{}-{}", source_lang, target_lang),
    ];
    let reverse = [
        format!("{}-{}", target, source),
        format!("{}-{}", target_lang, source_lang),
    ];

    let is_installed = |pair: &String| installed.iter().any(|p| p == pair);

    if let Some(pair) = direct.iter().find(|p| is_installed(*p)) {
        return Some(pair.clone());
    }
    if let Some(pair) = reverse.iter().find(|p| is_installed(*p)) {
        warn!(
            "Пара {}-{} не установлена, используется обратная {}",
            source_lang, target_lang, pair
        );
        return Some(pair.clone());
    }

    default_pair
        .filter(|pair| installed.iter().any(|p| p == pair))
        .map(str::to_string)
}

#[async_trait::async_trait]
impl TranslationProvider for ApertiumProvider {
    fn id(&self) -> &str {
        "apertium"
    }

    fn description(&self) -> &str {
        "Локальный офлайн-перевод Apertium"
    }

    fn required_tools(&self) -> Vec<String> {
        vec![self.config.engine.clone()]
    }

    async fn supports(&self, source_lang: &str, target_lang: &str) -> bool {
        self.resolve(source_lang, target_lang).await.is_some()
    }

    async fn invoke(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        let pair = self.resolve(source_lang, target_lang).await.ok_or_else(|| {
            AppError::InvalidInput(format!(
                "пара {}-{} не установлена в Apertium",
                source_lang, target_lang
            ))
        })?;

        let text = clean_text(text);
        debug_if_enabled!("Перевод Apertium ({}): {}", pair, preview(text, 50));

        let output = ToolCommand::new(&self.config.engine)
            .arg(pair.as_str())
            .stdin(text)
            .timeout(PROCESS_BACKSTOP)
            .output()
            .await?;

        let translation = clean_text(&output);
        if translation.is_empty() {
            return Err(AppError::ProviderInvocationFailed {
                provider: self.id().to_string(),
                reason: "пустой ответ".to_string(),
            });
        }

        Ok(translation.to_string())
    }
}
