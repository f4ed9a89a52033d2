use crate::config::DictionaryConfig;
use crate::debug_if_enabled;
use crate::error::{AppError, Result};
use crate::utils::dependencies::ToolProbe;
use crate::utils::ToolCommand;
use std::time::Duration;
use tracing::debug;

/// Словарные определения через `dict`
pub struct DictionaryLookup {
    config: DictionaryConfig,
}

/// Одноязычные базы dict по языкам
fn monolingual_database(language: &str) -> Option<&'static str> {
    match language {
        "en" => Some("gcide"),
        _ => None,
    }
}

impl DictionaryLookup {
    pub fn new(config: DictionaryConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn is_available(&self, probe: &dyn ToolProbe) -> bool {
        probe.is_installed(&self.config.command)
    }

    /// Найти определение слова. Для языков без своей базы ищем в общей с пометкой.
    pub async fn lookup(&self, word: &str, language: &str) -> Result<String> {
        let word = word.trim();
        if word.is_empty() {
            return AppError::invalid_input("пустое слово");
        }

        debug_if_enabled!("Поиск определения: {} ({})", word, language);

        if let Some(database) = monolingual_database(language) {
            if let Some(definition) = self.query(word, Some(database)).await? {
                return Ok(definition);
            }
            debug!("В базе {} нет определения для {}", database, word);
        }

        match self.query(word, None).await? {
            Some(definition) if monolingual_database(language).is_none() => Ok(format!(
                "[Нет словаря для '{}', определение из общей базы]\n{}",
                language, definition
            )),
            Some(definition) => Ok(definition),
            None => Err(AppError::CommandFailed {
                program: self.config.command.clone(),
                message: format!("определение для '{}' не найдено", word),
            }),
        }
    }

    async fn query(&self, word: &str, database: Option<&str>) -> Result<Option<String>> {
        let mut cmd = ToolCommand::new(&self.config.command)
            .timeout(Duration::from_millis(self.config.timeout_ms));
        if let Some(database) = database {
            cmd = cmd.args(["-d", database]);
        }

        match cmd.arg(word).output().await {
            Ok(output) => Ok(self.parse_definition(&output)),
            // dict возвращает ненулевой код, если слово не найдено
            Err(AppError::CommandFailed { message, .. }) => {
                debug!("dict: {}", message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Пропустить заголовок, взять до `max_lines` непустых строк
    fn parse_definition(&self, output: &str) -> Option<String> {
        let lines: Vec<&str> = output
            .lines()
            .skip(self.config.skip_lines)
            .take(self.config.max_lines)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join(" "))
        }
    }
}
