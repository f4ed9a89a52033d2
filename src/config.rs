use crate::events::{Insets, PopupSize, ScreenGeometry};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Идентификаторы встроенных провайдеров перевода
pub const KNOWN_PROVIDERS: &[&str] = &["apertium", "google", "libretranslate"];

/// Каталог приложения внутри пользовательского каталога конфигурации
const APP_DIR: &str = "select-translate";
const LOCAL_CONFIG_FILE: &str = "select-translate.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub selection: SelectionConfig,
    pub positioning: PositioningConfig,
    pub translation: TranslationConfig,
    pub providers: ProvidersConfig,
    pub dictionary: DictionaryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
    /// Вывод логов в консоль
    #[serde(default = "default_true")]
    pub console: bool,
    /// Запись логов в файл
    #[serde(default = "default_true")]
    pub file_logging: bool,
    /// Путь к файлу логов; по умолчанию в каталоге конфигурации пользователя
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionConfig {
    pub command: String,
    #[serde(default = "default_selection_args")]
    pub args: Vec<String>,
    pub poll_interval_ms: u64,
    pub read_timeout_ms: u64,
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PositioningConfig {
    pub popup_margin_px: u32,
    pub popup_width: u32,
    pub popup_height: u32,
    pub cursor_tool: String,
    pub fallback_screen_width: u32,
    pub fallback_screen_height: u32,
    #[serde(default)]
    pub insets: Insets,
    /// Сколько окно остаётся показанным, прежде чем вернуться к ожиданию
    pub display_duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    pub provider_priority: Vec<String>,
    #[serde(default)]
    pub preferred_provider: Option<String>,
    pub per_provider_timeout_ms: u64,
    /// Пара языков в формате "en-es"
    pub language_pair: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub apertium: ApertiumConfig,
    pub google: HttpProviderConfig,
    pub libretranslate: HttpProviderConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApertiumConfig {
    pub engine: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Пара Apertium на случай, если подходящая не установлена
    #[serde(default)]
    pub default_pair: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpProviderConfig {
    pub service_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DictionaryConfig {
    pub enabled: bool,
    pub command: String,
    pub timeout_ms: u64,
    pub max_lines: usize,
    pub skip_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                filter: "select_translate=info".to_string(),
                console: true,
                file_logging: true,
                file: None,
            },
            selection: SelectionConfig {
                command: "xsel".to_string(),
                args: default_selection_args(),
                poll_interval_ms: 500,
                read_timeout_ms: 1000,
                min_length: 1,
                max_length: 500,
            },
            positioning: PositioningConfig {
                popup_margin_px: 15,
                popup_width: 420,
                popup_height: 320,
                cursor_tool: "xdotool".to_string(),
                fallback_screen_width: 1920,
                fallback_screen_height: 1080,
                insets: Insets::default(),
                display_duration_ms: 3000,
            },
            translation: TranslationConfig {
                provider_priority: KNOWN_PROVIDERS.iter().map(|s| s.to_string()).collect(),
                preferred_provider: None,
                per_provider_timeout_ms: 10_000,
                language_pair: "en-es".to_string(),
            },
            providers: ProvidersConfig {
                apertium: ApertiumConfig {
                    engine: "apertium".to_string(),
                    timeout_ms: None,
                    default_pair: None,
                },
                google: HttpProviderConfig {
                    service_url: "https://translate.googleapis.com/translate_a/single".to_string(),
                    api_key: None,
                    timeout_ms: None,
                },
                libretranslate: HttpProviderConfig {
                    service_url: "https://libretranslate.de/translate".to_string(),
                    api_key: None,
                    timeout_ms: None,
                },
            },
            dictionary: DictionaryConfig {
                enabled: true,
                command: "dict".to_string(),
                timeout_ms: 5000,
                max_lines: 8,
                skip_lines: 2,
            },
        }
    }
}

fn default_selection_args() -> Vec<String> {
    vec!["-o".to_string()]
}

fn default_true() -> bool {
    true
}

/// `$XDG_CONFIG_HOME/select-translate` (или аналог платформы)
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Файл конфигурации по умолчанию: пользовательский, если он есть, иначе локальный
pub fn default_config_path() -> PathBuf {
    user_config_dir()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SELTR_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация опроса выделения
        if self.selection.command.trim().is_empty() {
            anyhow::bail!("selection.command не может быть пустым");
        }

        if self.selection.poll_interval_ms < 50 {
            anyhow::bail!("poll_interval_ms должно быть минимум 50");
        }

        if self.selection.min_length == 0 || self.selection.min_length > self.selection.max_length {
            anyhow::bail!(
                "Неверные границы длины выделения: {}..{}",
                self.selection.min_length,
                self.selection.max_length
            );
        }

        // Валидация позиционирования
        if self.positioning.popup_width == 0 || self.positioning.popup_height == 0 {
            anyhow::bail!("Размер всплывающего окна должен быть больше 0");
        }

        if self.positioning.fallback_screen_width == 0 || self.positioning.fallback_screen_height == 0 {
            anyhow::bail!("Резервная геометрия экрана должна быть больше 0");
        }

        // Валидация перевода
        self.languages()?;

        if self.translation.per_provider_timeout_ms == 0 {
            anyhow::bail!("per_provider_timeout_ms должно быть больше 0");
        }

        if self.translation.provider_priority.is_empty() {
            anyhow::bail!("provider_priority не может быть пустым");
        }

        let mut seen = HashSet::new();
        for (i, id) in self.translation.provider_priority.iter().enumerate() {
            if !KNOWN_PROVIDERS.contains(&id.as_str()) {
                anyhow::bail!("Неизвестный провайдер '{}' в provider_priority #{}", id, i + 1);
            }
            if !seen.insert(id.as_str()) {
                anyhow::bail!("Провайдер '{}' указан в provider_priority дважды", id);
            }
        }

        // Валидация словаря
        if self.dictionary.enabled && self.dictionary.max_lines == 0 {
            anyhow::bail!("dictionary.max_lines должно быть больше 0");
        }

        Ok(())
    }

    /// Файл логов: явно заданный или в каталоге конфигурации пользователя
    pub fn log_file(&self) -> Option<PathBuf> {
        if !self.logging.file_logging {
            return None;
        }
        self.logging
            .file
            .clone()
            .or_else(|| user_config_dir().map(|dir| dir.join("select-translate.log")))
    }

    /// Исходный и целевой язык из `language_pair`
    pub fn languages(&self) -> Result<(String, String)> {
        parse_language_pair(&self.translation.language_pair)
    }

    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.positioning.display_duration_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.selection.poll_interval_ms)
    }

    pub fn popup_size(&self) -> PopupSize {
        PopupSize::new(self.positioning.popup_width, self.positioning.popup_height)
    }

    /// Геометрия на случай, если узнать реальную не удалось
    pub fn fallback_geometry(&self) -> ScreenGeometry {
        ScreenGeometry::new(
            self.positioning.fallback_screen_width,
            self.positioning.fallback_screen_height,
        )
        .with_insets(self.positioning.insets)
    }

    /// Таймаут провайдера: собственный из секции providers или общий
    pub fn provider_timeout(&self, id: &str) -> Duration {
        let specific = match id {
            "apertium" => self.providers.apertium.timeout_ms,
            "google" => self.providers.google.timeout_ms,
            "libretranslate" => self.providers.libretranslate.timeout_ms,
            _ => None,
        };
        Duration::from_millis(specific.unwrap_or(self.translation.per_provider_timeout_ms))
    }
}

pub fn parse_language_pair(pair: &str) -> Result<(String, String)> {
    let (source, target) = pair
        .split_once('-')
        .with_context(|| format!("Неверный формат пары языков '{}', ожидается 'en-es'", pair))?;

    let source = source.trim();
    let target = target.trim();
    if source.is_empty() || target.is_empty() {
        anyhow::bail!("Пустой код языка в паре '{}'", pair);
    }

    Ok((source.to_string(), target.to_string()))
}
