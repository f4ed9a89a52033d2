use crate::config::Config;
use tracing::{info, warn};

/// Проверка наличия внешней утилиты в системе
pub trait ToolProbe: Send + Sync {
    fn is_installed(&self, tool: &str) -> bool;
}

/// Поиск утилит в PATH
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolProbe;

impl ToolProbe for SystemToolProbe {
    fn is_installed(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }
}

/// Отчёт о недостающих утилитах
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    pub missing: Vec<(String, &'static str)>,
}

impl DependencyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Проверить утилиты, нужные для работы с текущей конфигурацией
pub fn check_dependencies(config: &Config, probe: &dyn ToolProbe) -> DependencyReport {
    info!("Проверка внешних зависимостей...");

    let mut required: Vec<(String, &'static str)> = vec![
        (config.selection.command.clone(), "чтение выделения"),
        (config.positioning.cursor_tool.clone(), "позиция курсора и геометрия экрана"),
    ];

    if config
        .translation
        .provider_priority
        .iter()
        .any(|id| id == "apertium")
    {
        required.push((config.providers.apertium.engine.clone(), "офлайн-перевод Apertium"));
    }

    if config.dictionary.enabled {
        required.push((config.dictionary.command.clone(), "словарные определения"));
    }

    let missing: Vec<(String, &'static str)> = required
        .into_iter()
        .filter(|(tool, _)| !probe.is_installed(tool))
        .collect();

    for (tool, purpose) in &missing {
        warn!("Утилита '{}' не найдена ({})", tool, purpose);
    }

    if missing.is_empty() {
        info!("Все внешние утилиты найдены");
    } else {
        info!("Приложение запустится, но часть функций может не работать");
    }

    DependencyReport { missing }
}
