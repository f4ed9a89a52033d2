use crate::config::Config;
use std::sync::Arc;

/// Общий контекст приложения, передаётся в конструкторы сервисов
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub dry_run: bool,
}

impl AppContext {
    pub fn new(config: Config, dry_run: bool) -> Self {
        Self {
            config: Arc::new(config),
            dry_run,
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Config::default(), false)
    }
}
