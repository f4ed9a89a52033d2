use super::r#trait::SelectionSource;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::utils::ToolCommand;
use std::sync::Arc;
use std::time::Duration;

/// Чтение PRIMARY-выделения через `xsel -o` (команда настраивается)
pub struct XselSource {
    config: Arc<Config>,
}

impl XselSource {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl SelectionSource for XselSource {
    async fn read_selection(&self) -> Result<String> {
        let selection = &self.config.selection;
        ToolCommand::new(&selection.command)
            .args(selection.args.iter().cloned())
            .timeout(Duration::from_millis(selection.read_timeout_ms))
            .output()
            .await
            .map_err(|e| AppError::SelectionReadFailed(e.to_string()))
    }
}
