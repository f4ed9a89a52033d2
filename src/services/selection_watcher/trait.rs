use crate::context::AppContext;
use crate::error::Result;
use std::sync::Arc;

/// Source of the currently selected text
#[async_trait::async_trait]
pub trait SelectionSource: Send + Sync {
    /// Read the current selection; may fail when the tool is missing
    async fn read_selection(&self) -> Result<String>;
}

/// Factory function to create a selection source based on the dry_run flag
pub fn create_selection_source(ctx: &AppContext) -> Arc<dyn SelectionSource> {
    if ctx.dry_run {
        Arc::new(super::dry_selection_source::DryRunSelectionSource::new())
    } else {
        Arc::new(super::xsel::XselSource::new(ctx.config.clone()))
    }
}
