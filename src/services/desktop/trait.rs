use crate::context::AppContext;
use crate::error::Result;
use crate::events::{AnchorPoint, ScreenGeometry};
use std::sync::Arc;

/// Source of the pointer position used as the selection anchor
#[async_trait::async_trait]
pub trait CursorSource: Send + Sync {
    async fn read_cursor_position(&self) -> Result<AnchorPoint>;
}

/// Source of the current monitor work area
#[async_trait::async_trait]
pub trait GeometrySource: Send + Sync {
    async fn screen_geometry(&self) -> Result<ScreenGeometry>;
}

/// Factory function to create the desktop backend based on the dry_run flag.
/// Both handles point at the same backend.
pub fn create_desktop(ctx: &AppContext) -> (Arc<dyn CursorSource>, Arc<dyn GeometrySource>) {
    if ctx.dry_run {
        let desktop = Arc::new(super::dry_run::DryRunDesktop::new(ctx.config.fallback_geometry()));
        (desktop.clone(), desktop)
    } else {
        let desktop = Arc::new(super::xdotool::XdotoolDesktop::new(ctx.config.clone()));
        (desktop.clone(), desktop)
    }
}
