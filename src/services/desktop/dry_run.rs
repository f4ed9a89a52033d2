use super::r#trait::{CursorSource, GeometrySource};
use crate::error::Result;
use crate::events::{AnchorPoint, ScreenGeometry};

/// Фиксированный курсор в центре резервного экрана
pub struct DryRunDesktop {
    geometry: ScreenGeometry,
}

impl DryRunDesktop {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }
}

#[async_trait::async_trait]
impl CursorSource for DryRunDesktop {
    async fn read_cursor_position(&self) -> Result<AnchorPoint> {
        Ok(AnchorPoint::new(
            (self.geometry.width / 2) as i32,
            (self.geometry.height / 2) as i32,
        ))
    }
}

#[async_trait::async_trait]
impl GeometrySource for DryRunDesktop {
    async fn screen_geometry(&self) -> Result<ScreenGeometry> {
        Ok(self.geometry)
    }
}
