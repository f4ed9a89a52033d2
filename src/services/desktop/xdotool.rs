use super::r#trait::{CursorSource, GeometrySource};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::events::{AnchorPoint, Insets, ScreenGeometry};
use crate::utils::ToolCommand;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Курсор и геометрия экрана через xdotool (+ xprop для рабочей области)
pub struct XdotoolDesktop {
    config: Arc<Config>,
}

impl XdotoolDesktop {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn tool(&self) -> ToolCommand {
        ToolCommand::new(&self.config.positioning.cursor_tool).timeout(QUERY_TIMEOUT)
    }

    async fn work_area_insets(&self, width: u32, height: u32) -> Insets {
        let output = ToolCommand::new("xprop")
            .args(["-root", "_NET_WORKAREA"])
            .timeout(QUERY_TIMEOUT)
            .output()
            .await;

        match output.ok().and_then(|o| parse_work_area(&o, width, height)) {
            Some(insets) => insets,
            None => {
                debug!("_NET_WORKAREA недоступен, используем отступы из конфигурации");
                self.config.positioning.insets
            }
        }
    }
}

/// Разбор вывода `xdotool getmouselocation --shell`
pub(crate) fn parse_mouse_location(output: &str) -> Option<AnchorPoint> {
    let mut x = None;
    let mut y = None;
    for line in output.lines() {
        match line.trim().split_once('=') {
            Some(("X", value)) => x = value.trim().parse().ok(),
            Some(("Y", value)) => y = value.trim().parse().ok(),
            _ => {}
        }
    }
    Some(AnchorPoint::new(x?, y?))
}

/// Разбор вывода `xdotool getdisplaygeometry`: "1920 1080"
pub(crate) fn parse_display_geometry(output: &str) -> Option<(u32, u32)> {
    let mut parts = output.split_whitespace();
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    Some((width, height))
}

/// Разбор `_NET_WORKAREA(CARDINAL) = x, y, w, h, ...` (первый рабочий стол)
pub(crate) fn parse_work_area(output: &str, width: u32, height: u32) -> Option<Insets> {
    let (_, values) = output.split_once('=')?;
    let numbers: Vec<u32> = values
        .split(',')
        .take(4)
        .map(|v| v.trim().parse().ok())
        .collect::<Option<Vec<_>>>()?;

    if numbers.len() != 4 {
        return None;
    }

    let (x, y, w, h) = (numbers[0], numbers[1], numbers[2], numbers[3]);
    Some(Insets {
        left: x,
        top: y,
        right: width.saturating_sub(x.saturating_add(w)),
        bottom: height.saturating_sub(y.saturating_add(h)),
    })
}

#[async_trait::async_trait]
impl CursorSource for XdotoolDesktop {
    async fn read_cursor_position(&self) -> Result<AnchorPoint> {
        let output = self
            .tool()
            .args(["getmouselocation", "--shell"])
            .output()
            .await?;

        let anchor = parse_mouse_location(&output).ok_or_else(|| {
            AppError::Internal(format!("неожиданный вывод getmouselocation: {:?}", output))
        })?;
        debug!("Позиция курсора: {}", anchor);
        Ok(anchor)
    }
}

#[async_trait::async_trait]
impl GeometrySource for XdotoolDesktop {
    async fn screen_geometry(&self) -> Result<ScreenGeometry> {
        let output = self.tool().arg("getdisplaygeometry").output().await?;

        let (width, height) = parse_display_geometry(&output).ok_or_else(|| {
            AppError::Internal(format!("неожиданный вывод getdisplaygeometry: {:?}", output))
        })?;

        let insets = self.work_area_insets(width, height).await;
        Ok(ScreenGeometry::new(width, height).with_insets(insets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mouse_location() {
        let output = "X=812\nY=433\nSCREEN=0\nWINDOW=62914567\n";
        assert_eq!(parse_mouse_location(output), Some(AnchorPoint::new(812, 433)));
        assert_eq!(parse_mouse_location("SCREEN=0\n"), None);
    }

    #[test]
    fn test_parse_display_geometry() {
        assert_eq!(parse_display_geometry("1920 1080\n"), Some((1920, 1080)));
        assert_eq!(parse_display_geometry("oops"), None);
    }

    #[test]
    fn test_parse_work_area() {
        let output = "_NET_WORKAREA(CARDINAL) = 0, 27, 1920, 1053, 0, 27, 1920, 1053\n";
        assert_eq!(
            parse_work_area(output, 1920, 1080),
            Some(Insets {
                left: 0,
                top: 27,
                right: 0,
                bottom: 0
            })
        );
        assert_eq!(parse_work_area("_NET_WORKAREA:  not found.", 1920, 1080), None);
    }
}
