use serde::{Deserialize, Serialize};
use std::fmt;

/// Отступы рабочей области от краёв экрана (панели, доки)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Insets {
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub top: u32,
    #[serde(default)]
    pub right: u32,
    #[serde(default)]
    pub bottom: u32,
}

/// Геометрия экрана
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub insets: Insets,
}

impl ScreenGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            insets: Insets::default(),
        }
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Горизонтальные границы рабочей области: [start, end)
    pub fn horizontal_bounds(&self) -> (i64, i64) {
        let start = i64::from(self.insets.left);
        let end = i64::from(self.width) - i64::from(self.insets.right);
        (start, end.max(start))
    }

    /// Вертикальные границы рабочей области: [start, end)
    pub fn vertical_bounds(&self) -> (i64, i64) {
        let start = i64::from(self.insets.top);
        let end = i64::from(self.height) - i64::from(self.insets.bottom);
        (start, end.max(start))
    }
}

impl fmt::Display for ScreenGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Размер всплывающего окна
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopupSize {
    pub width: u32,
    pub height: u32,
}

impl PopupSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Вычисленная позиция левого верхнего угла окна
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_respect_insets() {
        let geometry = ScreenGeometry::new(1920, 1080).with_insets(Insets {
            left: 0,
            top: 27,
            right: 64,
            bottom: 0,
        });
        assert_eq!(geometry.horizontal_bounds(), (0, 1856));
        assert_eq!(geometry.vertical_bounds(), (27, 1080));
    }

    #[test]
    fn test_bounds_never_invert() {
        let geometry = ScreenGeometry::new(10, 10).with_insets(Insets {
            left: 8,
            top: 0,
            right: 8,
            bottom: 0,
        });
        let (start, end) = geometry.horizontal_bounds();
        assert!(end >= start);
    }
}
