use crate::utils::text::{preview, word_count};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Точка привязки выделения на экране (обычно позиция курсора)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub x: i32,
    pub y: i32,
}

impl AnchorPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Событие нового выделения текста
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub text: String,
    pub anchor: AnchorPoint,
    pub timestamp: SystemTime,
}

impl SelectionEvent {
    pub fn new(text: impl Into<String>, anchor: AnchorPoint) -> Self {
        Self {
            text: text.into(),
            anchor,
            timestamp: SystemTime::now(),
        }
    }

    /// Выделение состоит из одного слова (для словарного поиска)
    pub fn is_single_word(&self) -> bool {
        word_count(&self.text) == 1
    }
}

impl fmt::Display for SelectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" @ {}",
            preview(&self.text, 50),
            self.anchor
        )
    }
}
