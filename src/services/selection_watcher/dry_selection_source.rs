use super::r#trait::SelectionSource;
use crate::error::Result;
use parking_lot::Mutex;

/// Сколько опросов держится одно фиктивное выделение
const TICKS_PER_SELECTION: usize = 20;

const FAKE_SELECTIONS: &[&str] = &[
    "hello",
    "The quick brown fox jumps over the lazy dog",
    "translation",
    "Good morning, how are you?",
];

/// Эмуляция выделений для режима сухого запуска
pub struct DryRunSelectionSource {
    tick: Mutex<usize>,
}

impl DryRunSelectionSource {
    pub fn new() -> Self {
        Self { tick: Mutex::new(0) }
    }
}

#[async_trait::async_trait]
impl SelectionSource for DryRunSelectionSource {
    async fn read_selection(&self) -> Result<String> {
        let mut tick = self.tick.lock();
        let index = (*tick / TICKS_PER_SELECTION) % FAKE_SELECTIONS.len();
        *tick += 1;
        Ok(FAKE_SELECTIONS[index].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_selection_changes_every_n_ticks() {
        let source = DryRunSelectionSource::new();
        let mut reads = Vec::new();
        for _ in 0..TICKS_PER_SELECTION + 1 {
            reads.push(source.read_selection().await.unwrap());
        }
        assert_eq!(reads[0], reads[TICKS_PER_SELECTION - 1]);
        assert_ne!(reads[0], reads[TICKS_PER_SELECTION]);
    }
}
