use crate::events::{Placement, TranslationOutcome};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// UI collaborator: receives results on the UI's own execution context
pub trait ResultSink: Send {
    /// Show a result. `popup` reports back when the user closes the shown popup.
    fn on_result(&mut self, outcome: &TranslationOutcome, placement: Placement, popup: PopupHandle);
}

/// Обратная связь от показанного окна: закрыть его раньше истечения времени
pub struct PopupHandle {
    close: Box<dyn FnOnce() -> bool + Send>,
}

impl PopupHandle {
    pub fn new<F>(close: F) -> Self
    where
        F: FnOnce() -> bool + Send + 'static,
    {
        Self {
            close: Box::new(close),
        }
    }

    /// Окно закрыто; `false`, если оно уже было скрыто или заменено
    pub fn close(self) -> bool {
        (self.close)()
    }
}

pub type UiCallback = Box<dyn FnOnce(&mut dyn ResultSink) + Send>;

/// Контекст UI: владеет приёмником и по очереди выполняет запланированные вызовы.
/// Другие задачи никогда не трогают приёмник напрямую.
pub struct UiContext {
    sink: Box<dyn ResultSink>,
    callbacks: mpsc::UnboundedReceiver<UiCallback>,
}

/// Дескриптор для планирования вызовов на контексте UI
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCallback>,
}

impl UiContext {
    pub fn new(sink: Box<dyn ResultSink>) -> (Self, UiHandle) {
        let (tx, callbacks) = mpsc::unbounded_channel();
        (Self { sink, callbacks }, UiHandle { tx })
    }

    /// Работает, пока живы все дескрипторы
    pub async fn run(mut self) {
        debug!("Контекст UI запущен");
        while let Some(callback) = self.callbacks.recv().await {
            callback(self.sink.as_mut());
        }
        debug!("Контекст UI завершён");
    }
}

impl UiHandle {
    /// Запланировать вызов; `false`, если контекст UI уже завершён
    pub fn schedule<F>(&self, callback: F) -> bool
    where
        F: FnOnce(&mut dyn ResultSink) + Send + 'static,
    {
        let scheduled = self.tx.send(Box::new(callback)).is_ok();
        if !scheduled {
            warn!("Контекст UI завершён, результат не будет показан");
        }
        scheduled
    }
}

/// Вывод результатов в консоль вместо всплывающего окна.
/// Новый результат заменяет предыдущий, как новое окно закрывает старое.
#[derive(Default)]
pub struct ConsoleSink {
    current: Option<PopupHandle>,
}

impl ResultSink for ConsoleSink {
    fn on_result(&mut self, outcome: &TranslationOutcome, placement: Placement, popup: PopupHandle) {
        if let Some(previous) = self.current.replace(popup) {
            if previous.close() {
                debug!("Предыдущее окно закрыто");
            }
        }

        match outcome {
            TranslationOutcome::Translated(result) => {
                info!("Показ перевода в {}: {}", placement, result);
                println!("{}", result.text);
                if let Some(definition) = &result.definition {
                    println!("  {}", definition);
                }
            }
            TranslationOutcome::Failed(failure) => {
                warn!("Показ ошибки в {}: {}", placement, failure.message);
                println!("⚠ {}", failure.message);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Приёмник, запоминающий всё показанное
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub shown: Arc<Mutex<Vec<(TranslationOutcome, Placement)>>>,
        pub popups: Arc<Mutex<Vec<PopupHandle>>>,
    }

    impl RecordingSink {
        /// Закрыть последнее показанное окно, как это сделал бы пользователь
        pub fn close_last(&self) -> bool {
            match self.popups.lock().pop() {
                Some(popup) => popup.close(),
                None => false,
            }
        }
    }

    impl ResultSink for RecordingSink {
        fn on_result(&mut self, outcome: &TranslationOutcome, placement: Placement, popup: PopupHandle) {
            self.shown.lock().push((outcome.clone(), placement));
            self.popups.lock().push(popup);
        }
    }

    fn failure(message: &str) -> TranslationOutcome {
        TranslationOutcome::Failed(crate::events::translation::TranslationFailure {
            message: message.to_string(),
            attempts: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_callbacks_run_in_order_on_ui_task() {
        let sink = RecordingSink::default();
        let shown = sink.shown.clone();
        let (ui, handle) = UiContext::new(Box::new(sink));
        let ui_task = tokio::spawn(ui.run());

        for i in 0..3 {
            let outcome = failure(&format!("ошибка {}", i));
            assert!(handle.schedule(move |sink| {
                sink.on_result(&outcome, Placement { x: i, y: i }, PopupHandle::new(|| true))
            }));
        }

        drop(handle);
        ui_task.await.unwrap();

        let placements: Vec<i32> = shown.lock().iter().map(|(_, p)| p.x).collect();
        assert_eq!(placements, vec![0, 1, 2]);
    }

    #[test]
    fn test_console_sink_closes_replaced_popup() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let closed = Arc::new(AtomicUsize::new(0));
        let mut sink = ConsoleSink::default();

        for _ in 0..3 {
            let closed = closed.clone();
            sink.on_result(
                &failure("ошибка"),
                Placement::default(),
                PopupHandle::new(move || {
                    closed.fetch_add(1, Ordering::SeqCst);
                    true
                }),
            );
        }

        // Последнее окно остаётся открытым
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_schedule_after_ui_stopped() {
        let (ui, handle) = UiContext::new(Box::new(RecordingSink::default()));
        drop(ui);
        assert!(!handle.schedule(|_| {}));
    }
}
