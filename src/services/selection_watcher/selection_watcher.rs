use super::r#trait::SelectionSource;
use crate::config::Config;
use crate::context::AppContext;
use crate::events::{AnchorPoint, SelectionEvent};
use crate::services::desktop::CursorSource;
use crate::services::mailbox::Mailbox;
use crate::trace_if_enabled;
use crate::utils::text::preview;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

pub struct SelectionWatcher {
    config: Arc<Config>,
    source: Arc<dyn SelectionSource>,
    cursor: Arc<dyn CursorSource>,
    mailbox: Arc<Mailbox<SelectionEvent>>,
    shutdown: watch::Receiver<bool>,
    last_selection: Option<String>,
    consecutive_failures: u32,
}

impl SelectionWatcher {
    pub fn new(
        ctx: &AppContext,
        source: Arc<dyn SelectionSource>,
        cursor: Arc<dyn CursorSource>,
        mailbox: Arc<Mailbox<SelectionEvent>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        info!(
            "Инициализация SelectionWatcher (интервал {}мс, команда '{}')",
            ctx.config.selection.poll_interval_ms, ctx.config.selection.command
        );

        Self {
            config: ctx.config.clone(),
            source,
            cursor,
            mailbox,
            shutdown,
            last_selection: None,
            consecutive_failures: 0,
        }
    }

    /// Цикл опроса до сигнала остановки. Начатый опрос всегда доводится до конца.
    pub async fn run(mut self) {
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("SelectionWatcher запущен");

        loop {
            // Получатель закрыл ящик: публиковать больше некуда
            if *self.shutdown.borrow() || self.mailbox.is_closed() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.shutdown.changed() => break,
            }

            self.poll_once().await;
        }

        info!("SelectionWatcher остановлен");
    }

    /// Один опрос: публикует событие, если выделение изменилось
    pub async fn poll_once(&mut self) -> Option<SelectionEvent> {
        let raw = match self.source.read_selection().await {
            Ok(raw) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "Чтение выделения восстановлено после {} ошибок",
                        self.consecutive_failures
                    );
                    self.consecutive_failures = 0;
                }
                raw
            }
            Err(e) => {
                // Первую ошибку показываем, повторяющиеся не засоряют лог
                if self.consecutive_failures == 0 {
                    warn!("{}", e);
                } else {
                    debug!("{} (подряд: {})", e, self.consecutive_failures + 1);
                }
                self.consecutive_failures += 1;
                return None;
            }
        };

        let text = raw.trim();
        if text.is_empty() || self.last_selection.as_deref() == Some(text) {
            return None;
        }

        let length = text.chars().count();
        let limits = &self.config.selection;
        if length < limits.min_length || length > limits.max_length {
            trace_if_enabled!(
                "Выделение длиной {} вне границ {}..{}",
                length,
                limits.min_length,
                limits.max_length
            );
            return None;
        }

        // Курсор запрашиваем только при изменении выделения
        let anchor = match self.cursor.read_cursor_position().await {
            Ok(anchor) => anchor,
            Err(e) => {
                warn!("Не удалось получить позицию курсора: {}", e);
                AnchorPoint::default()
            }
        };

        let text = text.to_string();
        self.last_selection = Some(text.clone());
        let event = SelectionEvent::new(text, anchor);

        info!("Новое выделение: {}", event);
        if let Some(superseded) = self.mailbox.put(event.clone()) {
            debug!("Необработанное выделение затёрто: \"{}\"", preview(&superseded.text, 30));
        }

        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct ScriptedSource {
        reads: Mutex<VecDeque<Result<String>>>,
    }

    impl ScriptedSource {
        fn new(reads: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                reads: Mutex::new(reads.into()),
            })
        }
    }

    #[async_trait::async_trait]
    impl SelectionSource for ScriptedSource {
        async fn read_selection(&self) -> Result<String> {
            self.reads
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    struct CountingCursor {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl CursorSource for CountingCursor {
        async fn read_cursor_position(&self) -> Result<AnchorPoint> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as i32;
            if self.fail {
                Err(AppError::Internal("xdotool недоступен".to_string()))
            } else {
                Ok(AnchorPoint::new(100 + n, 200))
            }
        }
    }

    fn cursor(fail: bool) -> Arc<CountingCursor> {
        Arc::new(CountingCursor {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn ok(text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn watcher(
        ctx: &AppContext,
        source: Arc<ScriptedSource>,
        cursor: Arc<CountingCursor>,
    ) -> (SelectionWatcher, Arc<Mailbox<SelectionEvent>>, watch::Sender<bool>) {
        let mailbox = Arc::new(Mailbox::new());
        let (tx, rx) = watch::channel(false);
        (
            SelectionWatcher::new(ctx, source, cursor, mailbox.clone(), rx),
            mailbox,
            tx,
        )
    }

    #[tokio::test]
    async fn test_identical_reads_emit_once() {
        let ctx = AppContext::default();
        let source = ScriptedSource::new(vec![ok("hello"), ok("hello"), ok(" hello \n"), ok("world")]);
        let cursor = cursor(false);
        let (mut watcher, mailbox, _tx) = watcher(&ctx, source, cursor.clone());

        let mut emitted = Vec::new();
        for _ in 0..4 {
            if let Some(event) = watcher.poll_once().await {
                emitted.push(event.text);
            }
        }

        assert_eq!(emitted, vec!["hello", "world"]);
        // Курсор запрашивался только при изменениях
        assert_eq!(cursor.calls.load(Ordering::SeqCst), 2);
        // В ящике только последнее событие
        assert_eq!(mailbox.try_take().map(|e| e.text).as_deref(), Some("world"));
        assert!(mailbox.try_take().is_none());
    }

    #[tokio::test]
    async fn test_failures_and_blank_reads_are_no_change() {
        let ctx = AppContext::default();
        let source = ScriptedSource::new(vec![
            ok("hello"),
            Err(AppError::SelectionReadFailed("xsel: not found".to_string())),
            ok("   "),
            ok("hello"),
        ]);
        let (mut watcher, _mailbox, _tx) = watcher(&ctx, source, cursor(false));

        assert!(watcher.poll_once().await.is_some());
        assert!(watcher.poll_once().await.is_none());
        assert!(watcher.poll_once().await.is_none());
        // После ошибки и пустого чтения то же выделение не повторяется
        assert!(watcher.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn test_length_limits() {
        let mut config = Config::default();
        config.selection.min_length = 2;
        config.selection.max_length = 5;
        let ctx = AppContext::new(config, false);
        let source = ScriptedSource::new(vec![ok("a"), ok("toolongtext"), ok("ok!")]);
        let (mut watcher, _mailbox, _tx) = watcher(&ctx, source, cursor(false));

        assert!(watcher.poll_once().await.is_none());
        assert!(watcher.poll_once().await.is_none());
        assert_eq!(watcher.poll_once().await.unwrap().text, "ok!");
    }

    #[tokio::test]
    async fn test_cursor_failure_uses_origin() {
        let ctx = AppContext::default();
        let source = ScriptedSource::new(vec![ok("hello")]);
        let (mut watcher, _mailbox, _tx) = watcher(&ctx, source, cursor(true));

        let event = watcher.poll_once().await.unwrap();
        assert_eq!(event.anchor, AnchorPoint::default());
    }

    #[tokio::test]
    async fn test_run_stops_on_signal() {
        let mut config = Config::default();
        config.selection.poll_interval_ms = 50;
        let ctx = AppContext::new(config, false);
        let source = ScriptedSource::new(vec![ok("hello")]);
        let (watcher, mailbox, tx) = watcher(&ctx, source, cursor(false));

        let handle = tokio::spawn(watcher.run());
        let event = tokio::time::timeout(Duration::from_secs(1), mailbox.recv())
            .await
            .unwrap();
        assert_eq!(event.map(|e| e.text).as_deref(), Some("hello"));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_when_mailbox_closed() {
        let mut config = Config::default();
        config.selection.poll_interval_ms = 50;
        let ctx = AppContext::new(config, false);
        let source = ScriptedSource::new(vec![ok("hello")]);
        let (watcher, mailbox, _tx) = watcher(&ctx, source, cursor(false));

        mailbox.close();
        tokio::time::timeout(Duration::from_secs(1), tokio::spawn(watcher.run()))
            .await
            .unwrap()
            .unwrap();
    }
}
