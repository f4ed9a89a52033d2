use crate::config::Config;
use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::events::{Placement, SelectionEvent, TranslationOutcome};
use crate::services::desktop::GeometrySource;
use crate::services::dictionary::DictionaryLookup;
use crate::services::dispatcher::TranslationDispatcher;
use crate::services::mailbox::Mailbox;
use crate::services::positioner;
use crate::services::ui::{PopupHandle, UiHandle};
use crate::debug_if_enabled;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Watching,
    Translating { seq: u64 },
    Displaying { seq: u64 },
}

/// Состояние, общее для цикла оркестратора, задач перевода и контекста UI
struct Shared {
    state: Mutex<OrchestratorState>,
    latest_seq: AtomicU64,
}

impl Shared {
    fn is_current(&self, seq: u64) -> bool {
        self.latest_seq.load(Ordering::Acquire) == seq
    }

    fn set_state(&self, state: OrchestratorState) {
        let mut current = self.state.lock();
        debug_if_enabled!("Оркестратор: {:?} -> {:?}", *current, state);
        *current = state;
    }

    /// Новый запрос: номер и состояние меняются под одной блокировкой.
    /// Возвращает номер и предыдущее состояние.
    fn begin_request(&self) -> (u64, OrchestratorState) {
        let mut state = self.state.lock();
        let seq = self.latest_seq.fetch_add(1, Ordering::AcqRel) + 1;
        let previous = std::mem::replace(&mut *state, OrchestratorState::Translating { seq });
        debug_if_enabled!("Оркестратор: {:?} -> {:?}", previous, *state);
        (seq, previous)
    }

    /// Translating(seq) -> Displaying(seq); состояние более нового запроса не трогаем
    fn mark_displayed(&self, seq: u64) -> bool {
        let mut state = self.state.lock();
        if *state == (OrchestratorState::Translating { seq }) {
            *state = OrchestratorState::Displaying { seq };
            true
        } else {
            false
        }
    }

    /// Вернуться к ожиданию, если показан именно этот результат
    fn dismiss(&self, seq: u64) -> bool {
        let mut state = self.state.lock();
        if *state == (OrchestratorState::Displaying { seq }) {
            *state = OrchestratorState::Watching;
            true
        } else {
            false
        }
    }
}

/// Связывает события выделения с переводом, позиционированием и показом.
///
/// Каждое выделение получает номер; показывается только результат с последним
/// номером, остальные отбрасываются при доставке.
pub struct Orchestrator {
    config: Arc<Config>,
    dispatcher: Arc<TranslationDispatcher>,
    dictionary: Option<Arc<DictionaryLookup>>,
    geometry: Arc<dyn GeometrySource>,
    mailbox: Arc<Mailbox<SelectionEvent>>,
    ui: UiHandle,
    preferred_provider: Option<String>,
    source_lang: String,
    target_lang: String,
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Всё, что нужно задаче перевода, без ссылки на сам оркестратор
struct Request {
    seq: u64,
    event: SelectionEvent,
    config: Arc<Config>,
    dispatcher: Arc<TranslationDispatcher>,
    dictionary: Option<Arc<DictionaryLookup>>,
    geometry: Arc<dyn GeometrySource>,
    ui: UiHandle,
    preferred_provider: Option<String>,
    source_lang: String,
    target_lang: String,
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(
        ctx: &AppContext,
        dispatcher: Arc<TranslationDispatcher>,
        dictionary: Option<DictionaryLookup>,
        geometry: Arc<dyn GeometrySource>,
        mailbox: Arc<Mailbox<SelectionEvent>>,
        ui: UiHandle,
    ) -> Result<Self> {
        let (source_lang, target_lang) = ctx.config.languages().map_err(AppError::Config)?;

        info!(
            "Инициализация Orchestrator ({}->{}, словарь: {})",
            source_lang,
            target_lang,
            dictionary.is_some()
        );

        Ok(Self {
            config: ctx.config.clone(),
            dispatcher,
            dictionary: dictionary.map(Arc::new),
            geometry,
            mailbox,
            ui,
            preferred_provider: ctx.config.translation.preferred_provider.clone(),
            source_lang,
            target_lang,
            shared: Arc::new(Shared {
                state: Mutex::new(OrchestratorState::Idle),
                latest_seq: AtomicU64::new(0),
            }),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Переопределить предпочтительного провайдера (например, из командной строки)
    pub fn with_preferred_provider(mut self, provider: Option<String>) -> Self {
        if provider.is_some() {
            self.preferred_provider = provider;
        }
        self
    }

    pub fn state(&self) -> OrchestratorState {
        *self.shared.state.lock()
    }

    /// Обрабатывать выделения, пока почтовый ящик не закрыт
    pub async fn run(self: Arc<Self>) {
        self.shared.set_state(OrchestratorState::Watching);
        info!("Orchestrator запущен");

        while let Some(event) = self.mailbox.recv().await {
            self.handle_selection(event);
        }

        let mut tasks = self.tasks.lock();
        for task in tasks.drain(..) {
            task.abort();
        }
        self.shared.set_state(OrchestratorState::Idle);
        info!("Orchestrator остановлен");
    }

    /// Закрыть почтовый ящик; `run` завершится после текущего события
    pub fn shutdown(&self) {
        info!("Остановка Orchestrator...");
        self.mailbox.close();
    }

    fn handle_selection(&self, event: SelectionEvent) {
        let (seq, previous) = self.shared.begin_request();

        if let OrchestratorState::Translating { seq: stale } = previous {
            debug!("Запрос #{} устарел, его результат будет отброшен", stale);
        }
        info!("Запрос #{}: {}", seq, event);

        let request = Request {
            seq,
            event,
            config: self.config.clone(),
            dispatcher: self.dispatcher.clone(),
            dictionary: self.dictionary.clone(),
            geometry: self.geometry.clone(),
            ui: self.ui.clone(),
            preferred_provider: self.preferred_provider.clone(),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
            shared: self.shared.clone(),
        };

        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(tokio::spawn(request.execute()));
    }
}

impl Request {
    async fn execute(self) {
        let seq = self.seq;
        let outcome = self.translate().await;

        if !self.shared.is_current(seq) {
            debug!("Результат запроса #{} устарел до доставки", seq);
            return;
        }

        let placement = self.placement().await;
        let shared = self.shared.clone();

        let scheduled = self.ui.schedule(move |sink| {
            // Повторная проверка уже на контексте UI
            if !shared.is_current(seq) {
                debug!("Результат запроса #{} отброшен при доставке", seq);
                return;
            }

            let popup_shared = shared.clone();
            let popup = PopupHandle::new(move || {
                let closed = popup_shared.dismiss(seq);
                if closed {
                    debug!("Окно запроса #{} закрыто пользователем", seq);
                }
                closed
            });

            debug!("Показ результата #{} (успех: {})", seq, outcome.is_success());
            sink.on_result(&outcome, placement, popup);
            if !shared.mark_displayed(seq) {
                debug!("Во время показа #{} пришло новое выделение", seq);
            }
        });

        if scheduled {
            tokio::time::sleep(self.config.display_duration()).await;
            if self.shared.dismiss(seq) {
                debug!("Время показа результата #{} истекло", seq);
            }
        }
    }

    async fn translate(&self) -> TranslationOutcome {
        let result = self
            .dispatcher
            .translate(
                &self.event.text,
                &self.source_lang,
                &self.target_lang,
                self.preferred_provider.as_deref(),
            )
            .await;

        let result = match result {
            Ok(translation) => {
                let definition = self.definition().await;
                Ok(translation.with_definition(definition))
            }
            Err(e) => {
                warn!("Запрос #{} не выполнен: {}", self.seq, e);
                Err(e)
            }
        };

        TranslationOutcome::from(result)
    }

    async fn definition(&self) -> Option<String> {
        let dictionary = self.dictionary.as_ref()?;
        if !self.event.is_single_word() {
            return None;
        }

        match dictionary.lookup(&self.event.text, &self.source_lang).await {
            Ok(definition) => Some(definition),
            Err(e) => {
                debug!("Определение для '{}' не получено: {}", self.event.text, e);
                None
            }
        }
    }

    /// Геометрия запрашивается заново для каждого показа
    async fn placement(&self) -> Placement {
        let geometry = match self.geometry.screen_geometry().await {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!("Не удалось получить геометрию экрана: {}", e);
                self.config.fallback_geometry()
            }
        };

        let placement = positioner::place(
            self.event.anchor,
            self.config.popup_size(),
            geometry,
            self.config.positioning.popup_margin_px,
        );
        debug!("Запрос #{}: окно в {} на экране {}", self.seq, placement, geometry);
        placement
    }
}
