pub mod desktop;
pub mod dictionary;
pub mod dispatcher;
pub mod mailbox;
pub mod orchestrator;
pub mod positioner;
pub mod providers;
pub mod registry;
pub mod selection_watcher;
pub mod ui;

pub use desktop::create_desktop;
pub use dictionary::DictionaryLookup;
pub use dispatcher::TranslationDispatcher;
pub use mailbox::Mailbox;
pub use orchestrator::Orchestrator;
pub use registry::ProviderRegistry;
pub use selection_watcher::{create_selection_source, SelectionWatcher};
pub use ui::{ConsoleSink, UiContext};
