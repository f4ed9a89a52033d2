//! SelectionWatcher service: responsibility and boundaries
//!
//! This module polls the selection source and publishes SelectionEvent(s) into
//! the mailbox. It MUST NOT translate or position anything; the orchestrator
//! owns those decisions.

mod dry_selection_source;
mod selection_watcher;
mod xsel;
mod r#trait;

pub use self::r#trait::create_selection_source;
pub use self::selection_watcher::SelectionWatcher;
