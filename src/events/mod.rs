pub mod geometry;
pub mod selection;
pub mod translation;

pub use geometry::{Insets, Placement, PopupSize, ScreenGeometry};
pub use selection::{AnchorPoint, SelectionEvent};
pub use translation::{FailureReason, ProviderFailure, TranslationOutcome, TranslationResult};
