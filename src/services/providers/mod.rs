mod apertium;
mod dry_run;
mod google;
mod languages;
mod libretranslate;
mod r#trait;

pub use self::r#trait::{create_provider, TranslationProvider};
