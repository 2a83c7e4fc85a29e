#![warn(clippy::all, clippy::pedantic)]
pub mod core;

pub use crate::core::alerts::engine::{evaluate, record_match, test_against_corpus, MatchResult};
pub use crate::core::alerts::model::AlertConfiguration;
pub use crate::core::error::{AlertError, ValidationError};
pub use crate::core::model::Tender;
pub use crate::core::store::AlertStore;
