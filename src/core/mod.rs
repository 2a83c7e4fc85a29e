pub mod alerts;
pub mod digest;
pub mod error;
pub mod model;
pub mod settings;
pub mod store;
