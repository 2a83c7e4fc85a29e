// Alert matching module for the tender portal backend core.
//
// Architecture:
// - model.rs: Alert configuration types and validation
// - gates.rs: Gate evaluation logic for the matching pipeline
// - engine.rs: Evaluation entry points, corpus replay and match recording

pub mod engine;
pub mod gates;
pub mod model;
