#![forbid(unsafe_code)]

pub mod analytics;
pub mod classify;
pub mod csv;
pub mod eval;
pub mod feedback;
pub mod lifecycle;
pub mod sample;
pub mod store;
pub mod workflow;
