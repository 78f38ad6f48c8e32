#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod fields;
pub mod list;
pub mod migrate;
pub mod model;
pub mod schema;
pub mod templates;
pub mod traits;
pub mod types;
