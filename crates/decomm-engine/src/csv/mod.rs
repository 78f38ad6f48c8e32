pub mod export;
pub mod import;
mod line;

pub use export::{export_csv, HEADER};
pub use import::{import_csv, ImportReport};
