pub mod atomic;
pub mod journal;
pub mod kv;
pub mod state;

pub use journal::Journal;
pub use kv::{FileKvStore, MemoryKvStore};
pub use state::{DecommStore, Notification, NOTIFICATION_CAP};
