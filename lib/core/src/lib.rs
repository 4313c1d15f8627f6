pub mod config;
pub mod envelope;
pub mod error;
pub mod module;
pub mod notify;
pub mod types;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use module::Module;
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use types::{format_date, new_id, now_rfc3339, parse_date, today_utc};
