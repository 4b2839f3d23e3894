//! Append-only ndjson log of administrative actions.

mod events;
mod logger;

pub use events::{ts_now, AuditEvent};
pub use logger::AuditLogger;
