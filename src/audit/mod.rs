pub mod logger;
pub mod reader;
pub mod types;

pub use logger::{validate_session_id, AuditLogger};
pub use reader::AuditReader;
pub use types::*;
