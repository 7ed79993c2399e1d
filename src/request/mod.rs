pub mod domain;
pub mod target;
pub mod types;

pub use domain::{extract_domain, naive_domain, DomainToken, ParseMode};
pub use target::{parse_target, Target, TargetError};
pub use types::*;
