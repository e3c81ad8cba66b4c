//! Back-office library modules.

pub mod domain;
pub mod outbound;

pub use domain::{Error, ErrorCode, Repository, SessionContext};
