//! The seven back-office entity catalogues.
//!
//! Each module defines one typed record with its wire field names and its
//! searchable-field matching; clients and users additionally carry the
//! soft-delete tombstone. All of them plug into the same generic
//! [`crate::domain::Repository`].

pub mod agency;
pub mod client;
pub mod flight;
pub mod hotel;
pub mod package;
pub mod service;
pub mod staff;

pub use self::agency::Agency;
pub use self::client::{Client, ClientStatus};
pub use self::flight::Flight;
pub use self::hotel::Hotel;
pub use self::package::TravelPackage;
pub use self::service::TravelService;
pub use self::staff::StaffUser;
