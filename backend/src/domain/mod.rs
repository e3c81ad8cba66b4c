//! Core domain of the back-office data layer.
//!
//! The domain owns the entity catalogue, the generic repository with its
//! cached listings and soft-delete lifecycle, the session context over the
//! authentication provider, and the ports the outbound adapters implement.
//! Nothing here talks to a concrete backend; collaborators arrive through
//! [`ports`] trait objects wired at construction.

pub mod actor;
pub mod audit;
pub mod auth;
pub mod document;
pub mod entities;
pub mod entity;
pub mod error;
pub mod messages;
pub mod ports;
pub mod profile;
pub mod repository;
pub mod session;

pub use self::actor::Actor;
pub use self::auth::{LoginCredentials, PersistenceMode};
pub use self::document::{Patch, RecordId};
pub use self::entity::{Entity, SearchTerm, SoftDeletable};
pub use self::error::{Error, ErrorCode};
pub use self::profile::ProfileImageService;
pub use self::repository::{
    AgencyRepository, ClientRepository, FlightRepository, HotelRepository, Repository,
    SearchResults, StaffUserRepository, TravelPackageRepository, TravelServiceRepository,
};
pub use self::session::SessionContext;
