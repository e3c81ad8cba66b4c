//! Driven adapters implementing the domain ports.
//!
//! The production system talks to hosted services; this crate ships the
//! in-process adapters used by tests and embedded deployments.

pub mod memory;
