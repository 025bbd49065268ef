//! ArchivesSpace Web API access
//!
//! Session login, the `ArchivesSpaceApi` seam used by the pipeline, and the
//! typed response models it reads.

pub mod auth;
pub mod client;
pub mod models;

#[cfg(test)]
pub mod fake;

pub use auth::{Credentials, login};
pub use client::{ArchivesSpaceApi, ArchivesSpaceClient, get_as};
