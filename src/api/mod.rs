//! Client for the PersonalDetails REST resource.

mod client;
mod types;

pub use client::{ApiError, PersonClient, RESOURCE_PATH};
pub use types::*;
