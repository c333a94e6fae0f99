//! Minimal OpenStack client: clouds.yaml, Keystone v3 tokens and listing.

pub mod client;
pub mod clouds;
pub mod identity;

pub use client::{ServiceClient, http_client};
pub use clouds::{Cloud, load_cloud};
pub use identity::{Session, authenticate};
