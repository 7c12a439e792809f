//! webMethods.io Integration API client and authentication.
//!
//! This module provides the [`IntegrationClient`] for talking to a tenant,
//! along with the [`Auth`] credential type.

mod auth;
mod integration;

pub use auth::{API_KEY_HEADER, Auth};
pub use integration::IntegrationClient;
