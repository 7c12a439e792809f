//! File system storage operations
//!
//! This module handles the local side of a pull:
//! - The `downloaded_assets/` directory layout
//! - Atomic whole-file writes

mod atomic;
mod layout;

pub use atomic::write_atomic;
pub use layout::{ASSETS_DIR, AssetKind, AssetLayout, ListKind};
