//! Extract and load seams of the pull pipeline
//!
//! A pull extracts one asset manifest from the tenant and hands each of its
//! sections to a loader: workflow IDs to the archive downloader, the other
//! categories to JSON list writers. Nothing is transformed in between.

mod extract;
mod load;

pub use extract::Extractor;
pub use load::Loader;
