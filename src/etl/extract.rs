//! Extractor trait for pulling data from a source

/// Extractor trait for pulling data from a source
///
/// # Example
/// ```no_run
/// use webmethods_asset_puller::etl::Extractor;
/// use std::path::PathBuf;
///
/// struct FileExtractor {
///     path: PathBuf,
/// }
///
/// impl Extractor for FileExtractor {
///     type Output = String;
///     type Error = std::io::Error;
///
///     async fn extract(&self) -> Result<Self::Output, Self::Error> {
///         std::fs::read_to_string(&self.path)
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// What a successful extraction yields
    type Output: Send;

    /// Why an extraction failed
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, I/O, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Self::Output, Self::Error>> + Send;
}
