//! Loader trait for loading data to destinations

/// Loader trait for loading data to a destination
///
/// The output type is left to the implementor: a loader that isolates
/// failures per item reports one result per item, a loader that writes
/// everything at once reports a single `Result`.
///
/// # Example
/// ```no_run
/// use webmethods_asset_puller::etl::Loader;
/// use std::path::PathBuf;
///
/// struct LineLoader {
///     path: PathBuf,
/// }
///
/// impl Loader for LineLoader {
///     type Item = String;
///     type Output = std::io::Result<usize>;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Self::Output {
///         std::fs::write(&self.path, items.join("\n"))?;
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// What loading reports back
    type Output: Send;

    /// Load items to the destination
    fn load(&self, items: Vec<Self::Item>) -> impl std::future::Future<Output = Self::Output> + Send;
}
