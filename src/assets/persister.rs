//! Category list writers for flows, listeners and messaging

use super::{AssetRecord, ListenerRecord};
use crate::error::PersistError;
use crate::etl::Loader;
use crate::storage::{AssetKind, AssetLayout, ListKind, write_atomic};
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// What a persister did with its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The full list was written to `path`
    Written { path: PathBuf, count: usize },
    /// Nothing to save, no file touched
    Skipped,
}

/// Writes one manifest section as an indented JSON array.
///
/// An empty section is skipped rather than written as `[]`, and an existing
/// file is only ever replaced by a complete new one.
pub struct CategoryPersister<T> {
    kind: AssetKind,
    path: PathBuf,
    _record: PhantomData<fn(T)>,
}

impl CategoryPersister<AssetRecord> {
    /// `flows/flow_list.json`
    pub fn flows(layout: &AssetLayout) -> Self {
        Self::at(layout, ListKind::Flows)
    }

    /// `messaging/messaging_list.json`
    pub fn messaging(layout: &AssetLayout) -> Self {
        Self::at(layout, ListKind::Messaging)
    }
}

impl CategoryPersister<ListenerRecord> {
    /// `listeners/listener_list.json`
    pub fn listeners(layout: &AssetLayout) -> Self {
        Self::at(layout, ListKind::Listeners)
    }
}

impl<T: Serialize> CategoryPersister<T> {
    fn at(layout: &AssetLayout, list: ListKind) -> Self {
        Self {
            kind: list.into(),
            path: layout.list_path(list),
            _record: PhantomData,
        }
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Target file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `records` to the category file.
    pub fn persist(&self, records: &[T]) -> Result<PersistOutcome, PersistError> {
        let category = self.kind.dir_name();

        if records.is_empty() {
            log::info!("No {} to save", category);
            return Ok(PersistOutcome::Skipped);
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|source| PersistError::Serialize { category, source })?;

        write_atomic(&self.path, json.as_bytes()).map_err(|source| PersistError::Write {
            category,
            path: self.path.clone(),
            source,
        })?;

        log::info!(
            "Saved {} {} record(s) to {}",
            records.len(),
            category,
            self.path.display()
        );

        Ok(PersistOutcome::Written {
            path: self.path.clone(),
            count: records.len(),
        })
    }
}

impl<T: Serialize + Send> Loader for CategoryPersister<T> {
    type Item = T;
    type Output = Result<PersistOutcome, PersistError>;

    async fn load(&self, items: Vec<Self::Item>) -> Self::Output {
        self.persist(&items)
    }
}
