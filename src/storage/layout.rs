//! Output directory tree
//!
//! ```text
//! {output_root}/downloaded_assets/
//!   workflows/{workflow_id}.zip
//!   flows/flow_list.json
//!   listeners/listener_list.json
//!   messaging/messaging_list.json
//! ```

use crate::error::PullError;
use std::path::{Component, Path, PathBuf};

pub const ASSETS_DIR: &str = "downloaded_assets";

/// The asset categories a project exposes, one output directory each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Workflows,
    Flows,
    Listeners,
    Messaging,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Workflows,
        AssetKind::Flows,
        AssetKind::Listeners,
        AssetKind::Messaging,
    ];

    /// Directory name under `downloaded_assets/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Workflows => "workflows",
            Self::Flows => "flows",
            Self::Listeners => "listeners",
            Self::Messaging => "messaging",
        }
    }

}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Categories saved as a single JSON list. Workflows are stored as one
/// archive per ID instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Flows,
    Listeners,
    Messaging,
}

impl ListKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Flows => "flow_list.json",
            Self::Listeners => "listener_list.json",
            Self::Messaging => "messaging_list.json",
        }
    }
}

impl From<ListKind> for AssetKind {
    fn from(list: ListKind) -> Self {
        match list {
            ListKind::Flows => AssetKind::Flows,
            ListKind::Listeners => AssetKind::Listeners,
            ListKind::Messaging => AssetKind::Messaging,
        }
    }
}

/// Paths inside `{output_root}/downloaded_assets`.
#[derive(Debug, Clone)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(output_root: impl AsRef<Path>) -> Self {
        Self {
            root: output_root.as_ref().join(ASSETS_DIR),
        }
    }

    /// Create every category directory. Safe to call on an existing tree.
    pub fn provision(&self) -> Result<(), PullError> {
        for kind in AssetKind::ALL {
            let dir = self.dir(kind);
            std::fs::create_dir_all(&dir).map_err(|source| PullError::Provision {
                path: dir.clone(),
                source,
            })?;
            log::debug!("Ensured directory {}", dir.display());
        }
        Ok(())
    }

    /// The `downloaded_assets` directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: AssetKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Target file for a category list
    pub fn list_path(&self, list: ListKind) -> PathBuf {
        self.dir(list.into()).join(list.file_name())
    }

    /// Archive path for a workflow.
    ///
    /// Returns `None` when the ID is not a single plain file name, so a
    /// hostile ID like `../../etc/x` can't escape the workflows directory.
    pub fn workflow_archive(&self, workflow_id: &str) -> Option<PathBuf> {
        let file_name = format!("{}.zip", workflow_id);
        let mut components = Path::new(&file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None)
                if !workflow_id.is_empty()
                    && !workflow_id.contains(['/', '\\', '\0'])
                    && workflow_id != "."
                    && workflow_id != ".." =>
            {
                Some(self.dir(AssetKind::Workflows).join(file_name))
            }
            _ => None,
        }
    }
}
