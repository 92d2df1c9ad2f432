//! Loaded dataset and atomic reload
//!
//! Request handlers take a [`DatasetHandle::snapshot`] and work against that
//! `Arc<Dataset>` for the whole request. A reload builds a complete new
//! dataset off to the side and swaps the pointer; readers holding the old
//! snapshot are unaffected, and a failed reload leaves the current one in
//! place.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

use super::{CareerTree, DatasetStats, MetadataOverlay};
use crate::graph::{self, GraphData, LayoutEngine};
use crate::types::Result;

/// Where the dataset files live
#[derive(Debug, Clone)]
pub struct DatasetSource {
    pub tree_path: PathBuf,
    pub metadata_path: PathBuf,
}

impl DatasetSource {
    pub fn new(tree_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            tree_path: tree_path.into(),
            metadata_path: metadata_path.into(),
        }
    }
}

/// Everything read-only that requests consult
#[derive(Debug)]
pub struct Dataset {
    pub tree: CareerTree,
    pub metadata: MetadataOverlay,
    /// Laid-out map, computed once per load
    pub graph: GraphData,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Assemble a dataset from already-built parts
    pub fn new(tree: CareerTree, metadata: MetadataOverlay, engine: &dyn LayoutEngine) -> Self {
        let graph = graph::flatten(&tree, engine);
        Self {
            tree,
            metadata,
            graph,
            loaded_at: Utc::now(),
        }
    }

    /// Read both files and lay out the map
    pub fn load(source: &DatasetSource, engine: &dyn LayoutEngine) -> Result<Self> {
        let tree = CareerTree::load(&source.tree_path)?;
        let metadata = MetadataOverlay::load(&source.metadata_path)?;
        Ok(Self::new(tree, metadata, engine))
    }

    pub fn stats(&self) -> DatasetStats {
        self.tree.stats()
    }
}

/// Shared, swappable dataset
pub struct DatasetHandle {
    source: DatasetSource,
    layout: Arc<dyn LayoutEngine>,
    current: RwLock<Arc<Dataset>>,
}

impl DatasetHandle {
    /// Load the dataset for the first time. Fails if either file is unusable.
    pub fn open(source: DatasetSource, layout: Arc<dyn LayoutEngine>) -> Result<Self> {
        let dataset = Dataset::load(&source, layout.as_ref())?;
        Ok(Self::with_dataset(source, layout, dataset))
    }

    /// Wrap an already-loaded dataset
    pub fn with_dataset(
        source: DatasetSource,
        layout: Arc<dyn LayoutEngine>,
        dataset: Dataset,
    ) -> Self {
        Self {
            source,
            layout,
            current: RwLock::new(Arc::new(dataset)),
        }
    }

    pub fn source(&self) -> &DatasetSource {
        &self.source
    }

    /// Current dataset; stays valid across reloads
    pub fn snapshot(&self) -> Arc<Dataset> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Re-read the configured files and swap them in.
    ///
    /// Blocking: does file I/O and layout. Call from `spawn_blocking`.
    pub fn reload(&self) -> Result<DatasetStats> {
        let dataset = match Dataset::load(&self.source, self.layout.as_ref()) {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(error = %e, "Dataset reload failed, keeping current dataset");
                return Err(e);
            }
        };
        let stats = dataset.stats();

        let fresh = Arc::new(dataset);
        match self.current.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }

        info!(
            nodes = stats.nodes,
            roots = stats.roots,
            ghosts = stats.ghosts,
            orphans = stats.orphans,
            "Dataset reloaded"
        );
        Ok(stats)
    }
}

impl std::fmt::Debug for DatasetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetHandle")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
