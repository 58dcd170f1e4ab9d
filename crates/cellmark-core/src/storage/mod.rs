//! Storage abstraction for annotation persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::annotation::Annotation;
use crate::classes::ClassRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("Annotations not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub count: usize,
    pub message: String,
}

impl SaveReceipt {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            message: format!("Saved {count} annotations"),
        }
    }
}

/// Trait for annotation storage backends, keyed by image id.
pub trait AnnotationStorage: Send + Sync {
    /// Replace the annotations stored for an image.
    fn save(&self, image_id: &str, annotations: &[Annotation]) -> BoxFuture<'_, StorageResult<SaveReceipt>>;

    /// Load the annotations for an image.
    fn load(&self, image_id: &str) -> BoxFuture<'_, StorageResult<Vec<Annotation>>>;

    /// Delete the annotations for an image. Returns whether anything existed.
    fn delete(&self, image_id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// List all image ids that have stored annotations.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Aggregate counts over every stored image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Images with at least one annotation.
    pub annotated_images: usize,
    pub total_annotations: usize,
    /// Count per registered class. Unregistered ids are not counted.
    pub class_distribution: BTreeMap<String, usize>,
}

/// Header of a dataset export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub export_time: DateTime<Utc>,
    pub total_images: usize,
    pub total_annotations: usize,
    pub class_distribution: BTreeMap<String, usize>,
    pub cell_classes: ClassRegistry,
}

/// Every stored annotation, grouped by image id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetExport {
    pub dataset_info: DatasetInfo,
    pub annotations: BTreeMap<String, Vec<Annotation>>,
}

fn class_distribution<'a>(
    registry: &ClassRegistry,
    annotations: impl Iterator<Item = &'a Annotation>,
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = registry.ids().map(|id| (id.to_string(), 0)).collect();
    for annotation in annotations {
        if let Some(count) = counts.get_mut(annotation.class_id().as_str()) {
            *count += 1;
        }
    }
    counts
}

/// Load everything the storage holds. Images that fail to load are logged
/// and skipped.
async fn load_all(storage: &dyn AnnotationStorage) -> StorageResult<BTreeMap<String, Vec<Annotation>>> {
    let mut all = BTreeMap::new();
    for image_id in storage.list().await? {
        match storage.load(&image_id).await {
            Ok(annotations) => {
                all.insert(image_id, annotations);
            }
            Err(err) => log::error!("Skipping annotations for {image_id}: {err}"),
        }
    }
    Ok(all)
}

/// Collect every stored annotation with per-class counts.
pub async fn export_dataset(storage: &dyn AnnotationStorage, registry: &ClassRegistry) -> StorageResult<DatasetExport> {
    let annotations = load_all(storage).await?;
    let total_annotations = annotations.values().map(Vec::len).sum();
    let class_distribution = class_distribution(registry, annotations.values().flatten());
    Ok(DatasetExport {
        dataset_info: DatasetInfo {
            export_time: Utc::now(),
            total_images: annotations.len(),
            total_annotations,
            class_distribution,
            cell_classes: registry.clone(),
        },
        annotations,
    })
}

/// Summary counts over every stored image.
pub async fn dataset_stats(storage: &dyn AnnotationStorage, registry: &ClassRegistry) -> StorageResult<DatasetStats> {
    let annotations = load_all(storage).await?;
    Ok(DatasetStats {
        annotated_images: annotations.values().filter(|a| !a.is_empty()).count(),
        total_annotations: annotations.values().map(Vec::len).sum(),
        class_distribution: class_distribution(registry, annotations.values().flatten()),
    })
}
