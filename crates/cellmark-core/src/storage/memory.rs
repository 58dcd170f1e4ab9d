//! In-memory storage implementation.

use super::{AnnotationStorage, BoxFuture, SaveReceipt, StorageError, StorageResult};
use crate::annotation::Annotation;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    images: RwLock<HashMap<String, Vec<Annotation>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl AnnotationStorage for MemoryStorage {
    fn save(&self, image_id: &str, annotations: &[Annotation]) -> BoxFuture<'_, StorageResult<SaveReceipt>> {
        let image_id = image_id.to_string();
        let annotations = annotations.to_vec();
        Box::pin(async move {
            let mut images = self.images.write().map_err(lock_error)?;
            let receipt = SaveReceipt::new(annotations.len());
            images.insert(image_id, annotations);
            Ok(receipt)
        })
    }

    fn load(&self, image_id: &str) -> BoxFuture<'_, StorageResult<Vec<Annotation>>> {
        let image_id = image_id.to_string();
        Box::pin(async move {
            let images = self.images.read().map_err(lock_error)?;
            images.get(&image_id).cloned().ok_or(StorageError::NotFound(image_id))
        })
    }

    fn delete(&self, image_id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let image_id = image_id.to_string();
        Box::pin(async move {
            let mut images = self.images.write().map_err(lock_error)?;
            Ok(images.remove(&image_id).is_some())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let images = self.images.read().map_err(lock_error)?;
            let mut ids: Vec<String> = images.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }
}
