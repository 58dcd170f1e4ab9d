//! File-based storage implementation.

use super::{AnnotationStorage, BoxFuture, DatasetExport, SaveReceipt, StorageError, StorageResult};
use crate::annotation::Annotation;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Each image gets `<id>.json` with its annotations and a `<id>.csv` side
/// file with one `class,x,y,timestamp` row per annotation (polygons use
/// their centroid). Dataset exports go to `exports/` under the base path.
pub struct FileStorage {
    /// Base directory for annotation files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/cellmark/annotations/`
    /// On Windows: `%LOCALAPPDATA%\cellmark\annotations\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("cellmark").join("annotations"))
    }

    fn safe_id(id: &str) -> String {
        id.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    /// Path of the JSON file for an image id.
    pub fn json_path(&self, image_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", Self::safe_id(image_id)))
    }

    /// Path of the CSV side file for an image id.
    pub fn csv_path(&self, image_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", Self::safe_id(image_id)))
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.base_path.join("exports")
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write a dataset export as pretty JSON and return its path.
    pub fn write_export(&self, export: &DatasetExport) -> StorageResult<PathBuf> {
        let dir = self.exports_dir();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Io(format!("Failed to create {}: {e}", dir.display())))?;
        let name = format!(
            "dataset_export_{}.json",
            export.dataset_info.export_time.format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(name);
        let json = serde_json::to_string_pretty(export).map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))?;
        log::info!("Dataset exported to {}", path.display());
        Ok(path)
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render the CSV side file.
fn to_csv(annotations: &[Annotation]) -> String {
    let mut out = String::from("class,x,y,timestamp\n");
    for annotation in annotations {
        let anchor = annotation.anchor();
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{}",
            csv_field(annotation.class_id().as_str()),
            anchor.x,
            anchor.y,
            annotation.created_at().to_rfc3339()
        );
    }
    out
}

impl AnnotationStorage for FileStorage {
    fn save(&self, image_id: &str, annotations: &[Annotation]) -> BoxFuture<'_, StorageResult<SaveReceipt>> {
        let json_path = self.json_path(image_id);
        let csv_path = self.csv_path(image_id);
        let json = match serde_json::to_string_pretty(annotations) {
            Ok(j) => j,
            Err(e) => return Box::pin(async move { Err(StorageError::Serialization(e.to_string())) }),
        };
        let csv = to_csv(annotations);
        let count = annotations.len();

        Box::pin(async move {
            fs::write(&json_path, json)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", json_path.display())))?;
            fs::write(&csv_path, csv)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", csv_path.display())))?;
            log::info!("Saved {count} annotations to {}", json_path.display());
            Ok(SaveReceipt::new(count))
        })
    }

    fn load(&self, image_id: &str) -> BoxFuture<'_, StorageResult<Vec<Annotation>>> {
        let path = self.json_path(image_id);
        let id_owned = image_id.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(id_owned));
            }

            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {e}", path.display())))?;

            serde_json::from_str(&json)
                .map_err(|e| StorageError::Serialization(format!("Failed to parse {}: {e}", path.display())))
        })
    }

    fn delete(&self, image_id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let paths = [self.json_path(image_id), self.csv_path(image_id)];

        Box::pin(async move {
            let mut deleted = false;
            for path in paths.iter().filter(|p| p.exists()) {
                fs::remove_file(path)
                    .map_err(|e| StorageError::Io(format!("Failed to delete {}: {e}", path.display())))?;
                deleted = true;
            }
            Ok(deleted)
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries =
                fs::read_dir(&base).map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::{ClassId, ClassRegistry};
    use crate::storage::export_dataset;
    use crate::storage::test_util::block_on;
    use kurbo::Point;
    use tempfile::tempdir;

    fn sample() -> Vec<Annotation> {
        vec![
            Annotation::circle(Point::new(12.5, 40.0), 15.0, ClassId::new("eggs")),
            Annotation::polygon(
                vec![Point::new(0.0, 0.0), Point::new(6.0, 0.0), Point::new(0.0, 3.0)],
                ClassId::new("honey"),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let annotations = sample();

        let receipt = block_on(storage.save("IMG_0001", &annotations)).unwrap();
        assert_eq!(receipt.count, 2);
        let loaded = block_on(storage.load("IMG_0001")).unwrap();
        assert_eq!(loaded, annotations);
    }

    #[test]
    fn test_csv_side_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("IMG_0001", &sample())).unwrap();

        let csv = fs::read_to_string(storage.csv_path("IMG_0001")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "class,x,y,timestamp");
        assert!(lines[1].starts_with("eggs,12.5,40,"));
        assert!(lines[2].starts_with("honey,2,1,"));
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("doc2", &sample())).unwrap();
        block_on(storage.save("doc1", &[])).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1".to_string(), "doc2".to_string()]);

        assert!(block_on(storage.delete("doc2")).unwrap());
        assert!(!storage.csv_path("doc2").exists());
        assert!(!block_on(storage.delete("doc2")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1".to_string()]);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("frames/a:b*c", &sample())).unwrap();
        assert!(storage.json_path("frames/a:b*c").starts_with(dir.path()));
        let loaded = block_on(storage.load("frames/a:b*c")).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_reads_files_without_timestamps() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(
            storage.json_path("legacy"),
            r#"[{"type": "circle", "x": 1, "y": 2, "radius": 20, "class": "pollen"}]"#,
        )
        .unwrap();
        let loaded = block_on(storage.load("legacy")).unwrap();
        assert_eq!(loaded[0].class_id(), &ClassId::new("pollen"));
    }

    #[test]
    fn test_write_export() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("IMG_0001", &sample())).unwrap();

        let export = block_on(export_dataset(&storage, &ClassRegistry::default())).unwrap();
        let path = storage.write_export(&export).unwrap();
        assert!(path.starts_with(storage.exports_dir()));

        let written: DatasetExport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.dataset_info.total_annotations, 2);
        // The exports directory is not mistaken for an image
        assert_eq!(block_on(storage.list()).unwrap(), vec!["IMG_0001".to_string()]);
    }

    #[test]
    fn test_csv_quotes_fields() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
