use crate::error::AppError;
use crate::service::rows::RowCollection;
use crate::types::CredentialRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::fs;
use tracing::{debug, info};

/// What `JsonStore::load` found on disk.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(RowCollection),
    /// The file did not exist; an empty array was written in its place.
    Created,
}

/// Reads and writes the accounts file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with every row, in order.
    ///
    /// The write is not atomic: a crash mid-write leaves a truncated file.
    pub fn save(&self, rows: &RowCollection) -> Result<(), AppError> {
        let body = to_pretty_json(rows.all())?;
        fs::write(&self.path, body)?;
        info!(path = %self.path.display(), count = rows.len(), "accounts file written");
        Ok(())
    }

    pub fn load(&self) -> Result<LoadOutcome, AppError> {
        match read_records(&self.path) {
            Ok(records) => {
                debug!(path = %self.path.display(), count = records.len(), "accounts file loaded");
                Ok(LoadOutcome::Loaded(records.into()))
            }
            Err(AppError::FileNotFound(_)) => {
                fs::write(&self.path, to_pretty_json::<CredentialRecord>(&[])?)?;
                info!(path = %self.path.display(), "accounts file not found; created an empty one");
                Ok(LoadOutcome::Created)
            }
            Err(e) => Err(e),
        }
    }

    /// Read a user-selected file with the same schema as the accounts file.
    pub fn read_import(path: &Path) -> Result<Vec<CredentialRecord>, AppError> {
        read_records(path)
    }
}

fn read_records(path: &Path) -> Result<Vec<CredentialRecord>, AppError> {
    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::FileNotFound(path.to_path_buf()),
        _ => AppError::Io(e),
    })?;
    serde_json::from_str(&contents).map_err(|e| AppError::file_format(path, e))
}

fn to_pretty_json<T: Serialize>(records: &[T]) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SEQ: AtomicUsize = AtomicUsize::new(0);

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "email-codes-json-{}-{}-{name}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        path
    }

    fn sample() -> RowCollection {
        vec![
            CredentialRecord::new("a@x.com", "p1", false),
            CredentialRecord::new("b@x.com", "密码", true),
            CredentialRecord::new("a@x.com", "p3", false),
        ]
        .into()
    }

    #[test]
    fn save_then_load_round_trips_in_order() {
        let store = JsonStore::new(temp_path("account.json"));
        let rows = sample();
        store.save(&rows).unwrap();

        match store.load().unwrap() {
            LoadOutcome::Loaded(loaded) => assert_eq!(loaded, rows),
            LoadOutcome::Created => panic!("file should exist"),
        }
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn save_uses_four_space_indent_and_plain_utf8() {
        let store = JsonStore::new(temp_path("account.json"));
        store.save(&sample()).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"email\": \"a@x.com\""));
        assert!(text.contains("\"code\": \"密码\""));
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn empty_collection_saves_as_empty_array() {
        let store = JsonStore::new(temp_path("account.json"));
        store.save(&RowCollection::new()).unwrap();

        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn missing_file_is_created_empty() {
        let store = JsonStore::new(temp_path("account.json"));
        assert!(matches!(store.load().unwrap(), LoadOutcome::Created));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([]));
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn corrupted_file_is_a_format_error() {
        let path = temp_path("account.json");
        fs::write(&path, "this is not json").unwrap();

        let err = JsonStore::new(&path).load().unwrap_err();
        assert!(matches!(err, AppError::FileFormat { .. }));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn import_of_missing_file_is_not_found() {
        let err = JsonStore::read_import(&temp_path("nowhere.json")).unwrap_err();
        assert!(matches!(err, AppError::FileNotFound(_)));
    }

    #[test]
    fn import_then_save_is_append_only() {
        let import_path = temp_path("import.json");
        let imported = vec![
            CredentialRecord::new("c@x.com", "p4", true),
            CredentialRecord::new("a@x.com", "p5", false),
        ];
        fs::write(&import_path, serde_json::to_vec(&imported).unwrap()).unwrap();

        let mut rows = sample();
        rows.extend(JsonStore::read_import(&import_path).unwrap());
        let store = JsonStore::new(temp_path("account.json"));
        store.save(&rows).unwrap();

        let LoadOutcome::Loaded(loaded) = store.load().unwrap() else {
            panic!("file should exist");
        };
        let mut expected = sample().all().to_vec();
        expected.extend(imported);
        assert_eq!(loaded.all(), expected.as_slice());

        let _ = fs::remove_file(&import_path);
        let _ = fs::remove_file(store.path());
    }
}
