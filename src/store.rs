//! The on-disk store for stack entries.
//!
//! Each stack is a directory under `<git-dir>/refs/stacked/`, holding one JSON file per diff,
//! named after the diff's ID. Files are written individually so that an interrupted command
//! never leaves more than one entry out of date.

use crate::{
    constants::STACK_REFS_DIR,
    errors::{StError, StResult},
    stack::{Stack, StackRef},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, trace};

/// The file extension of stored entries.
const REF_EXTENSION: &str = "json";

/// Reads and writes the JSON files backing each [Stack].
#[derive(Debug, Clone)]
pub struct StackStore {
    /// The directory containing one sub-directory per stack.
    root: PathBuf,
}

impl StackStore {
    /// Creates a [StackStore] for the repository whose git directory is `git_dir`.
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            root: git_dir.as_ref().join(STACK_REFS_DIR),
        }
    }

    /// Returns the directory holding the entries of the stack titled `title`.
    pub fn stack_dir(&self, title: &str) -> PathBuf {
        self.root.join(title)
    }

    /// Returns the path of an entry's file.
    pub fn ref_path(&self, title: &str, id: &str) -> PathBuf {
        self.stack_dir(title).join(format!("{id}.{REF_EXTENSION}"))
    }

    /// Returns `true` if a stack titled `title` has been created.
    pub fn exists(&self, title: &str) -> bool {
        self.stack_dir(title).is_dir()
    }

    /// Creates the directory for a new stack.
    pub fn create_stack(&self, title: &str) -> StResult<()> {
        let dir = self.stack_dir(title);
        fs::create_dir_all(&dir).map_err(|source| StError::StoreIo { path: dir, source })
    }

    /// Writes `stack_ref` to the stack's directory, creating the directory if needed. An existing
    /// file for the same ID is overwritten.
    pub fn add(&self, title: &str, stack_ref: &StackRef) -> StResult<()> {
        self.create_stack(title)?;

        let path = self.ref_path(title, &stack_ref.id);
        let json = serde_json::to_string(stack_ref)?;
        debug!(path = %path.display(), "writing stack entry");
        fs::write(&path, json).map_err(|source| StError::StoreIo { path, source })
    }

    /// Overwrites the stored copy of `stack_ref`.
    pub fn update(&self, title: &str, stack_ref: &StackRef) -> StResult<()> {
        self.add(title, stack_ref)
    }

    /// Deletes the stored copy of `stack_ref`.
    pub fn remove(&self, title: &str, stack_ref: &StackRef) -> StResult<()> {
        let path = self.ref_path(title, &stack_ref.id);
        debug!(path = %path.display(), "removing stack entry");
        fs::remove_file(&path).map_err(|source| StError::StoreIo { path, source })
    }

    /// Reads every entry of the stack titled `title`, in no particular order.
    ///
    /// A stack that was never created yields no entries.
    pub fn gather_all(&self, title: &str) -> StResult<Vec<StackRef>> {
        let dir = self.stack_dir(title);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StError::StoreIo { path: dir, source }),
        };

        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StError::StoreIo {
                path: dir.clone(),
                source,
            })?;
        paths.retain(|p| p.is_file() && p.extension().is_some_and(|ext| ext == REF_EXTENSION));
        paths.sort();

        paths
            .into_iter()
            .map(|path| -> StResult<StackRef> {
                trace!(path = %path.display(), "reading stack entry");
                let raw = fs::read_to_string(&path)
                    .map_err(|source| StError::StoreIo { path, source })?;
                Ok(serde_json::from_str(&raw)?)
            })
            .collect()
    }

    /// Loads and validates the stack titled `title`.
    pub fn load(&self, title: &str) -> StResult<Stack> {
        Stack::from_refs(title, self.gather_all(title)?)
    }
}

#[cfg(test)]
mod test {
    use super::StackStore;
    use crate::stack::StackRef;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn entry(id: &str, prev: &str, next: &str) -> StackRef {
        StackRef {
            prev: prev.to_string(),
            next: next.to_string(),
            mr_url: format!("https://gitlab.com/g/p/-/merge_requests/{}", id.len()),
            ..StackRef::new(id.to_string(), format!("jd-feature-{id}"), format!("Add {id}"))
        }
    }

    #[test]
    fn round_trips_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());
        let original = entry("0123abcd", "", "");

        store.add("feature", &original).unwrap();
        assert!(store.ref_path("feature", "0123abcd").is_file());

        let gathered = store.gather_all("feature").unwrap();
        assert_eq!(gathered, vec![original]);
    }

    #[test]
    fn missing_stack_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());

        assert!(!store.exists("feature"));
        assert!(store.gather_all("feature").unwrap().is_empty());
        assert!(store.load("feature").unwrap().is_empty());
    }

    #[test]
    fn update_overwrites_and_remove_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());
        let mut a = entry("a", "", "");
        store.add("feature", &a).unwrap();

        a.description = "Reworded".to_string();
        store.update("feature", &a).unwrap();
        assert_eq!(store.gather_all("feature").unwrap(), vec![a.clone()]);

        store.remove("feature", &a).unwrap();
        assert!(store.gather_all("feature").unwrap().is_empty());
        assert!(store.exists("feature"));
    }

    #[test]
    fn ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());
        store.add("feature", &entry("a", "", "")).unwrap();
        fs::write(store.stack_dir("feature").join("notes.txt"), "hello").unwrap();

        assert_eq!(store.gather_all("feature").unwrap().len(), 1);
    }

    #[test]
    fn loads_ordered_stack() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());
        store.add("feature", &entry("a", "", "b")).unwrap();
        store.add("feature", &entry("b", "a", "")).unwrap();

        let stack = store.load("feature").unwrap();
        let order = stack
            .ordered()
            .unwrap()
            .into_iter()
            .map(|r| r.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn writes_under_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = StackStore::new(dir.path());
        assert_eq!(
            store.ref_path("feature", "a"),
            dir.path().join("refs/stacked/feature/a.json")
        );
    }
}
