// Page store module
// Maps titles to files and serializes concurrent writes per title

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::page::Page;
use crate::error::StoreError;
use crate::logger;

/// File extension for stored pages
const PAGE_EXTENSION: &str = "txt";

/// Suffix of the sibling file a save writes before renaming
const TEMP_SUFFIX: &str = ".tmp";

/// Permission bits for page files (owner read/write)
#[cfg(unix)]
const PAGE_FILE_MODE: u32 = 0o600;

/// Filesystem-backed page store
pub struct PageStore {
    dir: PathBuf,
    /// Per-title write locks, created on demand
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PageStore {
    /// Open the store, creating the directory (and parents) if needed.
    ///
    /// Temporary files left by saves that never finished are removed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        remove_stale_temp_files(&dir)?;
        Ok(Self {
            dir,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the page `title`
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{title}.{PAGE_EXTENSION}"))
    }

    fn temp_path_for(&self, title: &str) -> PathBuf {
        self.dir.join(format!(".{title}.{PAGE_EXTENSION}{TEMP_SUFFIX}"))
    }

    /// Read the page `title`.
    ///
    /// Every read failure is reported as [`StoreError::NotFound`]; callers
    /// treat it as "no existing page".
    pub async fn load(&self, title: &str, prefix: &str) -> Result<Page, StoreError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(Page::new(prefix, title, body)),
            Err(source) => {
                if source.kind() != io::ErrorKind::NotFound {
                    logger::log_warning(&format!(
                        "Reading {} failed, treating page as missing: {source}",
                        path.display()
                    ));
                } else {
                    logger::log_debug(&format!("No page file at {}", path.display()));
                }
                Err(StoreError::NotFound {
                    title: title.to_string(),
                    source,
                })
            }
        }
    }

    /// Write the full body of `page`, replacing any previous content
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let lock = self.write_lock(&page.title);
        let result = {
            let _guard = lock.lock().await;
            self.write_replace(page).await
        };
        drop(lock);
        self.release_write_lock(&page.title);

        result.map_err(|source| StoreError::Write {
            title: page.title.clone(),
            source,
        })
    }

    /// Write to a temporary sibling file, then rename it over the page file
    async fn write_replace(&self, page: &Page) -> io::Result<()> {
        let path = self.path_for(&page.title);
        let temp_path = self.temp_path_for(&page.title);

        if let Err(e) = write_private(&temp_path, &page.body).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        logger::log_debug(&format!(
            "Saved {} ({} bytes)",
            path.display(),
            page.body.len()
        ));
        Ok(())
    }

    fn write_lock(&self, title: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(title.to_string()).or_default())
    }

    /// Drop the lock entry once no writer holds or waits on it
    fn release_write_lock(&self, title: &str) {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(title)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(title);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.write_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn is_temp_name(name: &str) -> bool {
    name.strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(TEMP_SUFFIX))
        .and_then(|rest| rest.strip_suffix(PAGE_EXTENSION))
        .is_some_and(|rest| rest.ends_with('.'))
}

fn remove_stale_temp_files(dir: &Path) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_temp_name) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => logger::log_warning(&format!(
                "Removed unfinished save {}",
                entry.path().display()
            )),
            Err(e) => logger::log_warning(&format!(
                "Could not remove {}: {e}",
                entry.path().display()
            )),
        }
    }
    Ok(())
}

async fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PAGE_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    file.sync_all().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, PageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::open(dir.path().join("pages")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("pages");
        let store = PageStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.dir(), nested.as_path());

        // Idempotent
        assert!(PageStore::open(&nested).is_ok());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_dir, store) = open_temp();
        let page = Page::new("", "test", b"Hello".to_vec());
        store.save(&page).await.unwrap();

        let loaded = store.load("test", "").await.unwrap();
        assert_eq!(loaded, page);
        assert_eq!(
            std::fs::read(store.path_for("test")).unwrap(),
            b"Hello".to_vec()
        );
    }

    #[tokio::test]
    async fn test_binary_body_round_trip() {
        let (_dir, store) = open_temp();
        let body = vec![0u8, 159, 146, 150, b'\n', 255];
        store
            .save(&Page::new("", "bin", body.clone()))
            .await
            .unwrap();
        assert_eq!(store.load("bin", "").await.unwrap().body, body);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (_dir, store) = open_temp();
        store
            .save(&Page::new("", "note", b"a much longer first version".to_vec()))
            .await
            .unwrap();
        store
            .save(&Page::new("", "note", b"second".to_vec()))
            .await
            .unwrap();

        assert_eq!(store.load("note", "").await.unwrap().body, b"second".to_vec());
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (_dir, store) = open_temp();
        let err = store.load("missing", "/wiki").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref title, .. } if title == "missing"));
    }

    #[tokio::test]
    async fn test_load_unreadable_is_not_found() {
        let (_dir, store) = open_temp();
        std::fs::create_dir(store.path_for("odd")).unwrap();
        let err = store.load("odd", "").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref title, .. } if title == "odd"));
    }

    #[test]
    fn test_open_removes_unfinished_saves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".draft.txt.tmp"), b"partial").unwrap();
        std::fs::write(dir.path().join("draft.txt"), b"complete").unwrap();
        std::fs::write(dir.path().join("notes.tmp"), b"not ours").unwrap();

        let store = PageStore::open(dir.path()).unwrap();
        let mut names: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["draft.txt".to_string(), "notes.tmp".to_string()]);
    }

    #[tokio::test]
    async fn test_load_carries_prefix() {
        let (_dir, store) = open_temp();
        store
            .save(&Page::new("/wiki", "home", b"x".to_vec()))
            .await
            .unwrap();
        let page = store.load("home", "/other").await.unwrap();
        assert_eq!(page.prefix, "/other");
        assert_eq!(page.title, "home");
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let (_dir, store) = open_temp();
        store
            .save(&Page::new("", "clean", b"body".to_vec()))
            .await
            .unwrap();
        let names: Vec<_> = std::fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["clean.txt".to_string()]);
        assert_eq!(store.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn test_save_into_removed_dir_fails() {
        let (_dir, store) = open_temp();
        std::fs::remove_dir_all(store.dir()).unwrap();
        let err = store
            .save(&Page::new("", "lost", b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(err.to_string().contains("lost"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_page_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = open_temp();
        store
            .save(&Page::new("", "private", b"x".to_vec()))
            .await
            .unwrap();
        let mode = std::fs::metadata(store.path_for("private"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_concurrent_saves_same_title() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let body = format!("version {i}").repeat(64).into_bytes();
                store.save(&Page::new("", "race", body)).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // Whichever write finished last, the file holds one complete version.
        let body = String::from_utf8(store.load("race", "").await.unwrap().body).unwrap();
        let first = body.split("version ").nth(1).unwrap();
        let expected = format!("version {first}").repeat(64);
        assert_eq!(body, expected);
        assert_eq!(store.tracked_locks(), 0);
    }
}
