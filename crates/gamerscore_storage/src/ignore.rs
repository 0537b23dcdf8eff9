//! Append-only ignore list.

use gamerscore_core::NormalizedKey;
use gamerscore_error::{GamerscoreResult, StorageError, StorageErrorKind};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Mirror {
    keys: HashSet<NormalizedKey>,
    raw: Vec<String>,
}

impl Mirror {
    fn insert(&mut self, raw: &str) -> bool {
        let key = NormalizedKey::new(raw);
        if key.is_empty() || !self.keys.insert(key) {
            return false;
        }
        self.raw.push(raw.trim().to_string());
        true
    }
}

/// Tags permanently excluded from lookup.
///
/// The file is newline-delimited, one tag per line in the casing it was first
/// added with, and is only ever appended to. Membership checks use the
/// normalized form and are served from an in-memory mirror. Removing a tag is
/// an operator action on the file, never something the service does.
///
/// # Example
///
/// ```rust,no_run
/// use gamerscore_storage::IgnoreRegistry;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = IgnoreRegistry::open("checked_gamertags.txt").await?;
/// registry.add("Player1").await?;
/// assert!(registry.contains("  player1 "));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IgnoreRegistry {
    path: Option<PathBuf>,
    mirror: RwLock<Mirror>,
    // Serializes appends so the file and the mirror change together.
    writer: Mutex<()>,
}

impl IgnoreRegistry {
    /// Open (or lazily create) the ignore list at `path`.
    ///
    /// A missing file is an empty registry. Blank lines and repeated tags are
    /// tolerated on read.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> GamerscoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut mirror = Mirror::default();

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                for line in content.lines() {
                    mirror.insert(line);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No ignore list found, starting empty");
            }
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        }

        tracing::info!(count = mirror.raw.len(), "Loaded ignore list");
        Ok(Self {
            path: Some(path),
            mirror: RwLock::new(mirror),
            writer: Mutex::new(()),
        })
    }

    /// A registry that lives only in memory.
    ///
    /// Used when the ignore file cannot be opened; additions last for the
    /// process lifetime only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            mirror: RwLock::new(Mirror::default()),
            writer: Mutex::new(()),
        }
    }

    /// Location of the backing file, if durable.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `tag` (in any casing) is ignored.
    pub fn contains(&self, tag: &str) -> bool {
        self.mirror.read().keys.contains(&NormalizedKey::new(tag))
    }

    /// Add a tag to the ignore list.
    ///
    /// Returns `true` when the tag was newly added and `false` when it was
    /// already present (or blank). The tag is appended to the file before it
    /// becomes visible to [`IgnoreRegistry::contains`].
    ///
    /// # Errors
    ///
    /// Returns an error if the tag contains a line break or the append fails;
    /// the in-memory mirror is unchanged in that case.
    #[tracing::instrument(skip(self))]
    pub async fn add(&self, tag: &str) -> GamerscoreResult<bool> {
        let raw = tag.trim();
        if raw.contains(['\n', '\r']) {
            return Err(StorageError::new(StorageErrorKind::Serialization(format!(
                "tag contains a line break: {:?}",
                raw
            )))
            .into());
        }

        let _writer = self.writer.lock().await;
        if raw.is_empty() || self.contains(raw) {
            return Ok(false);
        }

        if let Some(path) = &self.path {
            append_line(path, raw).await?;
        }

        self.mirror.write().insert(raw);
        tracing::debug!("Added tag to ignore list");
        Ok(true)
    }

    /// Ignored tags in insertion order, as originally supplied.
    pub fn entries(&self) -> Vec<String> {
        self.mirror.read().raw.clone()
    }

    /// Number of ignored tags.
    pub fn len(&self) -> usize {
        self.mirror.read().raw.len()
    }

    /// Whether no tag is ignored.
    pub fn is_empty(&self) -> bool {
        self.mirror.read().raw.is_empty()
    }
}

async fn append_line(path: &Path, line: &str) -> GamerscoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                parent.display(),
                e
            )))
        })?;
    }

    let write_err = |e: std::io::Error| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    };

    let mut file = tokio::fs::OpenOptions::new()
        .read(true)
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(write_err)?;

    // A hand-edited file may end without a line break.
    let len = file.metadata().await.map_err(write_err)?.len();
    let mut record = String::with_capacity(line.len() + 2);
    if len > 0 {
        let mut last = [0u8; 1];
        file.seek(std::io::SeekFrom::End(-1))
            .await
            .map_err(write_err)?;
        file.read_exact(&mut last).await.map_err(write_err)?;
        if last[0] != b'\n' {
            record.push('\n');
        }
    }
    record.push_str(line);
    record.push('\n');

    file.write_all(record.as_bytes())
        .await
        .map_err(write_err)?;
    file.sync_data().await.map_err(write_err)?;

    Ok(())
}
