//! Content-addressed image files on local disk
//!
//! Layout: `{root}/{hash}.jpg`. Writes go through a temp file + rename, so a
//! reader never sees a half-written image. Saving a hash that is already on
//! disk only refreshes its mtime, which restarts the sweep's grace period.

use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use super::ProcessedImage;

#[derive(Clone)]
pub struct ImageStore {
    root: Arc<PathBuf>,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn path_for(&self, hash: &str) -> PathBuf {
        self.root.join(format!("{hash}.jpg"))
    }

    pub async fn save(&self, image: &ProcessedImage) -> io::Result<()> {
        let path = self.path_for(&image.hash);
        match tokio::fs::OpenOptions::new().append(true).open(&path).await {
            Ok(file) => {
                file.into_std().await.set_modified(SystemTime::now())?;
                return Ok(());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        let tmp = self
            .root
            .join(format!("{}.tmp-{}", image.hash, shared::util::snowflake_id()));
        tokio::fs::write(&tmp, &image.bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }

    pub async fn read(&self, hash: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(hash)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete image files whose hash is not in `live` and that were last
    /// modified more than `grace` ago, plus temp files left by failed
    /// writes. Returns the number of files removed.
    ///
    /// `live` is a snapshot; `still_live` is asked again right before a
    /// file goes, so a row committed during the sweep keeps its file.
    pub async fn sweep_orphans<F, Fut>(
        &self,
        live: &HashSet<String>,
        grace: Duration,
        still_live: F,
    ) -> io::Result<usize>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(self.root.as_path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            if name.contains(".tmp-") {
                if is_older_than(&path, grace).await? && remove(&path).await? {
                    removed += 1;
                }
                continue;
            }

            let Some(hash) = name.strip_suffix(".jpg") else {
                continue;
            };
            if live.contains(hash) || !is_older_than(&path, grace).await? {
                continue;
            }
            if still_live(hash.to_string()).await {
                continue;
            }
            // A re-upload may have touched the file since the first look
            if !is_older_than(&path, grace).await? {
                continue;
            }
            if remove(&path).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

async fn is_older_than(path: &Path, grace: Duration) -> io::Result<bool> {
    let modified = match tokio::fs::metadata(path).await {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let age = SystemTime::now().duration_since(modified).unwrap_or_default();
    Ok(age >= grace)
}

/// `false` if the file was already gone
async fn remove(path: &Path) -> io::Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
