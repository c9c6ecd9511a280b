//! Disk storage for blog images.
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tokio::fs;

/// Writes uploaded files under generated names in one flat directory, which
/// is also served read-only under `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    /// Store `data` and return the generated file name.
    pub async fn save(&self, original_name: Option<&str>, data: &[u8]) -> io::Result<String> {
        self.ensure_dir().await?;
        let name = generated_name(original_name);
        fs::write(self.dir.join(&name), data).await?;
        tracing::debug!(file = %name, bytes = data.len(), "upload stored");
        Ok(name)
    }

    /// Remove a previously stored file. Missing files are ignored.
    pub async fn remove(&self, name: &str) {
        match fs::remove_file(self.dir.join(name)).await {
            Ok(()) => tracing::debug!(file = %name, "upload removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(file = %name, error = %e, "failed to remove upload"),
        }
    }
}

/// `{unix millis}-{random below 1e9}{.ext}`, keeping the original extension
/// when it is plain alphanumeric.
fn generated_name(original_name: Option<&str>) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{millis}-{suffix}{ext}")
}
