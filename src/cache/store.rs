//! On-disk page cache keyed by target identifier
//!
//! One file per target. Writes land in a uniquely named temp file and are
//! renamed into place, so an entry is either complete or absent.

use crate::error::{ProbeError, ProbeResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

const ENTRY_EXT: &str = "html";
const TEMP_EXT: &str = "tmp";
const MAX_PLAIN_NAME: usize = 100;

/// Aggregate numbers for `cache stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: u64,
    pub bytes: u64,
    /// Temp files left behind by interrupted writes
    pub stray_temp: u64,
}

/// Directory-backed page cache
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    /// Open (and create if needed) a cache rooted at `root`
    pub async fn open(root: impl Into<PathBuf>) -> ProbeResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ProbeError::io(format!("creating cache dir {}", root.display()), e))?;
        debug!("Page cache at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a complete entry exists for `id`
    pub async fn has(&self, id: &str) -> bool {
        fs::metadata(self.entry_path(id))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Read the entry for `id`. Only meaningful after `has` returned true.
    pub async fn read(&self, id: &str) -> ProbeResult<String> {
        let path = self.entry_path(id);
        let bytes = fs::read(&path).await.map_err(|e| ProbeError::CacheRead {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        String::from_utf8(bytes).map_err(|e| ProbeError::CacheRead {
            id: id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Persist `content` for `id`, replacing any previous entry atomically
    pub async fn write(&self, id: &str, content: &str) -> ProbeResult<()> {
        let final_path = self.entry_path(id);
        let temp_path = self
            .root
            .join(format!(".{}.{}", Uuid::new_v4().simple(), TEMP_EXT));

        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &final_path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path).await;
            return Err(ProbeError::CacheWrite {
                id: id.to_string(),
                source: e,
            });
        }

        debug!("Cached {} ({} bytes)", id, content.len());
        Ok(())
    }

    /// Count entries, their size, and leftover temp files
    pub async fn stats(&self) -> ProbeResult<CacheStats> {
        let mut stats = CacheStats::default();
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ProbeError::io("reading cache directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProbeError::io("reading cache entry", e))?
        {
            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(ENTRY_EXT) => {
                    stats.entries += 1;
                    if let Ok(meta) = entry.metadata().await {
                        stats.bytes += meta.len();
                    }
                }
                Some(TEMP_EXT) => stats.stray_temp += 1,
                _ => {}
            }
        }

        Ok(stats)
    }

    /// Remove all entries and temp files. Returns the number of files removed.
    pub async fn clear(&self) -> ProbeResult<u64> {
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| ProbeError::io("reading cache directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProbeError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == ENTRY_EXT || ext == TEMP_EXT)
            {
                fs::remove_file(&path).await.map_err(|e| {
                    ProbeError::io(format!("removing cache file {}", path.display()), e)
                })?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    fn entry_path(&self, id: &str) -> PathBuf {
        self.root.join(entry_file_name(id))
    }
}

/// Map an identifier to a file name.
///
/// Plain identifiers are used as-is. Anything else is sanitized and suffixed
/// with a hash of the original; `~` never occurs in plain names, so the two
/// forms cannot collide.
fn entry_file_name(id: &str) -> String {
    let plain = !id.is_empty()
        && id.len() <= MAX_PLAIN_NAME
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if plain {
        return format!("{}.{}", id, ENTRY_EXT);
    }

    let sanitized: String = id
        .chars()
        .take(60)
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let digest = Sha256::digest(id.as_bytes());
    format!("{}~{}.{}", sanitized, hex::encode(&digest[..8]), ENTRY_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_cache() -> (PageCache, TempDir) {
        let temp = TempDir::new().unwrap();
        let cache = PageCache::open(temp.path().join("pages")).await.unwrap();
        (cache, temp)
    }

    #[tokio::test]
    async fn write_then_read() {
        let (cache, _temp) = test_cache().await;
        assert!(!cache.has("journal-a").await);

        cache.write("journal-a", "<html>ISSN 0024-9319</html>").await.unwrap();

        assert!(cache.has("journal-a").await);
        assert_eq!(
            cache.read("journal-a").await.unwrap(),
            "<html>ISSN 0024-9319</html>"
        );
    }

    #[tokio::test]
    async fn overwrite_replaces_entry() {
        let (cache, _temp) = test_cache().await;
        cache.write("j", "first").await.unwrap();
        cache.write("j", "second").await.unwrap();
        assert_eq!(cache.read("j").await.unwrap(), "second");
        assert_eq!(cache.stats().await.unwrap().entries, 1);
    }

    #[tokio::test]
    async fn stray_temp_file_is_not_an_entry() {
        let (cache, _temp) = test_cache().await;
        std::fs::write(cache.root().join(".deadbeef.tmp"), "<html>half").unwrap();

        assert!(!cache.has("deadbeef").await);
        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.stray_temp, 1);
    }

    #[tokio::test]
    async fn identifiers_with_separators_are_distinct() {
        let (cache, _temp) = test_cache().await;
        cache.write("journals:a/b", "one").await.unwrap();
        cache.write("journals:a:b", "two").await.unwrap();

        assert_eq!(cache.read("journals:a/b").await.unwrap(), "one");
        assert_eq!(cache.read("journals:a:b").await.unwrap(), "two");
        assert!(!cache.has("journals_a_b").await);
    }

    #[tokio::test]
    async fn clear_removes_entries_and_temps() {
        let (cache, _temp) = test_cache().await;
        cache.write("a", "1").await.unwrap();
        cache.write("b", "22").await.unwrap();
        std::fs::write(cache.root().join(".x.tmp"), "").unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.bytes, 3);

        assert_eq!(cache.clear().await.unwrap(), 3);
        assert_eq!(cache.stats().await.unwrap(), CacheStats::default());
    }

    #[test]
    fn file_names() {
        assert_eq!(entry_file_name("ijhs"), "ijhs.html");
        assert!(entry_file_name("a:b").starts_with("a_b~"));
        assert!(entry_file_name(".hidden").contains('~'));
        assert!(entry_file_name("").starts_with('~'));
    }
}
