//! Destination file naming
//!
//! Incoming files never overwrite an existing file: the name gets a
//! counter (`photo.jpg` becomes `photo_1.jpg`, `photo_2.jpg`, ...).

use std::path::{Path, PathBuf};
use tokio::fs;

/// `path` with `_n` appended to the file stem
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };

    path.with_file_name(name)
}

/// First numbered variant of `path` that does not exist yet
pub async fn incremented_path(path: &Path) -> PathBuf {
    let mut n = 1;
    loop {
        let candidate = numbered_path(path, n);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_path() {
        assert_eq!(numbered_path(Path::new("/tmp/photo.jpg"), 1), PathBuf::from("/tmp/photo_1.jpg"));
        assert_eq!(numbered_path(Path::new("/tmp/archive.tar.gz"), 2), PathBuf::from("/tmp/archive.tar_2.gz"));
        assert_eq!(numbered_path(Path::new("/tmp/README"), 3), PathBuf::from("/tmp/README_3"));
        assert_eq!(numbered_path(Path::new("/tmp/.bashrc"), 1), PathBuf::from("/tmp/.bashrc_1"));
    }

    #[tokio::test]
    async fn test_incremented_path_skips_existing() {
        let dir = std::env::temp_dir().join("lanchat_test_incremented_path");
        let _ = fs::remove_dir_all(&dir).await;
        fs::create_dir_all(&dir).await.unwrap();

        let original = dir.join("notes.txt");
        fs::write(&original, b"a").await.unwrap();
        fs::write(dir.join("notes_1.txt"), b"b").await.unwrap();

        assert_eq!(incremented_path(&original).await, dir.join("notes_2.txt"));

        let _ = fs::remove_dir_all(dir).await;
    }
}
