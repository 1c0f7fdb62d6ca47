//! Recipe image storage for RecipeBox.
//!
//! Images are written under a single directory with UUID file names and
//! served back from a public URL prefix:
//! ```text
//! {base_path}/ab12cd34-5678-90ab-cdef-123456789012.png
//!   -> {public_prefix}/ab12cd34-5678-90ab-cdef-123456789012.png
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{RecipeBoxError, Result};

/// Accepted image extensions (lower case).
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Image storage service.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    /// Directory holding the images.
    base_path: PathBuf,
    /// URL prefix without trailing slash.
    public_prefix: String,
    /// Maximum accepted size in bytes.
    max_size: u64,
}

impl ImageStorage {
    /// Create a new ImageStorage.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
        max_size: u64,
    ) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_path,
            public_prefix,
            max_size,
        })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the public URL prefix.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Get the maximum accepted size in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Lower-cased extension of `filename` if it is an accepted image type.
    pub fn allowed_extension(filename: &str) -> Option<String> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())?
            .to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
    }

    /// MIME type for a stored image URL or file name.
    pub fn content_type(name: &str) -> String {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Reject a declared MIME type that contradicts the file extension.
    ///
    /// A missing or generic `application/octet-stream` declaration passes.
    pub fn check_declared_type(original_name: &str, declared: Option<&str>) -> Result<()> {
        let Some(declared) = declared else {
            return Ok(());
        };
        let declared = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let generic = mime_guess::mime::APPLICATION_OCTET_STREAM;
        if declared.is_empty() || declared == generic.essence_str() {
            return Ok(());
        }

        let expected = Self::content_type(original_name);
        if declared != expected {
            return Err(RecipeBoxError::Validation(format!(
                "declared type {declared} does not match {expected}"
            )));
        }
        Ok(())
    }

    /// Save an uploaded image under a fresh name.
    ///
    /// `declared_type` is the client's Content-Type for the upload, if any.
    /// Returns the public URL of the stored file.
    pub fn save(
        &self,
        content: &[u8],
        original_name: &str,
        declared_type: Option<&str>,
    ) -> Result<String> {
        let ext = Self::allowed_extension(original_name).ok_or_else(|| {
            RecipeBoxError::Validation(format!(
                "unsupported image type, allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;
        Self::check_declared_type(original_name, declared_type)?;

        if content.is_empty() {
            return Err(RecipeBoxError::Validation("image is empty".to_string()));
        }
        if content.len() as u64 > self.max_size {
            return Err(RecipeBoxError::Validation(format!(
                "image exceeds maximum size of {} bytes",
                self.max_size
            )));
        }

        let stored_name = format!("{}.{ext}", Uuid::new_v4());
        fs::write(self.base_path.join(&stored_name), content)
            .map_err(|e| RecipeBoxError::Storage(format!("failed to write image: {e}")))?;

        Ok(format!("{}/{stored_name}", self.public_prefix))
    }

    /// Delete the image behind a public URL.
    ///
    /// Returns `false` if the file was already gone or the URL does not
    /// point into this storage.
    pub fn delete(&self, url: &str) -> Result<bool> {
        let Some(path) = self.path_for_url(url) else {
            return Ok(false);
        };

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RecipeBoxError::Storage(format!(
                "failed to delete image: {e}"
            ))),
        }
    }

    /// Check if the image behind a public URL exists.
    pub fn exists(&self, url: &str) -> bool {
        self.path_for_url(url).is_some_and(|p| p.exists())
    }

    /// Map a public URL to its file, refusing anything but a plain file name.
    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')?;
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        Some(self.base_path.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ImageStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ImageStorage::new(temp_dir.path().join("uploads"), "/static/uploads/", 1024)
            .unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_new_creates_directory() {
        let (_temp, storage) = setup();
        assert!(storage.base_path().exists());
        assert_eq!(storage.public_prefix(), "/static/uploads");
        assert_eq!(storage.max_size(), 1024);
    }

    #[test]
    fn test_allowed_extension() {
        assert_eq!(ImageStorage::allowed_extension("a.jpg").as_deref(), Some("jpg"));
        assert_eq!(ImageStorage::allowed_extension("a.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(ImageStorage::allowed_extension("a.Png").as_deref(), Some("png"));
        assert_eq!(ImageStorage::allowed_extension("a.webp").as_deref(), Some("webp"));
        assert!(ImageStorage::allowed_extension("a.gif").is_none());
        assert!(ImageStorage::allowed_extension("a.php").is_none());
        assert!(ImageStorage::allowed_extension("noext").is_none());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(ImageStorage::content_type("/static/uploads/x.png"), "image/png");
        assert_eq!(ImageStorage::content_type("x.jpg"), "image/jpeg");
        assert_eq!(ImageStorage::content_type("x.webp"), "image/webp");
    }

    #[test]
    fn test_check_declared_type() {
        assert!(ImageStorage::check_declared_type("a.png", None).is_ok());
        assert!(ImageStorage::check_declared_type("a.png", Some("image/png")).is_ok());
        assert!(ImageStorage::check_declared_type("a.JPG", Some("IMAGE/JPEG")).is_ok());
        assert!(ImageStorage::check_declared_type("a.webp", Some("image/webp; q=1")).is_ok());
        assert!(ImageStorage::check_declared_type("a.png", Some("application/octet-stream")).is_ok());

        assert!(matches!(
            ImageStorage::check_declared_type("a.png", Some("image/jpeg")),
            Err(RecipeBoxError::Validation(_))
        ));
        assert!(matches!(
            ImageStorage::check_declared_type("a.jpg", Some("text/html")),
            Err(RecipeBoxError::Validation(_))
        ));
    }

    #[test]
    fn test_save_rejects_mismatched_type() {
        let (_temp, storage) = setup();
        let result = storage.save(b"<html>", "page.png", Some("text/html"));
        assert!(matches!(result, Err(RecipeBoxError::Validation(_))));
        assert_eq!(fs::read_dir(storage.base_path()).unwrap().count(), 0);
    }

    #[test]
    fn test_save_and_delete() {
        let (_temp, storage) = setup();

        let url = storage.save(b"\x89PNG data", "photo.PNG", None).unwrap();
        assert!(url.starts_with("/static/uploads/"));
        assert!(url.ends_with(".png"));
        assert!(storage.exists(&url));

        assert!(storage.delete(&url).unwrap());
        assert!(!storage.exists(&url));
        // Already gone
        assert!(!storage.delete(&url).unwrap());
    }

    #[test]
    fn test_save_unique_names() {
        let (_temp, storage) = setup();
        let a = storage.save(b"one", "a.jpg", None).unwrap();
        let b = storage.save(b"two", "a.jpg", None).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_save_rejects_bad_extension() {
        let (_temp, storage) = setup();
        let result = storage.save(b"<?php", "shell.php", None);
        assert!(matches!(result, Err(RecipeBoxError::Validation(_))));
    }

    #[test]
    fn test_save_rejects_oversized_and_empty() {
        let (_temp, storage) = setup();
        let big = vec![0u8; 1025];
        assert!(matches!(
            storage.save(&big, "big.png", None),
            Err(RecipeBoxError::Validation(_))
        ));
        assert!(matches!(
            storage.save(b"", "empty.png", None),
            Err(RecipeBoxError::Validation(_))
        ));
        // Exactly at the limit is fine
        assert!(storage.save(&vec![0u8; 1024], "max.png", None).is_ok());
    }

    #[test]
    fn test_delete_ignores_foreign_urls() {
        let (temp, storage) = setup();
        let outside = temp.path().join("secret.png");
        fs::write(&outside, b"keep").unwrap();

        assert!(!storage.delete("/static/uploads/../secret.png").unwrap());
        assert!(!storage.delete("https://example.com/x.png").unwrap());
        assert!(!storage.delete("/static/uploads/").unwrap());
        assert!(outside.exists());
    }
}
