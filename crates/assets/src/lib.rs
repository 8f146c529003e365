//! Texture cache: deduplicates and owns renderable resources keyed by
//! source path.
//!
//! Each path is decoded at most once; the decoded pixels live for the
//! cache's whole lifetime (grow-only, no eviction). A failed load is logged
//! and reported as "no resource" so callers degrade to placeholder
//! rendering; it is never fatal.

use playstage_common::TextureHandle;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from texture decoding. Internal to the cache; the public `load`
/// surface absorbs them into `None`.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded texture owned by the cache.
#[derive(Debug, Clone)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, row-major.
    pub rgba: Vec<u8>,
}

/// Path-keyed owning texture cache.
///
/// Handles are copyable and stay valid for the cache's lifetime; nothing
/// outside the cache ever holds a reference into the pixel data except
/// while uploading.
#[derive(Debug, Default)]
pub struct TextureCache {
    by_path: BTreeMap<PathBuf, TextureHandle>,
    textures: BTreeMap<TextureHandle, Texture>,
    next_handle: u64,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a texture from `path`, decoding it on first use.
    ///
    /// Repeated loads of the same path return the original handle without
    /// touching the filesystem. On failure the error is logged and `None`
    /// is returned; the caller renders a placeholder instead.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Option<TextureHandle> {
        let path = path.as_ref();
        if let Some(handle) = self.by_path.get(path) {
            return Some(*handle);
        }
        match self.decode(path) {
            Ok(texture) => {
                let handle = texture.handle;
                self.by_path.insert(path.to_path_buf(), handle);
                self.textures.insert(handle, texture);
                tracing::debug!(path = %path.display(), handle = handle.0, "texture loaded");
                Some(handle)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "texture load failed");
                None
            }
        }
    }

    /// Register raw RGBA8 pixels under a synthetic key. Used for
    /// procedurally generated textures and tests.
    pub fn insert_rgba(&mut self, width: u32, height: u32, rgba: Vec<u8>) -> TextureHandle {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        let handle = self.fresh_handle();
        self.textures.insert(
            handle,
            Texture {
                handle,
                width,
                height,
                rgba,
            },
        );
        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(&handle)
    }

    /// All cached textures in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.values()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn decode(&mut self, path: &Path) -> Result<Texture, AssetError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Texture {
            handle: self.fresh_handle(),
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    fn fresh_handle(&mut self) -> TextureHandle {
        self.next_handle += 1;
        TextureHandle(self.next_handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn load_decodes_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "sprite.png", 2, 3);

        let mut cache = TextureCache::new();
        let a = cache.load(&path).unwrap();
        let b = cache.load(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);

        let tex = cache.get(a).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(tex.rgba.len(), 2 * 3 * 4);
    }

    #[test]
    fn missing_file_is_absorbed() {
        let mut cache = TextureCache::new();
        assert!(cache.load("no/such/file.png").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = write_test_png(dir.path(), "a.png", 1, 1);
        let p2 = write_test_png(dir.path(), "b.png", 1, 1);

        let mut cache = TextureCache::new();
        let a = cache.load(&p1).unwrap();
        let b = cache.load(&p2).unwrap();
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn insert_rgba_round_trip() {
        let mut cache = TextureCache::new();
        let handle = cache.insert_rgba(2, 2, vec![255; 16]);
        let tex = cache.get(handle).unwrap();
        assert_eq!((tex.width, tex.height), (2, 2));
        assert!(cache.get(TextureHandle(999)).is_none());
    }
}
