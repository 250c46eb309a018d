use crate::config::{CacheConfig, CoreConfig, DEFAULT_DIRECTORY_PERMISSIONS};
use crate::course::CourseId;
use crate::encoder::{PngQrEncoder, QrEncoder};
use crate::error::{CoreError, CoreResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Subdirectory of the cache root owned by the block.
pub const COMPONENT_DIR: &str = "block_qrcode";

const FILE_PREFIX: &str = "course-";
const FILE_SUFFIX: &str = ".png";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Generated,
}

/// Filesystem-backed QR image cache, one PNG per course.
///
/// Every lookup, creation and eviction goes through the deterministic path
/// returned by [`QrCacheManager::path_for`]; the file's presence is the entry.
pub struct QrCacheManager<E = PngQrEncoder> {
    root: PathBuf,
    dir_mode: u32,
    encoder: E,
}

impl QrCacheManager<PngQrEncoder> {
    pub fn with_default_encoder(root: PathBuf) -> Self {
        Self::new(root, PngQrEncoder::default())
    }

    /// Cache root, directory mode and encoder settings all come from `cfg`.
    pub fn from_core_config(cfg: &CoreConfig) -> CoreResult<Self> {
        Self::from_config(&cfg.cache, PngQrEncoder::from_config(&cfg.qr)?)
    }
}

impl<E: QrEncoder> QrCacheManager<E> {
    pub fn new(root: PathBuf, encoder: E) -> Self {
        Self {
            root,
            dir_mode: DEFAULT_DIRECTORY_PERMISSIONS,
            encoder,
        }
    }

    pub fn from_config(cfg: &CacheConfig, encoder: E) -> CoreResult<Self> {
        let root = cfg.require_root()?.to_path_buf();
        Ok(Self::new(root, encoder).with_directory_permissions(cfg.directory_permissions))
    }

    pub fn with_directory_permissions(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(COMPONENT_DIR)
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn path_for(&self, course_id: CourseId) -> PathBuf {
        self.cache_dir()
            .join(format!("{FILE_PREFIX}{course_id}{FILE_SUFFIX}"))
    }

    pub fn contains(&self, course_id: CourseId) -> bool {
        self.path_for(course_id).is_file()
    }

    /// Returns the path of a PNG encoding `url`, generating it if absent.
    pub fn ensure_image(&self, course_id: CourseId, url: &str) -> CoreResult<PathBuf> {
        self.ensure_image_status(course_id, url).map(|(path, _)| path)
    }

    pub fn ensure_image_status(
        &self,
        course_id: CourseId,
        url: &str,
    ) -> CoreResult<(PathBuf, CacheStatus)> {
        let path = self.path_for(course_id);
        if path.is_file() {
            tracing::debug!(course_id = %course_id, path = %path.display(), "qr cache hit");
            return Ok((path, CacheStatus::Hit));
        }

        let dir = self.cache_dir();
        self.ensure_dir(&dir)?;

        let png = self.encoder.encode(url)?;
        self.write_atomic(&dir, course_id, &path, &png)?;

        tracing::info!(
            course_id = %course_id,
            path = %path.display(),
            bytes = png.len(),
            "generated qr code"
        );
        Ok((path, CacheStatus::Generated))
    }

    pub fn read_image(&self, course_id: CourseId) -> CoreResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(course_id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the cached image of a course. `Ok(false)` when nothing was cached.
    pub fn invalidate(&self, course_id: CourseId) -> CoreResult<bool> {
        let path = self.path_for(course_id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(course_id = %course_id, path = %path.display(), "evicted qr code");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(course_id = %course_id, "no cached qr code to evict");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every cached course image. Returns how many were removed.
    pub fn purge(&self) -> CoreResult<usize> {
        let dir = self.cache_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_course_image(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(removed, dir = %dir.display(), "purged qr cache");
        Ok(removed)
    }

    fn ensure_dir(&self, dir: &Path) -> CoreResult<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.dir_mode);
        }
        builder
            .create(dir)
            .map_err(|source| CoreError::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })
    }

    fn write_atomic(
        &self,
        dir: &Path,
        course_id: CourseId,
        path: &Path,
        png: &[u8],
    ) -> CoreResult<()> {
        let tmp = dir.join(format!(
            ".{FILE_PREFIX}{course_id}.{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = fs::write(&tmp, png).and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn is_course_image(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            name.strip_prefix(FILE_PREFIX)
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
                .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
        })
        .unwrap_or(false)
}
