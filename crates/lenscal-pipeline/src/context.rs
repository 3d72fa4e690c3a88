use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Everything a workflow needs to know about its environment: the
/// working directory layout and the worker-pool size. Passed
/// explicitly so nothing reaches for process-global state.
#[derive(Debug, Clone)]
pub struct Context {
    root: PathBuf,
    pub workers: usize,
    pub complex_tca: bool,
}

impl Context {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            workers: default_worker_count(),
            complex_tca: false,
        }
    }

    pub fn with_complex_tca(mut self, complex_tca: bool) -> Self {
        self.complex_tca = complex_tca;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn distortion_dir(&self) -> PathBuf {
        self.root.join("distortion")
    }

    pub fn tca_dir(&self) -> PathBuf {
        self.root.join("tca")
    }

    pub fn vignetting_dir(&self) -> PathBuf {
        self.root.join("vignetting")
    }

    pub fn distortion_export_dir(&self) -> PathBuf {
        self.distortion_dir().join("exported")
    }

    pub fn tca_export_dir(&self) -> PathBuf {
        self.tca_dir().join("exported")
    }

    pub fn vignetting_export_dir(&self) -> PathBuf {
        self.vignetting_dir().join("exported")
    }

    pub fn lenses_config_path(&self) -> PathBuf {
        self.root.join("lenses.conf")
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join("lensfun.xml")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join("lenscal_calibration.tar.gz")
    }
}

/// Half the logical cores, at least one. Workers block on external
/// converters that are themselves multi-threaded.
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (cpus / 2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_is_at_least_one() {
        assert!(default_worker_count() >= 1);
    }

    #[test]
    fn directory_layout_hangs_off_root() {
        let ctx = Context::new(PathBuf::from("/work"));
        assert_eq!(ctx.distortion_dir(), Path::new("/work/distortion"));
        assert_eq!(
            ctx.vignetting_export_dir(),
            Path::new("/work/vignetting/exported")
        );
        assert_eq!(ctx.lenses_config_path(), Path::new("/work/lenses.conf"));
    }
}
