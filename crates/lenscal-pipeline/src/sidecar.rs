//! Fixed darktable processing recipes.
//!
//! Each workflow exports its RAW files through a sidecar that pins the
//! processing pipeline to a known, neutral state: distortion keeps a
//! base curve for the visual tool, TCA and vignetting disable
//! everything that would bend the channel values being measured.

use std::io;
use std::path::Path;

pub const DISTORTION_SIDECAR: &str = include_str!("../sidecars/distortion.xmp");
pub const TCA_SIDECAR: &str = include_str!("../sidecars/tca.xmp");
pub const VIGNETTING_SIDECAR: &str = include_str!("../sidecars/vignetting.xmp");

/// Write a sidecar once; an existing file is left untouched so reruns
/// never invalidate the converter's skip-if-exists outputs.
pub fn write_sidecar(path: &Path, content: &str) -> io::Result<()> {
    if path.is_file() {
        return Ok(());
    }
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distortion.xmp");

        write_sidecar(&path, DISTORTION_SIDECAR).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, DISTORTION_SIDECAR);

        write_sidecar(&path, "something else").unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(second, DISTORTION_SIDECAR);
    }

    #[test]
    fn recipes_are_distinct_documents() {
        for recipe in [DISTORTION_SIDECAR, TCA_SIDECAR, VIGNETTING_SIDECAR] {
            assert!(recipe.starts_with("<?xml"));
            assert!(recipe.contains("darktable:history"));
        }
        assert_ne!(DISTORTION_SIDECAR, TCA_SIDECAR);
        assert_ne!(TCA_SIDECAR, VIGNETTING_SIDECAR);
    }
}
