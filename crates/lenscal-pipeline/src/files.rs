use std::path::{Path, PathBuf};

/// File extensions accepted as calibration input, uppercase.
///
/// RAW formats plus the rendered formats some operators shoot straight
/// to.
pub const RAW_EXTENSIONS: &[&str] = &[
    "3FR", "ARI", "ARW", "BAY", "CRW", "CR2", "CAP", "DCS", "DCR", "DNG", "DRF", "EIP", "ERF",
    "FFF", "IIQ", "K25", "KDC", "MEF", "MOS", "MRW", "NEF", "NRW", "OBM", "ORF", "PEF", "PTX",
    "PXN", "R3D", "RAF", "RAW", "RWL", "RW2", "RWZ", "SR2", "SRF", "SRW", "X3F", "JPG", "JPEG",
    "TIF", "TIFF",
];

pub fn is_raw_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| RAW_EXTENSIONS.contains(&ext.to_ascii_uppercase().as_str()))
        .unwrap_or(false)
}

/// The calibration inputs directly inside `dir`, sorted by name.
/// Subdirectories are not descended into; workflows that key them
/// (vignetting distances) walk them explicitly.
pub fn raw_files_in(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_raw_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// File stem for naming derived artifacts.
pub fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_raw_extensions_case_insensitively() {
        assert!(is_raw_file(Path::new("PC294201.ORF")));
        assert!(is_raw_file(Path::new("img_0001.arw")));
        assert!(is_raw_file(Path::new("shot.Cr2")));
        assert!(!is_raw_file(Path::new("notes.txt")));
        assert!(!is_raw_file(Path::new("image.ppm")));
        assert!(!is_raw_file(Path::new("noextension")));
    }

    #[test]
    fn lists_only_top_level_raw_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ORF"), b"").unwrap();
        std::fs::write(dir.path().join("a.ORF"), b"").unwrap();
        std::fs::write(dir.path().join("skip.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("10")).unwrap();
        std::fs::write(dir.path().join("10").join("c.ORF"), b"").unwrap();

        let files = raw_files_in(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| stem(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
