//! Bundle the calibration results for submission.
//!
//! Collects the database, the per-image diagnostic PDFs and the
//! vignetting previews into one gzip-compressed tar archive with
//! neutral ownership in the headers.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use walkdir::WalkDir;

use super::PipelineError;
use crate::context::Context;

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    let database = ctx.database_path();
    if !database.is_file() {
        return Err(PipelineError::MissingDatabase);
    }

    let mut files = vec![database];
    files.extend(files_with_extension(&ctx.tca_export_dir(), "pdf"));
    files.extend(files_with_extension(&ctx.vignetting_export_dir(), "pdf"));
    files.extend(files_with_extension(&ctx.vignetting_export_dir(), "jpg"));

    let archive_path = ctx.archive_path();
    write_archive(&archive_path, ctx.root(), &files)?;

    info!("Created {}", archive_path.display());
    println!(
        "Created {}",
        archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    println!("Open a bug at https://github.com/lensfun/lensfun/issues/ with the data.");
    Ok(())
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect()
}

fn write_archive(archive: &Path, root: &Path, files: &[PathBuf]) -> Result<(), PipelineError> {
    let encoder = GzEncoder::new(File::create(archive)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for path in files {
        if !path.is_file() {
            continue;
        }
        let mut file = File::open(path)?;
        let metadata = file.metadata()?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("root")?;
        header.set_groupname("root")?;
        header.set_cksum();

        let name = path.strip_prefix(root).unwrap_or(path);
        builder.append_data(&mut header, name, &mut file)?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_the_database() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(tmp.path().to_path_buf());
        assert!(matches!(run(&ctx), Err(PipelineError::MissingDatabase)));
    }

    #[test]
    fn bundles_database_plots_and_previews() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(tmp.path().to_path_buf());
        std::fs::write(ctx.database_path(), "<lensdatabase>\n</lensdatabase>\n").unwrap();
        std::fs::create_dir_all(ctx.tca_export_dir()).unwrap();
        std::fs::create_dir_all(ctx.vignetting_export_dir()).unwrap();
        std::fs::write(ctx.tca_export_dir().join("a.pdf"), b"%PDF").unwrap();
        std::fs::write(ctx.vignetting_export_dir().join("b.pdf"), b"%PDF").unwrap();
        std::fs::write(ctx.vignetting_export_dir().join("b.jpg"), b"\xff\xd8").unwrap();
        std::fs::write(ctx.vignetting_export_dir().join("b.ppm"), b"P6").unwrap();

        run(&ctx).unwrap();

        let archive = File::open(ctx.archive_path()).unwrap();
        let mut reader = tar::Archive::new(flate2::read::GzDecoder::new(archive));
        let mut names = Vec::new();
        for entry in reader.entries().unwrap() {
            let entry = entry.unwrap();
            assert_eq!(entry.header().uid().unwrap(), 0);
            names.push(entry.path().unwrap().to_string_lossy().into_owned());
        }
        names.sort();
        assert_eq!(
            names,
            vec![
                "lensfun.xml",
                "tca/exported/a.pdf",
                "vignetting/exported/b.jpg",
                "vignetting/exported/b.pdf",
            ]
        );
    }
}
