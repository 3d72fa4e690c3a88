//! Workspace initialization: create the three input directories.

use std::fs;

use super::PipelineError;
use crate::context::Context;

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    for dir in [
        ctx.distortion_dir(),
        ctx.tca_dir(),
        ctx.vignetting_dir(),
    ] {
        if dir.is_file() {
            return Err(PipelineError::NotADirectory(dir));
        }
        if !dir.is_dir() {
            fs::create_dir(&dir)?;
        }
    }

    println!(
        "The following directory structure has been created in the local directory\n\n\
         1. distortion - Put RAW files created for distortion in here\n\
         2. tca        - Put chromatic aberration RAW files in here\n\
         3. vignetting - Put RAW files to calculate vignetting in here\n"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn creates_all_three_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(tmp.path().to_path_buf());
        run(&ctx).unwrap();
        assert!(ctx.distortion_dir().is_dir());
        assert!(ctx.tca_dir().is_dir());
        assert!(ctx.vignetting_dir().is_dir());

        // rerunning over existing directories is fine
        run(&ctx).unwrap();
    }

    #[test]
    fn aborts_when_a_file_occupies_the_name() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("tca"), b"not a directory").unwrap();
        let ctx = Context::new(tmp.path().to_path_buf());
        let err = run(&ctx).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::NotADirectory(ref p) if *p == PathBuf::from(tmp.path().join("tca"))
        ));
    }
}
