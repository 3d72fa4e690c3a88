//! Distortion workflow: render 16-bit TIFFs for the operator's visual
//! distortion tooling, and generate the configuration template on the
//! first run.
//!
//! The distortion coefficients themselves are authored by a human;
//! this workflow only prepares the material and the file to put them
//! in.

use std::fs;
use std::path::PathBuf;

use log::info;

use super::{ensure_workflow_dir, report_results, tool_step, PipelineError};
use crate::context::Context;
use crate::dispatch::{Dispatcher, JobStatus};
use crate::files::{raw_files_in, stem};
use crate::sidecar::{write_sidecar, DISTORTION_SIDECAR};
use crate::tools::{convert_raw, ConvertProfile};
use lenscal_core::ExifSample;
use lenscal_profile::{group_by_lens, write_template};

struct Job {
    input: PathBuf,
    output: PathBuf,
}

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    let dir = ctx.distortion_dir();
    ensure_workflow_dir(&dir, "distortion")?;

    let export = ctx.distortion_export_dir();
    fs::create_dir_all(&export)?;
    let sidecar = export.join("distortion.xmp");
    write_sidecar(&sidecar, DISTORTION_SIDECAR)?;

    info!("Running file conversions for distortion corrections ...");

    let files = raw_files_in(&dir)?;
    let samples: Vec<(PathBuf, ExifSample)> = files
        .into_iter()
        .map(|file| {
            let sample = lenscal_meta::read_sample(&file);
            (file, sample)
        })
        .collect();

    let jobs: Vec<Job> = samples
        .iter()
        .map(|(input, sample)| Job {
            input: input.clone(),
            output: export.join(tiff_name(input, sample)),
        })
        .collect();

    let dispatcher = Dispatcher::new(ctx.workers)?;
    let results = dispatcher.run(&jobs, |job| {
        if job.output.is_file() {
            return Ok(JobStatus::Skipped);
        }
        info!(
            "Converting {} to {} ...",
            job.input.display(),
            job.output.display()
        );
        let converted = tool_step(convert_raw(
            ConvertProfile::DistortionTiff,
            &job.input,
            &sidecar,
            &job.output,
        ))?;
        Ok(match converted {
            Some(()) => JobStatus::Done,
            None => JobStatus::ToolMissing,
        })
    });
    report_results(
        "distortion",
        jobs.iter().map(|j| j.input.clone()),
        &results,
    );

    let config_path = ctx.lenses_config_path();
    if !config_path.is_file() {
        let groups = group_by_lens(samples.into_iter().map(|(_, sample)| sample));
        write_template(&config_path, &groups)?;
        print_template_guidance();
    }

    Ok(())
}

/// Exported TIFF name, carrying the focal length when it is known so
/// the operator can tell the shots apart in the visual tool.
fn tiff_name(input: &std::path::Path, sample: &ExifSample) -> String {
    let stem = stem(input);
    if sample.focal_length > 1.0 {
        format!("{stem}_{}mm.tif", sample.focal_length as i64)
    } else {
        format!("{stem}.tif")
    }
}

fn print_template_guidance() {
    println!("A template has been created for distortion corrections as lenses.conf.");
    println!("Please fill this file with proper information. The most important");
    println!("values are:");
    println!();
    println!("maker:        is the manufacturer of the lens, e.g. 'FE 16-35mm F2.8 GM'");
    println!("mount:        is the name of the mount system, e.g. 'Sony E'");
    println!("cropfactor:   is the crop factor of the camera as a float, e.g. '1.0' for");
    println!("              full frame");
    println!("aspect_ratio: is the aspect_ratio, e.g. '3:2'");
    println!("type:         is the type of the lens, e.g. 'normal' for rectilinear");
    println!("              lenses. Other possible values are: stereographic, equisolid,");
    println!("              stereographic, panoramic or fisheye.");
    println!();
    println!("You can find details for distortion calculations here:");
    println!();
    println!("https://pixls.us/articles/create-lens-calibration-data-for-lensfun/");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(focal: f64) -> ExifSample {
        ExifSample {
            lens_model: "Standard".to_string(),
            focal_length: focal,
            aperture: 8.0,
            aspect_ratio: None,
            crop_factor: None,
            lens_maker: "[unknown]".to_string(),
            mount: None,
        }
    }

    #[test]
    fn tiff_name_carries_focal_length_when_known() {
        let input = std::path::Path::new("distortion/PC294201.ORF");
        assert_eq!(tiff_name(input, &sample(14.0)), "PC294201_14mm.tif");
        assert_eq!(tiff_name(input, &sample(0.0)), "PC294201.tif");
        assert_eq!(tiff_name(input, &sample(1.0)), "PC294201.tif");
    }

    // No converter is installed in the test environment; a rerun over
    // existing artifacts must succeed without wanting one.
    #[test]
    fn rerun_with_existing_artifacts_leaves_them_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::new(tmp.path().to_path_buf());
        fs::create_dir(ctx.distortion_dir()).unwrap();
        fs::write(ctx.distortion_dir().join("IMG_1.ORF"), b"not a real raw").unwrap();
        fs::create_dir_all(ctx.distortion_export_dir()).unwrap();
        let artifact = ctx.distortion_export_dir().join("IMG_1.tif");
        fs::write(&artifact, b"converted earlier").unwrap();

        run(&ctx).unwrap();

        assert_eq!(fs::read(&artifact).unwrap(), b"converted earlier");
        // first run over this directory also leaves the template behind
        let config = fs::read_to_string(ctx.lenses_config_path()).unwrap();
        assert!(config.contains("[Standard]"));
        assert!(config.contains("type=normal"));
    }
}
