//! Vignetting workflow: convert, flatten to grayscale, analyze the
//! radial falloff, and leave one `.vig` artifact plus diagnostics per
//! image.
//!
//! Shots at the top level of `vignetting/` were taken at infinity;
//! numeric subdirectory names give the subject distance in metres.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{ensure_workflow_dir, report_results, tool_step, PipelineError};
use crate::context::Context;
use crate::dispatch::{Dispatcher, JobError, JobStatus};
use crate::files::{raw_files_in, stem};
use crate::sidecar::{write_sidecar, VIGNETTING_SIDECAR};
use crate::tools::{convert_raw, convert_to_grayscale, render_plot, ConvertProfile};
use lenscal_core::format_float;
use lenscal_profile::{write_vignetting_record, VignettingRecord};
use lenscal_vignetting::{
    bin_medians, bins_table, fit_falloff, plot_script, radial_samples, samples_table,
};

struct Job {
    input: PathBuf,
    distance: f64,
    ppm: PathBuf,
    pgm: PathBuf,
    preview: PathBuf,
    record: PathBuf,
    all_points: PathBuf,
    bins: PathBuf,
    script: PathBuf,
    pdf: PathBuf,
}

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    let dir = ctx.vignetting_dir();
    ensure_workflow_dir(&dir, "vignetting")?;

    let export = ctx.vignetting_export_dir();
    fs::create_dir_all(&export)?;
    let sidecar = export.join("vignetting.xmp");
    write_sidecar(&sidecar, VIGNETTING_SIDECAR)?;

    let jobs = discover_jobs(&dir, &export)?;
    let dispatcher = Dispatcher::new(ctx.workers)?;
    let results = dispatcher.run(&jobs, |job| process(job, &sidecar));
    report_results(
        "vignetting",
        jobs.iter().map(|j| j.input.clone()),
        &results,
    );
    Ok(())
}

/// Pair every input file with its shooting distance. All artifacts
/// land flat in the export directory, keyed by the input file name, so
/// workers never contend for a path.
fn discover_jobs(dir: &Path, export: &Path) -> Result<Vec<Job>, PipelineError> {
    let mut inputs: Vec<(PathBuf, f64)> = raw_files_in(dir)?
        .into_iter()
        .map(|file| (file, f64::INFINITY))
        .collect();

    for entry in fs::read_dir(dir)?.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_dir() || path == export {
            continue;
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        let Some(distance) = name.as_deref().and_then(|n| n.parse::<f64>().ok()) else {
            debug!("ignoring non-distance directory {}", path.display());
            continue;
        };
        for file in raw_files_in(&path)? {
            inputs.push((file, distance));
        }
    }
    inputs.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(inputs
        .into_iter()
        .map(|(input, distance)| {
            let stem = stem(&input);
            Job {
                ppm: export.join(format!("{stem}.ppm")),
                pgm: export.join(format!("{stem}.pgm")),
                preview: export.join(format!("{stem}.jpg")),
                record: export.join(format!("{stem}.vig")),
                all_points: export.join(format!("{stem}.all_points.dat")),
                bins: export.join(format!("{stem}.bins.dat")),
                script: export.join(format!("{stem}.gp")),
                pdf: export.join(format!("{stem}.pdf")),
                input,
                distance,
            }
        })
        .collect())
}

fn process(job: &Job, sidecar: &Path) -> Result<JobStatus, JobError> {
    info!("Processing {} ...", job.input.display());

    let mut worked = false;

    if !job.ppm.is_file() {
        if tool_step(convert_raw(
            ConvertProfile::Vignetting,
            &job.input,
            sidecar,
            &job.ppm,
        ))?
        .is_none()
        {
            return Ok(JobStatus::ToolMissing);
        }
        worked = true;
    }

    if !job.pgm.is_file() {
        if tool_step(convert_to_grayscale(&job.ppm, &job.pgm))?.is_none() {
            return Ok(JobStatus::ToolMissing);
        }
        worked = true;
    }

    if !job.record.is_file() {
        let sample = lenscal_meta::read_sample(&job.input);
        analyze(job, &sample)?;
        worked = true;
    }

    if !job.preview.is_file() {
        // low-resolution JPEG for the submission bundle
        if tool_step(convert_raw(
            ConvertProfile::Vignetting,
            &job.input,
            sidecar,
            &job.preview,
        ))?
        .is_none()
        {
            return Ok(JobStatus::ToolMissing);
        }
        worked = true;
    }

    Ok(if worked {
        JobStatus::Done
    } else {
        JobStatus::Skipped
    })
}

fn analyze(job: &Job, sample: &lenscal_core::ExifSample) -> Result<(), JobError> {
    info!("Generating vignetting data for {} ...", job.pgm.display());

    let bytes = fs::read(&job.pgm)?;
    let raster = lenscal_vignetting::decode(&bytes)?;

    let samples = radial_samples(&raster);
    fs::write(&job.all_points, samples_table(&samples))?;

    let bins = bin_medians(&samples);
    fs::write(&job.bins, bins_table(&bins))?;

    let points: Vec<(f64, f64)> = bins.iter().map(|b| (b.radius, b.intensity)).collect();
    let fit = fit_falloff(&points)?;

    let record = VignettingRecord {
        lens_model: sample.lens_model.clone(),
        focal_length: format_float(sample.focal_length),
        aperture: format_float(sample.aperture),
        distance: format_float(job.distance),
        entry: fit.entry(),
    };
    write_vignetting_record(&job.record, &record)?;

    let script = plot_script(
        &fit,
        &sample.lens_model,
        sample.focal_length,
        sample.aperture,
        job.distance,
        &job.input,
        &job.all_points,
        &job.bins,
        &job.pdf,
    );
    fs::write(&job.script, script)?;
    tool_step(render_plot(&job.script))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_distances_from_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let export = dir.join("exported");
        fs::create_dir(&export).unwrap();
        fs::write(dir.join("far.ORF"), b"").unwrap();
        fs::create_dir(dir.join("10")).unwrap();
        fs::write(dir.join("10").join("near.ORF"), b"").unwrap();
        fs::create_dir(dir.join("0.45")).unwrap();
        fs::write(dir.join("0.45").join("close.ORF"), b"").unwrap();
        fs::create_dir(dir.join("notes")).unwrap();
        fs::write(dir.join("notes").join("skip.ORF"), b"").unwrap();
        fs::write(export.join("leftover.ORF"), b"").unwrap();

        let mut jobs = discover_jobs(dir, &export).unwrap();
        jobs.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let found: Vec<(String, f64)> = jobs
            .iter()
            .map(|j| (stem(&j.input), j.distance))
            .collect();
        assert_eq!(
            found,
            vec![
                ("close".to_string(), 0.45),
                ("near".to_string(), 10.0),
                ("far".to_string(), f64::INFINITY),
            ]
        );
    }

    #[test]
    fn artifacts_land_flat_in_the_export_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let export = dir.join("exported");
        fs::create_dir(&export).unwrap();
        fs::create_dir(dir.join("10")).unwrap();
        fs::write(dir.join("10").join("near.ORF"), b"").unwrap();

        let jobs = discover_jobs(dir, &export).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].record, export.join("near.vig"));
        assert_eq!(jobs[0].pgm, export.join("near.pgm"));
    }
}
