//! TCA workflow: convert each RAW to a PPM the detector can read, run
//! the detector, and leave one `.tca` artifact per image.

use std::fs;
use std::path::PathBuf;

use log::info;

use super::{ensure_workflow_dir, report_results, tool_step, PipelineError};
use crate::context::Context;
use crate::dispatch::{Dispatcher, JobError, JobStatus};
use crate::files::{raw_files_in, stem};
use crate::sidecar::{write_sidecar, TCA_SIDECAR};
use crate::tools::{convert_raw, detect_tca, render_plot, ConvertProfile};
use lenscal_core::format_float;
use lenscal_profile::{write_tca_record, TcaRecord};

struct Job {
    input: PathBuf,
    ppm: PathBuf,
    record: PathBuf,
    script: PathBuf,
    pdf: PathBuf,
}

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    let dir = ctx.tca_dir();
    ensure_workflow_dir(&dir, "tca")?;

    let export = ctx.tca_export_dir();
    fs::create_dir_all(&export)?;
    let sidecar = export.join("tca.xmp");
    write_sidecar(&sidecar, TCA_SIDECAR)?;

    let jobs: Vec<Job> = raw_files_in(&dir)?
        .into_iter()
        .map(|input| {
            let stem = stem(&input);
            Job {
                ppm: export.join(format!("{stem}.ppm")),
                record: export.join(format!("{stem}.tca")),
                script: export.join(format!("{stem}.gp")),
                pdf: export.join(format!("{stem}.pdf")),
                input,
            }
        })
        .collect();

    let complex_tca = ctx.complex_tca;
    let dispatcher = Dispatcher::new(ctx.workers)?;
    let results = dispatcher.run(&jobs, |job| process(job, &sidecar, complex_tca));
    report_results("tca", jobs.iter().map(|j| j.input.clone()), &results);
    Ok(())
}

fn process(
    job: &Job,
    sidecar: &std::path::Path,
    complex_tca: bool,
) -> Result<JobStatus, JobError> {
    info!("Processing {} ...", job.input.display());

    if !job.ppm.is_file()
        && tool_step(convert_raw(
            ConvertProfile::TcaPpm,
            &job.input,
            sidecar,
            &job.ppm,
        ))?
        .is_none()
    {
        return Ok(JobStatus::ToolMissing);
    }

    if job.record.is_file() {
        return Ok(JobStatus::Skipped);
    }

    let sample = lenscal_meta::read_sample(&job.input);
    info!("Running TCA corrections for {} ...", job.ppm.display());
    let Some(output) = tool_step(detect_tca(&job.ppm, complex_tca))? else {
        return Ok(JobStatus::ToolMissing);
    };

    let entry = lenscal_tca::parse_output(&output, complex_tca)?;
    let record = TcaRecord {
        lens_model: sample.lens_model.clone(),
        focal_length: format_float(sample.focal_length),
        raw: output.trim().to_string(),
        entry,
    };
    write_tca_record(&job.record, &record)?;

    if complex_tca {
        let script = lenscal_tca::plot_script(
            &entry,
            &sample.lens_model,
            sample.focal_length,
            sample.aperture,
            &job.input,
            &job.pdf,
        );
        fs::write(&job.script, script).map_err(JobError::Io)?;
        tool_step(render_plot(&job.script))?;
    }

    Ok(JobStatus::Done)
}
