//! Database generation: read the hand-edited configuration back,
//! collect every artifact, fold, and emit the XML.

use log::info;

use super::PipelineError;
use crate::context::Context;
use lenscal_profile::{
    collect_tca_records, collect_vignetting_records, fold, parse_config, write_database,
};

pub fn run(ctx: &Context) -> Result<(), PipelineError> {
    info!("Generating lensfun.xml");

    let config_path = ctx.lenses_config_path();
    if !config_path.is_file() {
        return Err(PipelineError::MissingConfig);
    }
    let configs = parse_config(&config_path)?;

    let tca_records = collect_tca_records(&ctx.tca_export_dir());
    let vignetting_records = collect_vignetting_records(&ctx.vignetting_export_dir());
    info!(
        "collected {} tca and {} vignetting measurements for {} configured lenses",
        tca_records.len(),
        vignetting_records.len(),
        configs.len()
    );

    let lenses = fold(configs, tca_records, vignetting_records);
    let output = ctx.database_path();
    write_database(&output, &lenses)?;
    info!("Wrote {}", output.display());
    Ok(())
}
