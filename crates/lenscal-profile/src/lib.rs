//! Lens configuration, measurement artifacts and database emission.
//!
//! The working directory is the hand-off point between workflows: each
//! per-image job writes one small sectioned key/value artifact, and
//! this crate reads them all back, folds them into one calibration
//! tree per lens, and serializes the trees into the lens-database XML.
//!
//! Collection (I/O) and folding (merge policy) are deliberately
//! separate steps so the overwrite-on-collision rules are testable
//! without touching a filesystem.

mod aggregate;
mod collect;
mod config;
mod emit;
mod records;

pub use aggregate::{fold, LensCalibration};
pub use collect::{collect_tca_records, collect_vignetting_records};
pub use config::{group_by_lens, parse_config, write_template, ConfigError, LensConfig, LensProfile};
pub use emit::{render_database, write_database, EmitError};
pub use records::{
    read_tca_records, read_vignetting_records, write_tca_record, write_vignetting_record,
    RecordError, TcaRecord, VignettingRecord,
};
