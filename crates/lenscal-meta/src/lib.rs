//! Per-image metadata resolution.
//!
//! Resolves lens identity and shooting parameters for one image into
//! an [`ExifSample`](lenscal_core::ExifSample). The resolution logic is
//! pure and operates over a [`TagSource`]; the production source
//! combines an in-process EXIF reader for the standard fields with
//! `exiftool` queries for manufacturer makernote fields and the
//! composite crop factor, which no in-process reader surfaces.
//!
//! Missing fields never abort a run: they default and warn, because
//! the remediation (tagging a legacy manual lens) is a human step.

mod exiftool;
mod resolver;
mod source;
mod tags;

pub use resolver::resolve;
pub use source::FileTagSource;
pub use tags::{MetaTag, TagSource};

use std::path::Path;

use lenscal_core::ExifSample;

/// Read and resolve the metadata of one image file.
pub fn read_sample(path: &Path) -> ExifSample {
    let source = FileTagSource::open(path);
    let crop_factor = exiftool::crop_factor(path);
    resolve(&source, crop_factor, path)
}
