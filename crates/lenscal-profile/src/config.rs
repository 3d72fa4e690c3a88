//! The human-edited lens configuration file (`lenses.conf`).
//!
//! One section per lens model. The pipeline writes the file exactly
//! once, as a template derived from the distortion shots; after that
//! it is ground truth authored by the operator and only ever read.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use ini::Ini;
use log::warn;
use serde::{Deserialize, Serialize};

use lenscal_core::{format_float, format_focal, ExifSample};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ini(#[from] ini::Error),
}

/// Profile fields of one lens, verbatim from the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensProfile {
    pub maker: String,
    pub mount: String,
    pub crop_factor: String,
    pub aspect_ratio: String,
    pub lens_type: String,
}

impl Default for LensProfile {
    fn default() -> Self {
        Self {
            maker: String::new(),
            mount: String::new(),
            crop_factor: String::new(),
            aspect_ratio: String::new(),
            lens_type: "normal".to_string(),
        }
    }
}

/// One lens section: profile fields plus the hand-entered distortion
/// coefficients, keyed by focal length and kept verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LensConfig {
    pub profile: LensProfile,
    pub distortion: BTreeMap<String, String>,
}

/// Group samples by lens model, each group sorted by focal length.
pub fn group_by_lens(
    samples: impl IntoIterator<Item = ExifSample>,
) -> BTreeMap<String, Vec<ExifSample>> {
    let mut groups: BTreeMap<String, Vec<ExifSample>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry(sample.lens_model.clone())
            .or_default()
            .push(sample);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| {
            a.focal_length
                .partial_cmp(&b.focal_length)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    groups
}

/// Write the configuration template.
///
/// Profile fields come from the lowest-focal-length sample of each
/// group; every distinct focal length gets a zeroed distortion entry
/// for the operator to fill in.
pub fn write_template(
    path: &Path,
    groups: &BTreeMap<String, Vec<ExifSample>>,
) -> Result<(), ConfigError> {
    let mut ini = Ini::new();
    for (lens, samples) in groups {
        let Some(first) = samples.first() else {
            continue;
        };
        ini.with_section(Some(lens.clone()))
            .set("maker", first.lens_maker.clone())
            .set("mount", first.mount.clone().unwrap_or_default())
            .set(
                "cropfactor",
                first.crop_factor.map(format_float).unwrap_or_default(),
            )
            .set(
                "aspect_ratio",
                first.aspect_ratio.clone().unwrap_or_default(),
            )
            .set("type", "normal");

        let mut seen = BTreeSet::new();
        for sample in samples {
            let focal = format_focal(sample.focal_length);
            if seen.insert(focal.clone()) {
                ini.with_section(Some(lens.clone()))
                    .set(format!("distortion({focal}mm)"), "0.0, 0.0, 0.0");
            }
        }
    }
    ini.write_to_file(path)?;
    Ok(())
}

/// Read the configuration back, one [`LensConfig`] per section.
pub fn parse_config(path: &Path) -> Result<BTreeMap<String, LensConfig>, ConfigError> {
    let ini = Ini::load_from_file(path)?;
    let mut lenses = BTreeMap::new();

    for (section, props) in ini.iter() {
        let Some(name) = section else {
            continue;
        };
        let mut config = LensConfig::default();
        for (key, value) in props.iter() {
            if let Some(focal) = key
                .strip_prefix("distortion(")
                .and_then(|k| k.strip_suffix("mm)"))
            {
                config
                    .distortion
                    .insert(focal.to_string(), value.to_string());
            } else {
                match key {
                    "maker" => config.profile.maker = value.to_string(),
                    "mount" => config.profile.mount = value.to_string(),
                    "cropfactor" => config.profile.crop_factor = value.to_string(),
                    "aspect_ratio" => config.profile.aspect_ratio = value.to_string(),
                    "type" => config.profile.lens_type = value.to_string(),
                    _ => warn!("{}: unknown key '{key}' in [{name}]", path.display()),
                }
            }
        }
        lenses.insert(name.to_string(), config);
    }
    Ok(lenses)
}
