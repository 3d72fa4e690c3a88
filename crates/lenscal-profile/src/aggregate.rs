//! Folding collected records into per-lens calibration trees.
//!
//! Pure merge policy: overwrite on key collision (warned, never
//! silent), records for unconfigured lenses reported and dropped.

use std::collections::BTreeMap;

use log::warn;
use serde::Serialize;

use crate::config::{LensConfig, LensProfile};
use crate::records::{TcaRecord, VignettingRecord};
use lenscal_core::{TcaEntry, VignettingEntry};

/// The full calibration tree of one lens, ready for emission.
#[derive(Debug, Clone, Serialize)]
pub struct LensCalibration {
    pub model: String,
    pub profile: LensProfile,
    /// Hand-entered coefficient strings, keyed by focal length.
    pub distortion: BTreeMap<String, String>,
    pub tca: BTreeMap<String, TcaEntry>,
    /// focal length -> aperture -> distance -> entry.
    pub vignetting: BTreeMap<String, BTreeMap<String, BTreeMap<String, VignettingEntry>>>,
}

/// Fold configuration and collected records into one tree per lens.
///
/// Later records win on duplicate keys, matching the collection order
/// (sorted by artifact file name).
pub fn fold(
    configs: BTreeMap<String, LensConfig>,
    tca_records: Vec<TcaRecord>,
    vignetting_records: Vec<VignettingRecord>,
) -> BTreeMap<String, LensCalibration> {
    let mut lenses: BTreeMap<String, LensCalibration> = configs
        .into_iter()
        .map(|(model, config)| {
            (
                model.clone(),
                LensCalibration {
                    model,
                    profile: config.profile,
                    distortion: config.distortion,
                    tca: BTreeMap::new(),
                    vignetting: BTreeMap::new(),
                },
            )
        })
        .collect();

    for record in tca_records {
        let Some(lens) = lenses.get_mut(&record.lens_model) else {
            warn!(
                "tca artifact references '{}', which is not in the lens configuration",
                record.lens_model
            );
            continue;
        };
        if lens
            .tca
            .insert(record.focal_length.clone(), record.entry)
            .is_some()
        {
            warn!(
                "duplicate tca measurement for '{}' at {}mm, keeping the later one",
                record.lens_model, record.focal_length
            );
        }
    }

    for record in vignetting_records {
        let Some(lens) = lenses.get_mut(&record.lens_model) else {
            warn!(
                "vignetting artifact references '{}', which is not in the lens configuration",
                record.lens_model
            );
            continue;
        };
        let slot = lens
            .vignetting
            .entry(record.focal_length.clone())
            .or_default()
            .entry(record.aperture.clone())
            .or_default();
        if slot.insert(record.distance.clone(), record.entry).is_some() {
            warn!(
                "duplicate vignetting measurement for '{}' at {}mm f/{} distance {}, keeping the later one",
                record.lens_model, record.focal_length, record.aperture, record.distance
            );
        }
    }

    lenses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BTreeMap<String, LensConfig> {
        let mut configs = BTreeMap::new();
        let mut lens = LensConfig::default();
        lens.profile.maker = "Olympus Zuiko Digital".to_string();
        lens.distortion
            .insert("14.0".to_string(), "0.0, 0.0, 0.0".to_string());
        configs.insert("Zoom".to_string(), lens);
        configs
    }

    fn tca(lens: &str, focal: &str, vr: f64) -> TcaRecord {
        TcaRecord {
            lens_model: lens.to_string(),
            focal_length: focal.to_string(),
            raw: String::new(),
            entry: TcaEntry {
                complex_tca: false,
                br: 0.0,
                vr,
                bb: 0.0,
                vb: 1.0,
            },
        }
    }

    fn vig(lens: &str, focal: &str, aperture: &str, distance: &str) -> VignettingRecord {
        VignettingRecord {
            lens_model: lens.to_string(),
            focal_length: focal.to_string(),
            aperture: aperture.to_string(),
            distance: distance.to_string(),
            entry: VignettingEntry {
                a: 30000.0,
                k1: -0.3,
                k2: 0.0,
                k3: 0.0,
            },
        }
    }

    #[test]
    fn later_duplicate_focal_length_wins() {
        let lenses = fold(
            config(),
            vec![tca("Zoom", "14.0", 1.0001), tca("Zoom", "14.0", 1.0099)],
            Vec::new(),
        );
        assert_eq!(lenses["Zoom"].tca.len(), 1);
        assert_eq!(lenses["Zoom"].tca["14.0"].vr, 1.0099);
    }

    #[test]
    fn unconfigured_lens_records_are_dropped() {
        let lenses = fold(
            config(),
            vec![tca("Unlisted", "14.0", 1.0)],
            vec![vig("Unlisted", "14.0", "8.0", "inf")],
        );
        assert_eq!(lenses.len(), 1);
        assert!(lenses["Zoom"].tca.is_empty());
        assert!(lenses["Zoom"].vignetting.is_empty());
    }

    #[test]
    fn vignetting_nests_by_focal_aperture_distance() {
        let lenses = fold(
            config(),
            Vec::new(),
            vec![
                vig("Zoom", "14.0", "4.0", "inf"),
                vig("Zoom", "14.0", "4.0", "10.0"),
                vig("Zoom", "14.0", "8.0", "inf"),
                vig("Zoom", "25.0", "4.0", "inf"),
            ],
        );
        let tree = &lenses["Zoom"].vignetting;
        assert_eq!(tree.len(), 2);
        assert_eq!(tree["14.0"].len(), 2);
        assert_eq!(tree["14.0"]["4.0"].len(), 2);
        assert!(tree["14.0"]["4.0"].contains_key("inf"));
    }
}
