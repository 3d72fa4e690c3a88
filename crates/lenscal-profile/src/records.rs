//! Per-image measurement artifacts.
//!
//! Each analysis job leaves one sectioned key/value file next to its
//! converted image: `.tca` for chromatic aberration, `.vig` for
//! vignetting. The section name is the lens model so the aggregation
//! step can key records without re-reading image metadata.

use std::path::Path;

use ini::Ini;

use lenscal_core::{format_float, TcaEntry, VignettingEntry};

#[derive(thiserror::Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ini(#[from] ini::Error),
    #[error("missing key '{key}' in section '{section}'")]
    MissingKey { section: String, key: &'static str },
    #[error("invalid value for '{key}' in section '{section}'")]
    BadValue { section: String, key: &'static str },
}

/// One `.tca` artifact: coefficients for one image, plus the raw
/// detector line for later inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct TcaRecord {
    pub lens_model: String,
    pub focal_length: String,
    pub raw: String,
    pub entry: TcaEntry,
}

/// One `.vig` artifact: the fitted falloff for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct VignettingRecord {
    pub lens_model: String,
    pub focal_length: String,
    pub aperture: String,
    pub distance: String,
    pub entry: VignettingEntry,
}

pub fn write_tca_record(path: &Path, record: &TcaRecord) -> Result<(), RecordError> {
    let mut ini = Ini::new();
    ini.with_section(Some(record.lens_model.clone()))
        .set("focal_length", record.focal_length.clone())
        .set(
            "complex_tca",
            if record.entry.complex_tca { "True" } else { "False" },
        )
        .set("tca", record.raw.clone())
        .set("br", format_float(record.entry.br))
        .set("vr", format_float(record.entry.vr))
        .set("bb", format_float(record.entry.bb))
        .set("vb", format_float(record.entry.vb));
    ini.write_to_file(path)?;
    Ok(())
}

pub fn read_tca_records(path: &Path) -> Result<Vec<TcaRecord>, RecordError> {
    let ini = Ini::load_from_file(path)?;
    let mut records = Vec::new();
    for (section, props) in ini.iter() {
        let Some(section) = section else {
            continue;
        };
        let get = |key| required(section, props.get(key), key);
        records.push(TcaRecord {
            lens_model: section.to_string(),
            focal_length: get("focal_length")?.to_string(),
            raw: props.get("tca").unwrap_or_default().to_string(),
            entry: TcaEntry {
                complex_tca: get("complex_tca")?.eq_ignore_ascii_case("true"),
                br: parse_float(section, get("br")?, "br")?,
                vr: parse_float(section, get("vr")?, "vr")?,
                bb: parse_float(section, get("bb")?, "bb")?,
                vb: parse_float(section, get("vb")?, "vb")?,
            },
        });
    }
    Ok(records)
}

pub fn write_vignetting_record(path: &Path, record: &VignettingRecord) -> Result<(), RecordError> {
    let mut ini = Ini::new();
    ini.with_section(Some(record.lens_model.clone()))
        .set("focal_length", record.focal_length.clone())
        .set("aperture", record.aperture.clone())
        .set("distance", record.distance.clone())
        .set("a", format!("{:.7}", record.entry.a))
        .set("k1", format!("{:.7}", record.entry.k1))
        .set("k2", format!("{:.7}", record.entry.k2))
        .set("k3", format!("{:.7}", record.entry.k3));
    ini.write_to_file(path)?;
    Ok(())
}

pub fn read_vignetting_records(path: &Path) -> Result<Vec<VignettingRecord>, RecordError> {
    let ini = Ini::load_from_file(path)?;
    let mut records = Vec::new();
    for (section, props) in ini.iter() {
        let Some(section) = section else {
            continue;
        };
        let get = |key| required(section, props.get(key), key);
        records.push(VignettingRecord {
            lens_model: section.to_string(),
            focal_length: get("focal_length")?.to_string(),
            aperture: get("aperture")?.to_string(),
            distance: get("distance")?.to_string(),
            entry: VignettingEntry {
                a: parse_float(section, get("a")?, "a")?,
                k1: parse_float(section, get("k1")?, "k1")?,
                k2: parse_float(section, get("k2")?, "k2")?,
                k3: parse_float(section, get("k3")?, "k3")?,
            },
        });
    }
    Ok(records)
}

fn required<'a>(
    section: &str,
    value: Option<&'a str>,
    key: &'static str,
) -> Result<&'a str, RecordError> {
    value.ok_or_else(|| RecordError::MissingKey {
        section: section.to_string(),
        key,
    })
}

fn parse_float(section: &str, value: &str, key: &'static str) -> Result<f64, RecordError> {
    value.trim().parse().map_err(|_| RecordError::BadValue {
        section: section.to_string(),
        key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tca_record_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.tca");
        let record = TcaRecord {
            lens_model: "FE 16-35mm F2.8 GM".to_string(),
            focal_length: "16.0".to_string(),
            raw: "-r 0.0:-0.002:0.0:0.001 -b 0.0:0.003:0.0:-0.001".to_string(),
            entry: TcaEntry {
                complex_tca: true,
                br: -0.002,
                vr: 0.001,
                bb: 0.003,
                vb: -0.001,
            },
        };
        write_tca_record(&path, &record).unwrap();
        let records = read_tca_records(&path).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn vignetting_record_round_trips_with_inf_distance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0002.vig");
        let record = VignettingRecord {
            lens_model: "Standard".to_string(),
            focal_length: "50.0".to_string(),
            aperture: "8.0".to_string(),
            distance: "inf".to_string(),
            entry: VignettingEntry {
                a: 29912.51,
                k1: -0.31,
                k2: 0.012,
                k3: -0.004,
            },
        };
        write_vignetting_record(&path, &record).unwrap();
        let records = read_vignetting_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].distance, "inf");
        assert!((records[0].entry.a - 29912.51).abs() < 1e-4);
        assert!((records[0].entry.k1 + 0.31).abs() < 1e-7);
    }

    #[test]
    fn missing_coefficient_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.vig");
        std::fs::write(&path, "[Standard]\nfocal_length=50.0\naperture=8.0\n").unwrap();
        assert!(matches!(
            read_vignetting_records(&path),
            Err(RecordError::MissingKey { key: "distance", .. })
        ));
    }
}
