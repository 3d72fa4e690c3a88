//! Serialization of calibration trees into the lens-database XML.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::aggregate::LensCalibration;
use lenscal_core::numeric_sorted;

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("distortion entry for '{lens}' at {focal}mm has {count} coefficients (expected 1 or 3)")]
    BadDistortion {
        lens: String,
        focal: String,
        count: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
}

/// Render the database document for all lenses.
pub fn render_database(lenses: &BTreeMap<String, LensCalibration>) -> Result<String, EmitError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

    writer.write_event(Event::Start(BytesStart::new("lensdatabase")))?;
    for lens in lenses.values() {
        write_lens(&mut writer, lens)?;
    }
    writer.write_event(Event::End(BytesEnd::new("lensdatabase")))?;

    let buf = writer.into_inner().into_inner();
    let mut text = String::from_utf8_lossy(&buf).into_owned();
    text.push('\n');
    Ok(text)
}

/// Render and write the database to `path`.
pub fn write_database(
    path: &Path,
    lenses: &BTreeMap<String, LensCalibration>,
) -> Result<(), EmitError> {
    let text = render_database(lenses)?;
    std::fs::write(path, text)?;
    Ok(())
}

fn write_lens<W: std::io::Write>(
    writer: &mut Writer<W>,
    lens: &LensCalibration,
) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new("lens")))?;

    text_element(writer, "maker", &lens.profile.maker)?;
    text_element(writer, "model", &lens.model)?;
    text_element(writer, "mount", &lens.profile.mount)?;
    text_element(writer, "cropfactor", &lens.profile.crop_factor)?;
    // "normal" is the consumer's default and stays implicit
    if lens.profile.lens_type != "normal" {
        text_element(writer, "type", &lens.profile.lens_type)?;
    }

    writer.write_event(Event::Start(BytesStart::new("calibration")))?;
    write_distortion(writer, lens)?;
    write_tca(writer, lens)?;
    write_vignetting(writer, lens)?;
    writer.write_event(Event::End(BytesEnd::new("calibration")))?;

    writer.write_event(Event::End(BytesEnd::new("lens")))?;
    Ok(())
}

fn write_distortion<W: std::io::Write>(
    writer: &mut Writer<W>,
    lens: &LensCalibration,
) -> Result<(), EmitError> {
    for focal in numeric_sorted(lens.distortion.keys().map(String::as_str)) {
        let value = &lens.distortion[focal];
        let coefficients: Vec<&str> = value.split(',').map(str::trim).collect();
        let mut element = BytesStart::new("distortion");
        match coefficients.as_slice() {
            [k1] => {
                element.push_attribute(("model", "poly3"));
                element.push_attribute(("focal", focal));
                element.push_attribute(("k1", *k1));
            }
            [a, b, c] => {
                element.push_attribute(("model", "ptlens"));
                element.push_attribute(("focal", focal));
                element.push_attribute(("a", *a));
                element.push_attribute(("b", *b));
                element.push_attribute(("c", *c));
            }
            other => {
                return Err(EmitError::BadDistortion {
                    lens: lens.model.clone(),
                    focal: focal.to_string(),
                    count: other.len(),
                });
            }
        }
        writer.write_event(Event::Empty(element))?;
    }
    Ok(())
}

fn write_tca<W: std::io::Write>(
    writer: &mut Writer<W>,
    lens: &LensCalibration,
) -> Result<(), EmitError> {
    for focal in numeric_sorted(lens.tca.keys().map(String::as_str)) {
        let entry = &lens.tca[focal];
        let mut element = BytesStart::new("tca");
        element.push_attribute(("model", "poly3"));
        element.push_attribute(("focal", focal));
        if entry.complex_tca {
            element.push_attribute(("br", float_attr(entry.br).as_str()));
            element.push_attribute(("vr", float_attr(entry.vr).as_str()));
            element.push_attribute(("bb", float_attr(entry.bb).as_str()));
            element.push_attribute(("vb", float_attr(entry.vb).as_str()));
        } else {
            element.push_attribute(("vr", float_attr(entry.vr).as_str()));
            element.push_attribute(("vb", float_attr(entry.vb).as_str()));
        }
        writer.write_event(Event::Empty(element))?;
    }
    Ok(())
}

fn write_vignetting<W: std::io::Write>(
    writer: &mut Writer<W>,
    lens: &LensCalibration,
) -> Result<(), EmitError> {
    for focal in numeric_sorted(lens.vignetting.keys().map(String::as_str)) {
        let apertures = &lens.vignetting[focal];
        for aperture in numeric_sorted(apertures.keys().map(String::as_str)) {
            let distances = &apertures[aperture];
            for distance in numeric_sorted(distances.keys().map(String::as_str)) {
                let entry = &distances[distance];
                let rewritten = if distance == "inf" { "1000" } else { distance };

                // The consumer interpolates between distances and needs
                // at least two samples; a lone infinity measurement is
                // replicated at a nearer stop.
                let emitted: &[&str] = if distances.len() == 1 && rewritten == "1000" {
                    &["10", "1000"]
                } else {
                    std::slice::from_ref(&rewritten)
                };

                for emit_distance in emitted {
                    let mut element = BytesStart::new("vignetting");
                    element.push_attribute(("model", "pa"));
                    element.push_attribute(("focal", focal));
                    element.push_attribute(("aperture", aperture));
                    element.push_attribute(("distance", *emit_distance));
                    element.push_attribute(("k1", format!("{:.7}", entry.k1).as_str()));
                    element.push_attribute(("k2", format!("{:.7}", entry.k2).as_str()));
                    element.push_attribute(("k3", format!("{:.7}", entry.k3).as_str()));
                    writer.write_event(Event::Empty(element))?;
                }
            }
        }
    }
    Ok(())
}

fn text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn float_attr(value: f64) -> String {
    lenscal_core::format_float(value)
}
