use std::path::Path;

use log::{debug, warn};

use crate::tags::{MetaTag, TagSource};
use lenscal_core::{mount_for_maker, normalize_maker, ExifSample, MAKER_UNKNOWN, STANDARD_LENS};

/// Manufacturer lens-identity fields, tried in priority order when the
/// standard lens-model field is absent. First match wins.
const LENS_MODEL_FALLBACK: &[MetaTag] = &[
    MetaTag::NikonLensId,
    MetaTag::PanasonicLensType,
    MetaTag::SonyLensId,
    MetaTag::MinoltaLensId,
    MetaTag::OlympusLensType,
];

/// Fields a maker string may be derived from, in priority order.
const LENS_MAKER_FIELDS: &[MetaTag] = &[MetaTag::LensModel, MetaTag::OlympusLensType];

/// Resolve one image's metadata into an [`ExifSample`].
///
/// Never fails: absent fields default and warn. Cameras write nothing
/// useful for legacy manual lenses, and the remediation is a human
/// step (retagging the files), so aborting here would only get in the
/// way.
pub fn resolve(source: &dyn TagSource, crop_factor: Option<f64>, path: &Path) -> ExifSample {
    let aspect_ratio = source.tag(MetaTag::AspectRatio);
    if aspect_ratio.is_none() {
        debug!("{} carries no aspect-ratio field", path.display());
    }

    let lens_model = resolve_lens_model(source);
    let focal_length = resolve_float(source, MetaTag::FocalLength, "FocalLength", path);
    let aperture = resolve_float(source, MetaTag::FNumber, "FNumber", path);

    if aperture == 0.0 {
        print_manual_lens_guidance();
    }

    let lens_maker = resolve_maker(source, path);
    let mount = mount_for_maker(&lens_maker).map(str::to_string);

    ExifSample {
        lens_model,
        focal_length,
        aperture,
        aspect_ratio,
        crop_factor,
        lens_maker,
        mount,
    }
}

fn resolve_lens_model(source: &dyn TagSource) -> String {
    if let Some(model) = source.tag(MetaTag::LensModel) {
        return model;
    }
    for &tag in LENS_MODEL_FALLBACK {
        if let Some(model) = source.tag(tag) {
            return model;
        }
    }
    STANDARD_LENS.to_string()
}

fn resolve_maker(source: &dyn TagSource, path: &Path) -> String {
    for &tag in LENS_MAKER_FIELDS {
        if let Some(raw) = source.tag(tag) {
            return normalize_maker(&raw);
        }
    }
    warn!("{} carries no lens-maker field", path.display());
    MAKER_UNKNOWN.to_string()
}

fn resolve_float(source: &dyn TagSource, tag: MetaTag, name: &str, path: &Path) -> f64 {
    match source.tag(tag).as_deref().and_then(parse_float_prefix) {
        Some(v) => v,
        None => {
            warn!(
                "{} doesn't have {} set. Please fix it manually.",
                path.display(),
                name
            );
            0.0
        }
    }
}

/// Parse the leading decimal of a tag value, tolerating trailing units
/// (`"14.0 mm"`).
fn parse_float_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn print_manual_lens_guidance() {
    println!("\nLens metadata not found. Is the lens legacy manual?");
    println!("Please add metadata with:");
    println!(
        "exiftool -Exif:LensModel='long lens model name' \
         -Exif:FocalLength='00.0 mm' -Exif:FNumber='0' filename.ext"
    );
    println!("eg:");
    println!(
        "exiftool -Exif:LensModel='Olympus OM System ZUIKO Auto-S 50mm F1:1.8' \
         -Exif:FocalLength='50.0 mm' -Exif:FNumber='8' PC294201.ORF"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lenscal_core::MAKER_UNREADABLE;
    use std::collections::HashMap;

    fn source(pairs: &[(MetaTag, &str)]) -> HashMap<MetaTag, String> {
        pairs
            .iter()
            .map(|(t, v)| (*t, v.to_string()))
            .collect()
    }

    fn path() -> &'static Path {
        Path::new("test.orf")
    }

    #[test]
    fn standard_fields_resolve_directly() {
        let src = source(&[
            (MetaTag::LensModel, "Olympus Zuiko Digital 11-22mm F2.8-3.5"),
            (MetaTag::FocalLength, "11.0 mm"),
            (MetaTag::FNumber, "5.6"),
            (MetaTag::AspectRatio, "4:3"),
        ]);
        let sample = resolve(&src, Some(2.0), path());
        assert_eq!(sample.lens_model, "Olympus Zuiko Digital 11-22mm F2.8-3.5");
        assert_eq!(sample.focal_length, 11.0);
        assert_eq!(sample.aperture, 5.6);
        assert_eq!(sample.aspect_ratio.as_deref(), Some("4:3"));
        assert_eq!(sample.crop_factor, Some(2.0));
        assert_eq!(sample.lens_maker, "Olympus Zuiko Digital");
        assert_eq!(sample.mount.as_deref(), Some("4/3 System"));
    }

    #[test]
    fn fallback_chain_prefers_earlier_manufacturers() {
        let src = source(&[
            (MetaTag::NikonLensId, "AF-S Nikkor 50mm f/1.8G"),
            (MetaTag::OlympusLensType, "Olympus Zuiko Digital 11-22mm F2.8-3.5"),
        ]);
        let sample = resolve(&src, None, path());
        assert_eq!(sample.lens_model, "AF-S Nikkor 50mm f/1.8G");
    }

    #[test]
    fn empty_metadata_defaults_everything() {
        let src = source(&[]);
        let sample = resolve(&src, None, path());
        assert_eq!(sample.lens_model, STANDARD_LENS);
        assert_eq!(sample.focal_length, 0.0);
        assert_eq!(sample.aperture, 0.0);
        assert_eq!(sample.lens_maker, MAKER_UNKNOWN);
        assert_eq!(sample.mount, None);
        assert_eq!(sample.aspect_ratio, None);
    }

    #[test]
    fn unreadable_olympus_lens_type_maps_to_brace_sentinel() {
        let src = source(&[
            (MetaTag::OlympusLensType, "None"),
            (MetaTag::FocalLength, "50.0 mm"),
            (MetaTag::FNumber, "8.0"),
        ]);
        let sample = resolve(&src, None, path());
        assert_eq!(sample.lens_maker, MAKER_UNREADABLE);
        assert_eq!(sample.mount.as_deref(), Some(MAKER_UNKNOWN));
    }

    #[test]
    fn float_prefix_parsing_tolerates_units() {
        assert_eq!(parse_float_prefix("14.0 mm"), Some(14.0));
        assert_eq!(parse_float_prefix("5.6"), Some(5.6));
        assert_eq!(parse_float_prefix("  2.8  "), Some(2.8));
        assert_eq!(parse_float_prefix("f/2.8"), None);
    }
}
