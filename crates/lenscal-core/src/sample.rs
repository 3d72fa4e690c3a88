use serde::{Deserialize, Serialize};

/// Shooting parameters and lens identity resolved from one image.
///
/// Built once per image by the metadata resolver and read-only from
/// then on. `lens_model` is the grouping key for a lens across every
/// workflow: two images with different model strings are different
/// lenses, even if the glass is the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExifSample {
    pub lens_model: String,
    /// Focal length in millimetres; 0.0 when the field is missing.
    pub focal_length: f64,
    /// F-number; 0.0 when the field is missing.
    pub aperture: f64,
    pub aspect_ratio: Option<String>,
    pub crop_factor: Option<f64>,
    pub lens_maker: String,
    pub mount: Option<String>,
}

/// Transverse chromatic aberration coefficients for one focal length.
///
/// `br`/`bb` carry the quadratic terms and are only populated when the
/// detector ran in the nonlinear ("complex") mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcaEntry {
    pub complex_tca: bool,
    pub br: f64,
    pub vr: f64,
    pub bb: f64,
    pub vb: f64,
}

/// Fitted vignetting falloff for one (focal length, aperture, distance).
///
/// `a` is the fitted intensity scale; it is kept for diagnostics but
/// never emitted to the database.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VignettingEntry {
    pub a: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exif_sample_serializes_round_trip() {
        let sample = ExifSample {
            lens_model: "Olympus Zuiko Digital 11-22mm F2.8-3.5".to_string(),
            focal_length: 11.0,
            aperture: 5.6,
            aspect_ratio: Some("4:3".to_string()),
            crop_factor: Some(2.0),
            lens_maker: "Olympus Zuiko Digital".to_string(),
            mount: Some("4/3 System".to_string()),
        };
        let json = serde_json::to_string(&sample).unwrap();
        let back: ExifSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
