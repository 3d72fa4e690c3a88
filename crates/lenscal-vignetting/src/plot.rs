//! Diagnostic outputs for human QA.
//!
//! The raw point cloud, the binned medians and a gnuplot script that
//! overlays both with the fitted curve. Nothing downstream consumes
//! these.

use std::fmt::Write;
use std::path::Path;

use crate::fit::FalloffFit;
use crate::radial::{BinnedPoint, RadialSample};

/// Render the full point cloud as `radius intensity` lines.
pub fn samples_table(samples: &[RadialSample]) -> String {
    let mut out = String::with_capacity(samples.len() * 16);
    for sample in samples {
        let _ = writeln!(out, "{:.6} {:.0}", sample.radius, sample.intensity);
    }
    out
}

/// Render the binned medians as `radius intensity` lines.
pub fn bins_table(bins: &[BinnedPoint]) -> String {
    let mut out = String::new();
    for bin in bins {
        let _ = writeln!(out, "{:.6} {:.0}", bin.radius, bin.intensity);
    }
    out
}

/// Build the gnuplot script combining raw points, binned medians and
/// the fitted falloff curve.
#[allow(clippy::too_many_arguments)]
pub fn plot_script(
    fit: &FalloffFit,
    lens_model: &str,
    focal_length: f64,
    aperture: f64,
    distance: f64,
    original_file: &Path,
    all_points_file: &Path,
    bins_file: &Path,
    pdf_file: &Path,
) -> String {
    let distance_label = if distance.is_infinite() {
        "∞".to_string()
    } else {
        lenscal_core::format_float(distance)
    };

    let mut script = String::new();
    let _ = writeln!(script, "set term pdf");
    let _ = writeln!(script, "set print \"{}\"", original_file.display());
    let _ = writeln!(script, "set output \"{}\"", pdf_file.display());
    let _ = writeln!(script, "set fit logfile \"/dev/null\"");
    let _ = writeln!(script, "set grid");
    let _ = writeln!(
        script,
        "set title \"{}, {:.1} mm, f/{:.1}, {} m\\n{}\" noenhanced",
        lens_model,
        focal_length,
        aperture,
        distance_label,
        original_file.display()
    );
    let _ = write!(
        script,
        "plot \"{}\" with dots title \"samples\", ",
        all_points_file.display()
    );
    let _ = write!(
        script,
        "\"{}\" with linespoints lw 4 title \"average\", ",
        bins_file.display()
    );
    let _ = writeln!(
        script,
        "{:.6} * (1 + ({:.6}) * x**2 + ({:.6}) * x**4 + ({:.6}) * x**6) title \"fit\"",
        fit.a, fit.k1, fit.k2, fit.k3
    );
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinity_distance_renders_as_symbol() {
        let fit = FalloffFit {
            a: 30000.0,
            k1: -0.3,
            k2: 0.0,
            k3: 0.0,
        };
        let script = plot_script(
            &fit,
            "Standard",
            50.0,
            8.0,
            f64::INFINITY,
            Path::new("vignetting/PC294201.ORF"),
            Path::new("vignetting/exported/PC294201.all_points.dat"),
            Path::new("vignetting/exported/PC294201.bins.dat"),
            Path::new("vignetting/exported/PC294201.pdf"),
        );
        assert!(script.contains("Standard, 50.0 mm, f/8.0, ∞ m"));
        assert!(script.contains("with dots title \"samples\""));
        assert!(script.contains("with linespoints lw 4 title \"average\""));
        assert!(script.contains("30000.000000 * (1 + (-0.300000) * x**2"));
    }

    #[test]
    fn finite_distance_keeps_numeric_label() {
        let fit = FalloffFit {
            a: 1000.0,
            k1: -0.1,
            k2: 0.0,
            k3: 0.0,
        };
        let script = plot_script(
            &fit,
            "Standard",
            50.0,
            4.0,
            10.0,
            Path::new("a"),
            Path::new("b"),
            Path::new("c"),
            Path::new("d"),
        );
        assert!(script.contains(", 10.0 m"));
    }
}
