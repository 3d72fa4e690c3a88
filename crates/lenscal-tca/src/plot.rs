use std::fmt::Write;
use std::path::Path;

use lenscal_core::TcaEntry;

/// Build the gnuplot script for the per-channel radial shift curves.
///
/// Pure text so the plotting step stays a thin tool invocation; the
/// rendered document is for human QA only.
pub fn plot_script(
    entry: &TcaEntry,
    lens_model: &str,
    focal_length: f64,
    aperture: f64,
    original_file: &Path,
    pdf_file: &Path,
) -> String {
    let mut script = String::new();
    let _ = writeln!(script, "set term pdf");
    let _ = writeln!(script, "set print \"{}\"", original_file.display());
    let _ = writeln!(script, "set output \"{}\"", pdf_file.display());
    let _ = writeln!(script, "set fit logfile \"/dev/null\"");
    let _ = writeln!(script, "set grid");
    let _ = writeln!(
        script,
        "set title \"{}, {:.1} mm, f/{:.1}\\n{}\" noenhanced",
        lens_model,
        focal_length,
        aperture,
        original_file.display()
    );
    let _ = writeln!(
        script,
        "plot [0:1.8] {} * x**2 + {} title \"red\", {} * x**2 + {} title \"blue\"",
        entry.br, entry.vr, entry.bb, entry.vb
    );
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_carries_both_channel_curves() {
        let entry = TcaEntry {
            complex_tca: true,
            br: -0.002,
            vr: 0.001,
            bb: 0.003,
            vb: -0.001,
        };
        let script = plot_script(
            &entry,
            "FE 16-35mm F2.8 GM",
            16.0,
            8.0,
            Path::new("tca/IMG_0001.ARW"),
            Path::new("tca/exported/IMG_0001.pdf"),
        );
        assert!(script.contains("plot [0:1.8] -0.002 * x**2 + 0.001 title \"red\""));
        assert!(script.contains("0.003 * x**2 + -0.001 title \"blue\""));
        assert!(script.contains("FE 16-35mm F2.8 GM, 16.0 mm, f/8.0"));
        assert!(script.contains("set output \"tca/exported/IMG_0001.pdf\""));
    }
}
