//! Thin wrappers around the external programs.
//!
//! Every tool is optional at runtime: a spawn failure with `NotFound`
//! maps to [`ToolError::Missing`], which callers treat as a non-fatal
//! per-job outcome. Anything the tools print is captured and only
//! surfaced on failure.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("could not find {tool}")]
    Missing { tool: &'static str },
    #[error("{tool} failed ({status}): {detail}")]
    Failed {
        tool: &'static str,
        status: std::process::ExitStatus,
        detail: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Export profile for the RAW converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertProfile {
    /// 16-bit TIFF for the operator's visual distortion tooling.
    DistortionTiff,
    /// Full-size PPM with camera RGB passed through.
    TcaPpm,
    /// Downscaled export with camera color, for radial analysis and
    /// previews.
    Vignetting,
}

/// Render a RAW file through darktable-cli with the workflow's sidecar.
pub fn convert_raw(
    profile: ConvertProfile,
    input: &Path,
    sidecar: &Path,
    output: &Path,
) -> Result<(), ToolError> {
    // A throwaway config dir keeps the user's darktable settings (and
    // its instance lock) out of the conversion.
    let config_dir = tempfile::Builder::new().prefix("lenscal_").tempdir()?;

    let mut cmd = Command::new("darktable-cli");
    cmd.arg(input).arg(sidecar).arg(output);
    if profile == ConvertProfile::Vignetting {
        cmd.args(["--width", "250"]);
    }
    cmd.arg("--core");
    cmd.arg("--configdir").arg(config_dir.path());
    let confs: &[&str] = match profile {
        ConvertProfile::DistortionTiff => &[
            "plugins/lighttable/export/iccintent=0",
            "plugins/lighttable/export/iccprofile=sRGB",
            "plugins/lighttable/export/style=none",
            "plugins/imageio/format/tiff/bpp=16",
            "plugins/imageio/format/tiff/compress=5",
        ],
        ConvertProfile::TcaPpm | ConvertProfile::Vignetting => &[
            "plugins/lighttable/export/iccprofile=image",
            "plugins/lighttable/export/style=none",
        ],
    };
    for conf in confs {
        cmd.args(["--conf", conf]);
    }

    run_quiet(cmd, "darktable-cli")
}

/// Flatten an RGB PPM into a single-channel raster.
pub fn convert_to_grayscale(input: &Path, output: &Path) -> Result<(), ToolError> {
    let mut cmd = Command::new("convert");
    cmd.args(["-colorspace", "RGB"])
        .arg(input)
        .args(["-set", "colorspace", "RGB"])
        .arg(output);
    run_quiet(cmd, "convert")
}

/// Run the chromatic-aberration detector and capture its output.
pub fn detect_tca(input: &Path, complex_tca: bool) -> Result<String, ToolError> {
    let optimization = if complex_tca { "bv" } else { "v" };
    let output = Command::new("tca_correct")
        .args(["-o", optimization])
        .arg(input)
        .output()
        .map_err(|err| spawn_error("tca_correct", err))?;
    if !output.status.success() {
        return Err(failure("tca_correct", &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Render a gnuplot script.
pub fn render_plot(script: &Path) -> Result<(), ToolError> {
    let mut cmd = Command::new("gnuplot");
    cmd.arg(script);
    run_quiet(cmd, "gnuplot")
}

fn run_quiet(mut cmd: Command, tool: &'static str) -> Result<(), ToolError> {
    let output = cmd.output().map_err(|err| spawn_error(tool, err))?;
    if !output.status.success() {
        return Err(failure(tool, &output));
    }
    Ok(())
}

fn spawn_error(tool: &'static str, err: std::io::Error) -> ToolError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ToolError::Missing { tool }
    } else {
        ToolError::Io(err)
    }
}

fn failure(tool: &'static str, output: &std::process::Output) -> ToolError {
    let mut detail = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        if !detail.is_empty() {
            detail.push('\n');
        }
        detail.push_str(stderr);
    }
    const LIMIT: usize = 2000;
    if detail.len() > LIMIT {
        let cut = detail
            .char_indices()
            .take_while(|(i, _)| *i < LIMIT)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        detail.truncate(cut);
        detail.push_str(" ...");
    }
    ToolError::Failed {
        tool,
        status: output.status,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_binary_maps_to_missing() {
        let err = Command::new("lenscal-no-such-tool-xyz")
            .output()
            .map_err(|e| spawn_error("lenscal-no-such-tool-xyz", e))
            .unwrap_err();
        assert!(matches!(err, ToolError::Missing { .. }));
    }
}
