//! Queries against the external metadata tool.
//!
//! exiftool is optional at runtime: an unavailable tool degrades to
//! absent fields (and a zero crop factor), never to an abort.

use std::path::Path;
use std::process::Command;

use log::{debug, warn};

use crate::tags::MetaTag;

const TOOL: &str = "exiftool";

/// Fetch one makernote/composite tag value, short output format.
pub(crate) fn query_tag(path: &Path, tag: MetaTag) -> Option<String> {
    let output = Command::new(TOOL)
        .arg("-s3")
        .arg(tag.exiftool_name())
        .arg(path)
        .output();
    match output {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Ok(out) => {
            debug!(
                "exiftool {} failed on {}: {}",
                tag.exiftool_name(),
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            );
            None
        }
        Err(err) => {
            debug!("exiftool unavailable: {err}");
            None
        }
    }
}

/// Resolve the 35mm-equivalent scale factor (crop factor).
///
/// This is a composite field only the external tool computes. An
/// absent tag resolves to `None`; a tool failure resolves to 0.0 so
/// the pipeline keeps going and the template shows the operator what
/// to fix.
pub(crate) fn crop_factor(path: &Path) -> Option<f64> {
    let output = Command::new(TOOL)
        .args(["-T", "-ScaleFactor35efl"])
        .arg(path)
        .output();
    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout)
            .trim()
            .parse::<f64>()
            .ok(),
        Ok(out) => {
            warn!(
                "exiftool error on {}: {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            );
            Some(0.0)
        }
        Err(err) => {
            warn!("exiftool unavailable ({err}), crop factor set to 0.0");
            Some(0.0)
        }
    }
}
