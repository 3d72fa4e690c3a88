//! Parsing for the external chromatic-aberration detector.
//!
//! The detector prints one line of per-channel radial polynomial
//! coefficients:
//!
//! ```text
//! -r 0.0:-0.002:0.0:0.001 -b 0.0:0.003:0.0:-0.001
//! ```
//!
//! Each channel group is four colon-separated signed decimals; the
//! second is the quadratic term (`br`/`bb`) and the fourth the linear
//! scale (`vr`/`vb`). Anything else in the captured output is noise.

mod plot;

pub use plot::plot_script;

use lenscal_core::TcaEntry;

#[derive(thiserror::Error, Debug)]
pub enum TcaParseError {
    #[error("could not find tca correction data")]
    NoCoefficients,
}

/// Parse the detector's captured output into a [`TcaEntry`].
///
/// The first line holding a well-formed coefficient pair wins; output
/// without one is a hard error for the calling job.
pub fn parse_output(output: &str, complex_tca: bool) -> Result<TcaEntry, TcaParseError> {
    output
        .lines()
        .find_map(parse_line)
        .map(|(br, vr, bb, vb)| TcaEntry {
            complex_tca,
            br,
            vr,
            bb,
            vb,
        })
        .ok_or(TcaParseError::NoCoefficients)
}

fn parse_line(line: &str) -> Option<(f64, f64, f64, f64)> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "-r" {
        return None;
    }
    let (br, vr) = parse_channel(tokens.next()?)?;
    if tokens.next()? != "-b" {
        return None;
    }
    let (bb, vb) = parse_channel(tokens.next()?)?;
    Some((br, vr, bb, vb))
}

fn parse_channel(token: &str) -> Option<(f64, f64)> {
    let mut values = token.split(':').map(|part| part.parse::<f64>().ok());
    let _a = values.next()??;
    let b = values.next()??;
    let _c = values.next()??;
    let v = values.next()??;
    if values.next().is_some() {
        return None;
    }
    Some((b, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detector_output_line() {
        let entry =
            parse_output("-r 0.0:-0.002:0.0:0.001 -b 0.0:0.003:0.0:-0.001", false).unwrap();
        assert_eq!(entry.br, -0.002);
        assert_eq!(entry.vr, 0.001);
        assert_eq!(entry.bb, 0.003);
        assert_eq!(entry.vb, -0.001);
        assert!(!entry.complex_tca);
    }

    #[test]
    fn skips_leading_noise_lines() {
        let output = "reading image\n-r 0.0:0.0:0.0:1.0001 -b 0.0:0.0:0.0:0.9998\n";
        let entry = parse_output(output, true).unwrap();
        assert_eq!(entry.vr, 1.0001);
        assert_eq!(entry.vb, 0.9998);
        assert!(entry.complex_tca);
    }

    #[test]
    fn rejects_malformed_output() {
        assert!(matches!(
            parse_output("no coefficients here", false),
            Err(TcaParseError::NoCoefficients)
        ));
        assert!(parse_output("-r 0.0:-0.002:0.001 -b 0.0:0.003:0.0:-0.001", false).is_err());
        assert!(parse_output("", false).is_err());
    }
}
