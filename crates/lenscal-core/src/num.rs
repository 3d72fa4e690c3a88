//! Helpers for string-keyed numeric values.
//!
//! Focal lengths, apertures and distances travel through artifact
//! files as strings but must always sort as numbers: `"100.0"` comes
//! after `"14.0"`, and `"inf"` comes last.

use std::cmp::Ordering;

/// Format a focal length the way configuration keys spell it
/// (one decimal place, e.g. `14.0`).
pub fn format_focal(mm: f64) -> String {
    format!("{mm:.1}")
}

/// Format a float the way artifact files spell free values: integral
/// values keep a trailing `.0`, infinity is the literal `inf`.
pub fn format_float(v: f64) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn sort_value(key: &str) -> f64 {
    // "inf" parses to infinity, which is exactly where it belongs.
    key.trim().parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Sort string keys by their numeric value, ascending. Keys that do not
/// parse sort last, ties fall back to the string order so the result is
/// deterministic.
pub fn numeric_sorted<'a, I>(keys: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<&str> = keys.into_iter().collect();
    out.sort_by(|a, b| {
        sort_value(a)
            .partial_cmp(&sort_value(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(b))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focal_lengths_sort_numerically_not_lexically() {
        let keys = ["7.0", "14.0", "100.0"];
        let sorted = numeric_sorted(keys.iter().copied());
        assert_eq!(sorted, vec!["7.0", "14.0", "100.0"]);

        let reversed = ["100.0", "14.0", "7.0"];
        assert_eq!(
            numeric_sorted(reversed.iter().copied()),
            vec!["7.0", "14.0", "100.0"]
        );
    }

    #[test]
    fn infinity_sorts_last() {
        let keys = ["inf", "10.0", "1000.0"];
        assert_eq!(
            numeric_sorted(keys.iter().copied()),
            vec!["10.0", "1000.0", "inf"]
        );
    }

    #[test]
    fn float_formatting_keeps_trailing_zero() {
        assert_eq!(format_float(8.0), "8.0");
        assert_eq!(format_float(0.95), "0.95");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_focal(14.0), "14.0");
        assert_eq!(format_focal(14.56), "14.6");
    }
}
