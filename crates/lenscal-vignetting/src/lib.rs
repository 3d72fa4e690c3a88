//! Radial vignetting analysis.
//!
//! Decodes the grayscale raster an external converter produced, bins
//! pixel intensities by normalized distance from the optical center,
//! and fits the radial falloff model
//!
//! ```text
//! f(r) = A · (1 + k1·r² + k2·r⁴ + k3·r⁶)
//! ```
//!
//! by nonlinear least squares. The binned medians (not means) feed the
//! fit so sensor dust and dead pixels cannot drag a bin.

mod fit;
mod pgm;
mod plot;
mod radial;

pub use fit::{falloff, fit_falloff, FalloffFit, FitError, INITIAL_GUESS};
pub use pgm::{decode, encode, PgmError, Raster, SampleFormat};
pub use plot::{bins_table, plot_script, samples_table};
pub use radial::{bin_medians, radial_samples, BinnedPoint, RadialSample, BIN_COUNT};
