//! Nonlinear least-squares fit of the radial falloff model.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use thiserror::Error;

use lenscal_core::VignettingEntry;

/// Starting point for the solver: a bright center and mild falloff.
pub const INITIAL_GUESS: [f64; 4] = [30000.0, -0.3, 0.0, 0.0];

/// The falloff model `A · (1 + k1·r² + k2·r⁴ + k3·r⁶)`.
///
/// Normalized to 1.0 at the center before scaling, so
/// `falloff(0.0, a, ..) == a` for any coefficients.
pub fn falloff(radius: f64, a: f64, k1: f64, k2: f64, k3: f64) -> f64 {
    let r2 = radius * radius;
    a * (1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2)
}

#[derive(Debug, Error)]
pub enum FitError {
    #[error("not enough points for a falloff fit ({0})")]
    TooFewPoints(usize),
    #[error("non-finite intensity at radius {radius}")]
    NonFiniteInput { radius: f64 },
    #[error("degenerate intensity profile (no positive samples)")]
    DegenerateProfile,
    #[error("falloff fit did not converge")]
    DidNotConverge,
    #[error("falloff fit produced a degenerate solution (A = {a})")]
    DegenerateSolution { a: f64 },
}

/// A fitted falloff curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FalloffFit {
    pub a: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

impl FalloffFit {
    pub fn entry(&self) -> VignettingEntry {
        VignettingEntry {
            a: self.a,
            k1: self.k1,
            k2: self.k2,
            k3: self.k3,
        }
    }
}

struct FalloffProblem {
    radii: Vec<f64>,
    intensities: Vec<f64>,
    params: DVector<f64>,
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for FalloffProblem {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let (a, k1, k2, k3) = self.unpack();
        Some(DVector::from_iterator(
            self.radii.len(),
            self.radii
                .iter()
                .zip(&self.intensities)
                .map(|(&r, &y)| y - falloff(r, a, k1, k2, k3)),
        ))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let (a, k1, k2, k3) = self.unpack();
        let mut jac = DMatrix::zeros(self.radii.len(), 4);
        for (i, &r) in self.radii.iter().enumerate() {
            let r2 = r * r;
            let r4 = r2 * r2;
            let r6 = r4 * r2;
            jac[(i, 0)] = -(1.0 + k1 * r2 + k2 * r4 + k3 * r6);
            jac[(i, 1)] = -a * r2;
            jac[(i, 2)] = -a * r4;
            jac[(i, 3)] = -a * r6;
        }
        Some(jac)
    }
}

impl FalloffProblem {
    fn unpack(&self) -> (f64, f64, f64, f64) {
        (self.params[0], self.params[1], self.params[2], self.params[3])
    }
}

/// Fit the falloff model to `(radius, intensity)` points.
///
/// The fit is gated: a solver that fails to converge, non-finite
/// coefficients, or a non-positive intensity scale are all reported as
/// errors instead of being written out as a nonsense record.
pub fn fit_falloff(points: &[(f64, f64)]) -> Result<FalloffFit, FitError> {
    if points.len() < 4 {
        return Err(FitError::TooFewPoints(points.len()));
    }
    if let Some(&(radius, _)) = points.iter().find(|(_, y)| !y.is_finite()) {
        return Err(FitError::NonFiniteInput { radius });
    }
    if points.iter().all(|&(_, y)| y <= 0.0) {
        return Err(FitError::DegenerateProfile);
    }

    let problem = FalloffProblem {
        radii: points.iter().map(|&(r, _)| r).collect(),
        intensities: points.iter().map(|&(_, y)| y).collect(),
        params: DVector::from_row_slice(&INITIAL_GUESS),
    };

    let (solved, report) = LevenbergMarquardt::new().minimize(problem);
    if !report.termination.was_successful() {
        return Err(FitError::DidNotConverge);
    }

    let params = solved.params();
    let fit = FalloffFit {
        a: params[0],
        k1: params[1],
        k2: params[2],
        k3: params[3],
    };
    if !(fit.a.is_finite() && fit.k1.is_finite() && fit.k2.is_finite() && fit.k3.is_finite()) {
        return Err(FitError::DidNotConverge);
    }
    if fit.a <= 0.0 {
        return Err(FitError::DegenerateSolution { a: fit.a });
    }
    Ok(fit)
}
