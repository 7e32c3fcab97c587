//! Fit of a squared-sine cycle model to monthly spot counts.
//!
//! The model is `N(t) = A·sin²(π·t/P + φ)`, the same shape as the emergence-rate
//! envelope. For fixed `(P, φ)` the least-squares amplitude has a closed form, so
//! only the two nonlinear parameters are searched.

use std::f64::consts::PI;

use serde::Serialize;
use thiserror::Error;

use super::monthly::MonthlyCounts;

/// Minimum number of monthly samples needed for a fit.
const MIN_MONTHS: usize = 3;

/// Grid resolution of the initial period search.
const COARSE_PERIOD_STEPS: usize = 101;
/// Grid resolution of the initial phase search over [0, π).
const COARSE_PHASE_STEPS: usize = 90;
/// Grid points per axis during refinement.
const REFINE_STEPS: usize = 21;
/// Number of refinement rounds.
const REFINE_ROUNDS: usize = 6;
/// Shrink factor of the search window per refinement round.
const REFINE_SHRINK: f64 = 0.2;

/// Errors that can occur while fitting spot counts.
#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Need at least 3 months of counts, got {0}")]
    NotEnoughMonths(usize),
    #[error("Initial period must be positive and finite, got {0}")]
    InvalidPeriod(f64),
}

/// Best-fit parameters of `A·sin²(π·t/P + φ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpotCycleFit {
    /// Amplitude in spots per month.
    pub amplitude: f64,
    /// Period of the squared sine in years (one activity cycle).
    pub period_years: f64,
    /// Phase shift in radians, in [0, π).
    pub phase: f64,
    /// Residual sum of squares.
    pub rss: f64,
}

/// Fits `A·sin²(π·t/P + φ)` to monthly counts.
///
/// # Arguments
/// * `counts` - Monthly spot counts with time in years
/// * `initial_period_years` - Starting guess for `P`; the search covers 0.5×–1.5× this value
///
/// # Returns
/// The parameters with the smallest residual sum of squares
pub fn fit_spot_amplitude(
    counts: &MonthlyCounts,
    initial_period_years: f64,
) -> Result<SpotCycleFit, AnalysisError> {
    if counts.len() < MIN_MONTHS {
        return Err(AnalysisError::NotEnoughMonths(counts.len()));
    }
    if !(initial_period_years > 0.0) || !initial_period_years.is_finite() {
        return Err(AnalysisError::InvalidPeriod(initial_period_years));
    }

    let t = &counts.time_years;
    let n = &counts.counts;

    let p_lo = 0.5 * initial_period_years;
    let p_hi = 1.5 * initial_period_years;
    let mut best = grid_search(
        t,
        n,
        (p_lo, p_hi, COARSE_PERIOD_STEPS),
        (0.0, PI, COARSE_PHASE_STEPS),
        true,
    );

    let mut half_p = (p_hi - p_lo) / (COARSE_PERIOD_STEPS - 1) as f64;
    let mut half_phi = PI / COARSE_PHASE_STEPS as f64;
    for _ in 0..REFINE_ROUNDS {
        let p_min = (best.period_years - half_p).max(p_lo);
        let p_max = (best.period_years + half_p).min(p_hi);
        let candidate = grid_search(
            t,
            n,
            (p_min, p_max, REFINE_STEPS),
            (best.phase - half_phi, best.phase + half_phi, REFINE_STEPS),
            false,
        );
        if candidate.rss <= best.rss {
            best = candidate;
        }
        half_p *= REFINE_SHRINK;
        half_phi *= REFINE_SHRINK;
    }

    best.phase = best.phase.rem_euclid(PI);
    Ok(best)
}

/// Evaluates the model on a `(P, φ)` grid and keeps the best point.
///
/// With `half_open_phase` the phase axis excludes its upper end, which avoids
/// sampling both 0 and π (the same model).
fn grid_search(
    t: &[f64],
    n: &[f64],
    (p_min, p_max, p_steps): (f64, f64, usize),
    (phi_min, phi_max, phi_steps): (f64, f64, usize),
    half_open_phase: bool,
) -> SpotCycleFit {
    let p_div = (p_steps.max(2) - 1) as f64;
    let phi_div = if half_open_phase {
        phi_steps.max(1) as f64
    } else {
        (phi_steps.max(2) - 1) as f64
    };

    let mut best = SpotCycleFit {
        amplitude: 0.0,
        period_years: p_min,
        phase: phi_min,
        rss: f64::INFINITY,
    };

    for i in 0..p_steps {
        let period = p_min + (p_max - p_min) * i as f64 / p_div;
        for k in 0..phi_steps {
            let phase = phi_min + (phi_max - phi_min) * k as f64 / phi_div;
            let (amplitude, rss) = amplitude_and_rss(t, n, period, phase);
            if rss < best.rss {
                best = SpotCycleFit {
                    amplitude,
                    period_years: period,
                    phase,
                    rss,
                };
            }
        }
    }

    best
}

/// Closed-form least-squares amplitude for fixed `(P, φ)` and its residual.
fn amplitude_and_rss(t: &[f64], n: &[f64], period: f64, phase: f64) -> (f64, f64) {
    let mut sn = 0.0;
    let mut ss = 0.0;
    for (&ti, &ni) in t.iter().zip(n) {
        let s = (PI * ti / period + phase).sin().powi(2);
        sn += ni * s;
        ss += s * s;
    }
    let amplitude = if ss > 0.0 { sn / ss } else { 0.0 };

    let rss = t
        .iter()
        .zip(n)
        .map(|(&ti, &ni)| {
            let r = ni - amplitude * (PI * ti / period + phase).sin().powi(2);
            r * r
        })
        .sum();

    (amplitude, rss)
}
