//! Solving for the filter polynomial and factoring it into steps.

use crate::filter::chebyshev::{chebroots, chebval, constrained_fit};
use crate::FilterError;
use log::{debug, warn};
use rustfft::num_complex::Complex;
use serde::Deserialize;

const PI: f64 = std::f64::consts::PI;

// Roots closer than this to the real axis are Laplacian steps.
const REAL_ROOT_TOL: f64 = 1e-12;

/// Largest acceptable RMS deviation of the polynomial from the target.
pub const RMS_TOLERANCE: f64 = 0.03;
/// Upper bound on the polynomial degree the adaptive search will try.
pub const MAX_STEPS: usize = 1000;
/// Number of degrees the adaptive search tries before giving up.
pub const MAX_CANDIDATES: usize = 64;
const N_ERROR_SAMPLES: usize = 2001;

/// Shape of the ideal frequency response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterShape {
    Gaussian,
    Taper,
}

impl FilterShape {
    /// Ideal response at squared wavenumber `s`.
    pub fn target(&self, s: f64, filter_scale: f64, transition_width: f64) -> f64 {
        match self {
            FilterShape::Gaussian => (-s * filter_scale * filter_scale / 24.0).exp(),
            FilterShape::Taper => {
                let k = s.max(0.0).sqrt();
                let k1 = 2.0 * PI / (transition_width * filter_scale);
                let k2 = 2.0 * PI / filter_scale;
                if k <= k1 {
                    1.0
                } else if k >= k2 {
                    0.0
                } else {
                    // monotone cubic through (k1, 1) and (k2, 0), flat at both knots
                    let u = (k - k1) / (k2 - k1);
                    1.0 - 3.0 * u * u + 2.0 * u * u * u
                }
            }
        }
    }

    /// Polynomial degree that is usually just enough for this shape.
    pub fn heuristic_n_steps(&self, filter_scale: f64, dx_min: f64) -> usize {
        let factor = match self {
            FilterShape::Gaussian => 1.1,
            FilterShape::Taper => 4.5,
        };
        ((factor * filter_scale / dx_min).ceil() as usize).max(3)
    }
}

/// The target response mapped onto the solver interval `t ∈ [-1, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct TargetResponse {
    pub shape: FilterShape,
    pub filter_scale: f64,
    pub transition_width: f64,
    /// Largest squared wavenumber the grid resolves, mapped to `t = 1`.
    pub s_max: f64,
}

impl TargetResponse {
    pub fn new(
        shape: FilterShape,
        filter_scale: f64,
        dx_min: f64,
        transition_width: f64,
        ndim: usize,
    ) -> TargetResponse {
        TargetResponse {
            shape,
            filter_scale,
            transition_width,
            s_max: ndim as f64 * (PI / dx_min).powi(2),
        }
    }

    #[inline]
    pub fn s_of_t(&self, t: f64) -> f64 {
        0.5 * self.s_max * (t + 1.0)
    }

    pub fn at_t(&self, t: f64) -> f64 {
        self.shape
            .target(self.s_of_t(t), self.filter_scale, self.transition_width)
    }
}

/// The filter as a product of Laplacian and biharmonic steps.
///
/// `s_l` holds one real root per Laplacian step and `s_b` one complex root per
/// biharmonic step (its conjugate is implied). The realised response at
/// squared wavenumber `s` is
/// `prod(1 - s / s_l) * prod(|1 - s / s_b|^2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterSpec {
    pub n_lap_steps: usize,
    pub s_l: Vec<f64>,
    pub n_bih_steps: usize,
    pub s_b: Vec<Complex<f64>>,
}

impl FilterSpec {
    /// Polynomial degree, `n_lap_steps + 2 n_bih_steps`.
    pub fn n_steps(&self) -> usize {
        self.n_lap_steps + 2 * self.n_bih_steps
    }

    /// Number of update stages `apply` runs, one per root kept.
    pub fn n_stages(&self) -> usize {
        self.n_lap_steps + self.n_bih_steps
    }

    pub fn transfer(&self, s: f64) -> f64 {
        let lap: f64 = self.s_l.iter().map(|&sl| 1.0 - s / sl).product();
        let bih: f64 = self
            .s_b
            .iter()
            .map(|sb| {
                let n2 = sb.norm_sqr();
                1.0 - 2.0 * sb.re * s / n2 + s * s / n2
            })
            .product();
        lap * bih
    }
}

fn check_params(
    filter_scale: f64,
    dx_min: f64,
    transition_width: f64,
    ndim: usize,
    n_steps: Option<usize>,
) -> Result<(), FilterError> {
    let bad = |msg: String| Err(FilterError::InvalidParameter(msg));
    if !(dx_min > 0.0) || !dx_min.is_finite() {
        return bad(format!("dx_min must be positive, got {}", dx_min));
    }
    if !(filter_scale > dx_min) || !filter_scale.is_finite() {
        return bad(format!(
            "filter_scale ({}) must be larger than dx_min ({})",
            filter_scale, dx_min
        ));
    }
    if !(transition_width > 1.0) || !transition_width.is_finite() {
        return bad(format!(
            "transition_width must be larger than 1, got {}",
            transition_width
        ));
    }
    if ndim != 1 && ndim != 2 {
        return bad(format!("ndim must be 1 or 2, got {}", ndim));
    }
    if let Some(n) = n_steps {
        if n < 3 {
            return bad(format!("n_steps must be at least 3, got {}", n));
        }
        if n > MAX_STEPS {
            return bad(format!("n_steps must not exceed {}, got {}", MAX_STEPS, n));
        }
    }
    Ok(())
}

/// RMS deviation `sqrt(0.5 * integral over [-1, 1] of (p - F)^2)`.
fn rms_error(p: &[f64], target: &TargetResponse) -> f64 {
    let h = 2.0 / (N_ERROR_SAMPLES - 1) as f64;
    let mut integral = 0.0;
    for i in 0..N_ERROR_SAMPLES {
        let t = -1.0 + h * i as f64;
        let d = chebval(t, p) - target.at_t(t);
        let w = if i == 0 || i == N_ERROR_SAMPLES - 1 {
            0.5
        } else {
            1.0
        };
        integral += w * d * d;
    }
    (0.5 * integral * h).sqrt()
}

/// Factors the degree `p.len() - 1` polynomial into filter steps.
fn factor(p: &[f64], target: &TargetResponse) -> Result<FilterSpec, FilterError> {
    let roots = chebroots(p)?;
    let mut s_l = Vec::new();
    let mut s_b = Vec::new();
    let mut n_upper = 0;
    for r in roots {
        let s = (r + 1.0) * (0.5 * target.s_max);
        if r.im.abs() < REAL_ROOT_TOL {
            s_l.push(s.re);
        } else if r.im < 0.0 {
            s_b.push(s);
        } else {
            n_upper += 1;
        }
    }
    if n_upper != s_b.len() || s_l.len() + 2 * s_b.len() != p.len() - 1 {
        return Err(FilterError::Solver(format!(
            "roots do not pair up: {} real, {} below and {} above the real axis for degree {}",
            s_l.len(),
            s_b.len(),
            n_upper,
            p.len() - 1
        )));
    }
    if s_l.iter().any(|&s| s == 0.0) {
        return Err(FilterError::Solver("zero root in filter polynomial".to_string()));
    }
    s_l.sort_by(|a, b| a.abs().total_cmp(&b.abs()).then(b.total_cmp(a)));
    s_b.sort_by(|a, b| a.norm().total_cmp(&b.norm()).then(a.arg().total_cmp(&b.arg())));
    Ok(FilterSpec {
        n_lap_steps: s_l.len(),
        s_l,
        n_bih_steps: s_b.len(),
        s_b,
    })
}

/// Solves for the filter polynomial and splits it into steps.
///
/// With `n_steps` given the polynomial has exactly that degree. Otherwise
/// the degree starts at the shape's heuristic and grows until the RMS
/// deviation from the target drops to [`RMS_TOLERANCE`].
pub fn compute_filter_spec(
    filter_scale: f64,
    dx_min: f64,
    filter_shape: FilterShape,
    transition_width: f64,
    ndim: usize,
    n_steps: Option<usize>,
) -> Result<FilterSpec, FilterError> {
    check_params(filter_scale, dx_min, transition_width, ndim, n_steps)?;
    let target = TargetResponse::new(filter_shape, filter_scale, dx_min, transition_width, ndim);
    if target.at_t(1.0) >= 1.0 {
        return Err(FilterError::InvalidParameter(format!(
            "filter_scale * transition_width ({}) must exceed 2 * dx_min / sqrt(ndim) ({}); the target response is the identity on this grid",
            filter_scale * transition_width,
            2.0 * dx_min / (ndim as f64).sqrt()
        )));
    }
    let heuristic = filter_shape.heuristic_n_steps(filter_scale, dx_min);

    if let Some(n) = n_steps {
        if n < heuristic {
            warn!(
                "n_steps = {} is below the {} steps suggested for filter_scale = {} and dx_min = {}; the filter may be inaccurate or unstable",
                n, heuristic, filter_scale, dx_min
            );
        }
        let p = constrained_fit(|t| target.at_t(t), n)?;
        let spec = factor(&p, &target)?;
        debug!(
            "filter spec with n_steps = {}: rms error {:.3e}, {} laplacian and {} biharmonic steps",
            n,
            rms_error(&p, &target),
            spec.n_lap_steps,
            spec.n_bih_steps
        );
        return Ok(spec);
    }

    if heuristic > MAX_STEPS {
        return Err(FilterError::InvalidParameter(format!(
            "filter_scale / dx_min = {} needs at least {} steps, more than the limit of {}",
            filter_scale / dx_min,
            heuristic,
            MAX_STEPS
        )));
    }
    let mut n = heuristic;
    let mut error = f64::INFINITY;
    for tried in 1..=MAX_CANDIDATES {
        if n > MAX_STEPS {
            return Err(FilterError::NonConvergence {
                tried: tried - 1,
                n_steps: n,
                max_steps: MAX_STEPS,
                error,
                tolerance: RMS_TOLERANCE,
            });
        }
        let p = constrained_fit(|t| target.at_t(t), n)?;
        error = rms_error(&p, &target);
        debug!("candidate n_steps = {}: rms error {:.3e}", n, error);
        if error <= RMS_TOLERANCE {
            let spec = factor(&p, &target)?;
            debug!(
                "accepted n_steps = {}: {} laplacian and {} biharmonic steps",
                n, spec.n_lap_steps, spec.n_bih_steps
            );
            return Ok(spec);
        }
        n += 1;
    }
    Err(FilterError::NonConvergence {
        tried: MAX_CANDIDATES,
        n_steps: n - 1,
        max_steps: MAX_STEPS,
        error,
        tolerance: RMS_TOLERANCE,
    })
}
