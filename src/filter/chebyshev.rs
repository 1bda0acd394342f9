//! Chebyshev series helpers used to build the filter polynomial.
//!
//! All series here are in the first-kind basis `T_k` on `[-1, 1]` and are
//! stored lowest degree first.

use crate::FilterError;
use nalgebra::linalg::Schur;
use nalgebra::{DMatrix, DVector};
use rustfft::num_complex::Complex;

const PI: f64 = std::f64::consts::PI;

// Iteration cap for the Schur decomposition of the colleague matrix.
const SCHUR_MAX_ITER: usize = 100_000;

/// The `n` Gauss–Chebyshev nodes `cos(pi (2i + 1) / 2n)`, in decreasing order.
pub fn gauss_points(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| (PI * (2 * i + 1) as f64 / (2 * n) as f64).cos())
        .collect()
}

/// Evaluates the series `c` at `x` with Clenshaw's recurrence.
pub fn chebval(x: f64, c: &[f64]) -> f64 {
    match c.len() {
        0 => 0.0,
        1 => c[0],
        _ => {
            let mut b1 = 0.0;
            let mut b2 = 0.0;
            for &ck in c[1..].iter().rev() {
                let b0 = ck + 2.0 * x * b1 - b2;
                b2 = b1;
                b1 = b0;
            }
            c[0] + x * b1 - b2
        }
    }
}

/// Values of `T_0 .. T_deg` at `x`.
fn cheb_basis(x: f64, deg: usize) -> Vec<f64> {
    let mut t = Vec::with_capacity(deg + 1);
    t.push(1.0);
    if deg >= 1 {
        t.push(x);
    }
    for k in 2..=deg {
        let next = 2.0 * x * t[k - 1] - t[k - 2];
        t.push(next);
    }
    t
}

/// Gram matrix of the Shen basis `phi_i = T_i - T_{i+2}`, `i < n - 1`, under
/// the Chebyshev weight `1 / sqrt(1 - x^2)`.
pub(crate) fn shen_mass_matrix(n: usize) -> DMatrix<f64> {
    let m = n.saturating_sub(1);
    DMatrix::from_fn(m, m, |i, j| {
        if i == j {
            if i == 0 {
                1.5 * PI
            } else {
                PI
            }
        } else if i + 2 == j || j + 2 == i {
            -0.5 * PI
        } else {
            0.0
        }
    })
}

/// Best weighted least-squares fit of degree `n` to `target` on `[-1, 1]`
/// that matches the target exactly at both ends, with `target(-1) = 1`.
///
/// The boundary values are lifted out by a linear term; the remainder is
/// expanded in the Shen basis, which vanishes at `±1`, and found by a
/// Galerkin projection evaluated with `n + 1` point Gauss–Chebyshev
/// quadrature.
pub fn constrained_fit<F>(target: F, n: usize) -> Result<Vec<f64>, FilterError>
where
    F: Fn(f64) -> f64,
{
    if n < 2 {
        return Err(FilterError::InvalidParameter(format!(
            "polynomial degree must be at least 2, got {}",
            n
        )));
    }
    let f_right = target(1.0);
    let lift = |x: f64| 0.5 * (1.0 - x) + 0.5 * f_right * (x + 1.0);

    let n_quad = n + 1;
    let weight = PI / n_quad as f64;
    let mut rhs = DVector::<f64>::zeros(n - 1);
    for x in gauss_points(n_quad) {
        let t = cheb_basis(x, n);
        let resid = target(x) - lift(x);
        for i in 0..n - 1 {
            rhs[i] += weight * (t[i] - t[i + 2]) * resid;
        }
    }

    let coef = shen_mass_matrix(n)
        .lu()
        .solve(&rhs)
        .ok_or_else(|| FilterError::Solver("singular Galerkin mass matrix".to_string()))?;

    // back to the T_k basis, then add the lift
    let mut p = vec![0.0; n + 1];
    for (i, &ci) in coef.iter().enumerate() {
        p[i] += ci;
        p[i + 2] -= ci;
    }
    p[0] += 0.5 * (1.0 + f_right);
    p[1] -= 0.5 * (1.0 - f_right);
    Ok(p)
}

/// The colleague matrix of `c`, whose eigenvalues are the roots of the
/// series. `c` must have degree at least 2 and a non-zero leading term.
fn colleague_matrix(c: &[f64]) -> DMatrix<f64> {
    let n = c.len() - 1;
    let half_sqrt = 0.5f64.sqrt();
    let scl = |k: usize| if k == 0 { 1.0 } else { half_sqrt };
    let mut mat = DMatrix::<f64>::zeros(n, n);
    for k in 0..n - 1 {
        let v = if k == 0 { half_sqrt } else { 0.5 };
        mat[(k, k + 1)] = v;
        mat[(k + 1, k)] = v;
    }
    let lead = c[n];
    for k in 0..n {
        mat[(k, n - 1)] -= 0.5 * (c[k] / lead) * (scl(k) / scl(n - 1));
    }
    mat
}

/// All complex roots of the series `c`, sorted by real part.
pub fn chebroots(c: &[f64]) -> Result<Vec<Complex<f64>>, FilterError> {
    let mut end = c.len();
    while end > 0 && c[end - 1] == 0.0 {
        end -= 1;
    }
    let c = &c[..end];
    let mut roots = match c.len() {
        0 | 1 => Vec::new(),
        2 => vec![Complex::new(-c[0] / c[1], 0.0)],
        _ => {
            let schur = Schur::try_new(colleague_matrix(c), f64::EPSILON, SCHUR_MAX_ITER)
                .ok_or_else(|| {
                    FilterError::Solver(format!(
                        "eigenvalue iteration did not converge for a degree {} polynomial",
                        c.len() - 1
                    ))
                })?;
            schur.complex_eigenvalues().iter().cloned().collect()
        }
    };
    roots.sort_by(|a: &Complex<f64>, b: &Complex<f64>| {
        a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im))
    });
    Ok(roots)
}
