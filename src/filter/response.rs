//! Frequency response of filters on periodic grids.

use crate::filter::Filter;
use crate::flds::field::{Field, FieldDim, Pos};
use crate::{FilterError, Float};
use itertools::izip;
use num_traits::Zero;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::sync::Arc;

const PI: Float = std::f64::consts::PI as Float;

/// Discrete wavenumbers of an `ny x nx` periodic grid in FFT order, with
/// the eigenvalues of the negative five-point Laplacian at each of them.
pub struct WaveNumbers {
    pub k_x: Vec<Float>,
    pub k_y: Vec<Float>,
    /// `4 sin^2(k_x / 2) + 4 sin^2(k_y / 2)`
    pub lap_eigen: Vec<Float>,
}

impl WaveNumbers {
    pub fn new(dim: FieldDim) -> WaveNumbers {
        let mut k_x = vec![0.0; dim.len()];
        let mut k_y = vec![0.0; dim.len()];
        let mut lap_eigen = vec![0.0; dim.len()];

        for i in 0..dim.size_y {
            for j in 0..dim.size_x {
                let ind = dim.get_index(Pos { row: i, col: j });
                k_x[ind] = j as Float;
                if j >= dim.size_x / 2 + 1 {
                    k_x[ind] -= dim.size_x as Float;
                }
                k_x[ind] *= 2.0 * PI / (dim.size_x as Float);
                k_y[ind] = i as Float;
                if i >= dim.size_y / 2 + 1 {
                    k_y[ind] -= dim.size_y as Float;
                }
                k_y[ind] *= 2.0 * PI / (dim.size_y as Float);
            }
        }
        for (eig, kx, ky) in izip!(&mut lap_eigen, &k_x, &k_y) {
            *eig = 4.0 * (0.5 * kx).sin().powi(2) + 4.0 * (0.5 * ky).sin().powi(2);
        }

        WaveNumbers { k_x, k_y, lap_eigen }
    }
}

/// Forward 2D FFT done as row transforms with transposes in between.
pub struct Fft2D {
    field_size: FieldDim,
    fft_x: Arc<dyn rustfft::Fft<Float>>,
    fft_y: Arc<dyn rustfft::Fft<Float>>,
    wrkspace: Vec<Complex<Float>>,
}

impl Fft2D {
    pub fn new(dim: FieldDim) -> Fft2D {
        let mut planner = FftPlanner::new();
        Fft2D {
            field_size: dim,
            fft_x: planner.plan_fft_forward(dim.size_x),
            fft_y: planner.plan_fft_forward(dim.size_y),
            wrkspace: vec![Complex::zero(); dim.len()],
        }
    }

    fn transpose(in_vec: &[Complex<Float>], out_vec: &mut [Complex<Float>], dim: &mut FieldDim) {
        let (size_x, size_y) = (dim.size_x, dim.size_y);
        if !cfg!(feature = "unchecked") {
            assert_eq!(in_vec.len(), out_vec.len());
            assert_eq!(in_vec.len(), size_x * size_y);
        }
        for i in 0..size_y {
            for j in 0..size_x {
                out_vec[j * size_y + i] = in_vec[i * size_x + j];
            }
        }
        dim.size_x = size_y;
        dim.size_y = size_x;
    }

    /// Transforms `data` in place. `data` is row-major with this plan's shape.
    pub fn fft(&mut self, data: &mut [Complex<Float>]) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(data.len(), self.field_size.len());
        }
        if data.is_empty() {
            return;
        }
        let mut dim = self.field_size;
        self.fft_x.process(data);
        Fft2D::transpose(data, &mut self.wrkspace, &mut dim);
        self.fft_y.process(&mut self.wrkspace);
        Fft2D::transpose(&self.wrkspace, data, &mut dim);
    }
}

/// The 2D DFT of the filter's response to a unit impulse at the origin of
/// an `ny x nx` grid, in FFT order. For a translation invariant filter this
/// is its transfer function at the wavenumbers of [`WaveNumbers`].
pub fn impulse_response(
    filter: &Filter,
    size_y: usize,
    size_x: usize,
) -> Result<Vec<Complex<Float>>, FilterError> {
    let dim = FieldDim { size_x, size_y };
    let mut impulse = Field::new(dim);
    if !dim.is_empty() {
        impulse.set(Pos { row: 0, col: 0 }, 1.0);
    }
    let filtered = filter.apply_2d(&impulse)?;
    let mut spectral: Vec<Complex<Float>> = filtered
        .spatial
        .iter()
        .map(|&v| Complex::new(v, 0.0))
        .collect();
    Fft2D::new(dim).fft(&mut spectral);
    Ok(spectral)
}
