pub mod chebyshev;
pub mod response;
pub mod spec;

use crate::flds::field::{Field, FieldDim};
use crate::flds::ghosts::GhostedField;
use crate::flds::named::NamedArray;
use crate::kernels::{GridType, GridVars, Laplacian};
use crate::{FilterError, Float, PI};
use log::info;
use rayon::prelude::*;

pub use spec::{compute_filter_spec, FilterShape, FilterSpec};

/// Everything needed to design a filter, independent of the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterArgs {
    pub filter_scale: f64,
    pub dx_min: f64,
    pub filter_shape: FilterShape,
    pub transition_width: f64,
    pub ndim: usize,
    /// Polynomial degree. `None` picks it adaptively.
    pub n_steps: Option<usize>,
}

impl FilterArgs {
    pub fn new(filter_scale: f64, dx_min: f64, filter_shape: FilterShape) -> FilterArgs {
        FilterArgs {
            filter_scale,
            dx_min,
            filter_shape,
            transition_width: PI,
            ndim: 2,
            n_steps: None,
        }
    }

    pub fn transition_width(mut self, transition_width: f64) -> FilterArgs {
        self.transition_width = transition_width;
        self
    }

    pub fn ndim(mut self, ndim: usize) -> FilterArgs {
        self.ndim = ndim;
        self
    }

    pub fn n_steps(mut self, n_steps: usize) -> FilterArgs {
        self.n_steps = Some(n_steps);
        self
    }

    pub fn filter_spec(&self) -> Result<FilterSpec, FilterError> {
        compute_filter_spec(
            self.filter_scale,
            self.dx_min,
            self.filter_shape,
            self.transition_width,
            self.ndim,
            self.n_steps,
        )
    }
}

/// A diffusion-based spatial filter bound to one grid.
///
/// The filter only borrows its grid variables; they must outlive it.
pub struct Filter<'a> {
    grid_type: GridType,
    filter_spec: FilterSpec,
    laplacian: Box<dyn Laplacian + 'a>,
}

impl<'a> Filter<'a> {
    pub fn new(
        grid_type: GridType,
        grid_vars: &GridVars<'a>,
        args: &FilterArgs,
    ) -> Result<Filter<'a>, FilterError> {
        let laplacian = grid_type.laplacian(grid_vars)?;
        Filter::from_laplacian(grid_type, laplacian, args)
    }

    /// Builds a filter around an already constructed operator, e.g. a
    /// tripolar U-grid Laplacian with an inverted fold.
    pub fn from_laplacian(
        grid_type: GridType,
        laplacian: Box<dyn Laplacian + 'a>,
        args: &FilterArgs,
    ) -> Result<Filter<'a>, FilterError> {
        let filter_spec = args.filter_spec()?;
        info!(
            "{} filter on a {} grid: filter_scale = {}, dx_min = {}, {} steps ({} laplacian, {} biharmonic)",
            match args.filter_shape {
                FilterShape::Gaussian => "gaussian",
                FilterShape::Taper => "taper",
            },
            grid_type,
            args.filter_scale,
            args.dx_min,
            filter_spec.n_steps(),
            filter_spec.n_lap_steps,
            filter_spec.n_bih_steps
        );
        Ok(Filter {
            grid_type,
            filter_spec,
            laplacian,
        })
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter_spec
    }

    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    fn check_dim(&self, dim: FieldDim) -> Result<(), FilterError> {
        match self.laplacian.dim() {
            Some(grid_dim) if grid_dim != dim => Err(FilterError::Dimension(format!(
                "field is {} x {} but the grid variables are {} x {}",
                dim.size_y, dim.size_x, grid_dim.size_y, grid_dim.size_x
            ))),
            _ => Ok(()),
        }
    }

    /// Filters a single 2D field.
    pub fn apply_2d(&self, field: &Field) -> Result<Field, FilterError> {
        let dim = field.dim();
        self.check_dim(dim)?;
        let mut out = field.clone();
        let mut wrk = GhostedField::new(dim);
        let mut lap = Field::new(dim);
        let mut lap2 = Field::new(dim);

        // f <- f + (1 / s) lap(f)
        for &s_l in &self.filter_spec.s_l {
            self.laplacian.apply(&out, &mut wrk, &mut lap);
            out.axpy((1.0 / s_l) as Float, &lap);
        }

        // f <- f + (2 re(s) / |s|^2) lap(f) + (1 / |s|^2) lap(lap(f))
        for s_b in &self.filter_spec.s_b {
            let norm2 = s_b.norm_sqr();
            self.laplacian.apply(&out, &mut wrk, &mut lap);
            self.laplacian.apply(&lap, &mut wrk, &mut lap2);
            out.axpy((2.0 * s_b.re / norm2) as Float, &lap);
            out.axpy((1.0 / norm2) as Float, &lap2);
        }
        Ok(out)
    }

    /// Filters `field` over the two axes named in `dims` (y first, then x).
    /// All other axes are batch axes; their slices are filtered in parallel.
    pub fn apply(&self, field: &NamedArray, dims: &[&str]) -> Result<NamedArray, FilterError> {
        let (axis_y, axis_x) = field.spatial_axes(dims)?;
        self.check_dim(FieldDim {
            size_x: field.shape()[axis_x],
            size_y: field.shape()[axis_y],
        })?;

        let filtered = field
            .slice_offsets(axis_y, axis_x)
            .into_par_iter()
            .map(|offset| {
                let slice = field.gather(offset, axis_y, axis_x)?;
                Ok((offset, self.apply_2d(&slice)?))
            })
            .collect::<Result<Vec<(usize, Field)>, FilterError>>()?;

        let mut out = field.clone();
        for (offset, slice) in &filtered {
            out.scatter(*offset, axis_y, axis_x, slice);
        }
        Ok(out)
    }
}
