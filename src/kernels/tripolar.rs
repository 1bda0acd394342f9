//! Simple tripolar grids: periodic in longitude, closed in the south and
//! folded onto themselves along the northern edge.

use crate::flds::field::{Field, FieldDim};
use crate::flds::ghosts::{Boundary, GhostedField};
use crate::kernels::cartesian::MaskedFivePoint;
use crate::kernels::{grid_var, FromGridVars, GridVars, Laplacian};
use crate::FilterError;

/// Tracer points. The northern neighbour of `(ny-1, i)` is `(ny-1, nx-1-i)`,
/// so the fold is symmetric and wet sums are conserved.
pub struct PopTripolarLaplacianTGrid<'a> {
    stencil: MaskedFivePoint<'a>,
}

impl<'a> FromGridVars<'a> for PopTripolarLaplacianTGrid<'a> {
    const REQUIRED_GRID_VARS: &'static [&'static str] = &["wet_mask"];

    fn from_grid_vars(grid_vars: &GridVars<'a>) -> Result<Self, FilterError> {
        let wet_mask = grid_var(grid_vars, "wet_mask")?;
        Ok(PopTripolarLaplacianTGrid {
            stencil: MaskedFivePoint::new(wet_mask, Boundary::TRIPOLAR_T),
        })
    }
}

impl<'a> Laplacian for PopTripolarLaplacianTGrid<'a> {
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        self.stencil.apply(field, wrk, out);
    }

    fn dim(&self) -> Option<FieldDim> {
        Some(self.stencil.dim())
    }
}

/// Velocity points. The northern neighbour of `(ny-1, i)` is
/// `(ny-2, (nx-2-i) mod nx)`. Values are carried across the fold unchanged
/// unless the operator is built with [`with_inverted_fold`], which flips the
/// sign as vector components require.
///
/// The fold does not pair cells symmetrically, so the wet sum is only
/// approximately conserved on this grid.
///
/// [`with_inverted_fold`]: PopTripolarLaplacianUGrid::with_inverted_fold
pub struct PopTripolarLaplacianUGrid<'a> {
    stencil: MaskedFivePoint<'a>,
}

impl<'a> PopTripolarLaplacianUGrid<'a> {
    pub fn new(wet_mask: &'a Field, invert_fold: bool) -> Result<Self, FilterError> {
        if wet_mask.dim().size_y < 2 {
            return Err(FilterError::Dimension(
                "a U-point tripolar grid needs at least two rows".to_string(),
            ));
        }
        Ok(PopTripolarLaplacianUGrid {
            stencil: MaskedFivePoint::new(wet_mask, Boundary::tripolar_u(invert_fold)),
        })
    }

    pub fn with_inverted_fold(self) -> Self {
        PopTripolarLaplacianUGrid {
            stencil: MaskedFivePoint::new(self.stencil.wet_mask(), Boundary::tripolar_u(true)),
        }
    }
}

impl<'a> FromGridVars<'a> for PopTripolarLaplacianUGrid<'a> {
    const REQUIRED_GRID_VARS: &'static [&'static str] = &["wet_mask"];

    fn from_grid_vars(grid_vars: &GridVars<'a>) -> Result<Self, FilterError> {
        PopTripolarLaplacianUGrid::new(grid_var(grid_vars, "wet_mask")?, false)
    }
}

impl<'a> Laplacian for PopTripolarLaplacianUGrid<'a> {
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        self.stencil.apply(field, wrk, out);
    }

    fn dim(&self) -> Option<FieldDim> {
        Some(self.stencil.dim())
    }
}
