//! Discrete Laplacians for the supported grid topologies.
//!
//! Every operator maps a 2D field to a field of the same shape. Operators
//! built from grid variables only borrow them; callers keep ownership and
//! must not change them while a filter is alive.

use crate::flds::field::{Field, FieldDim, Pos};
use crate::flds::ghosts::{Boundary, GhostedField};
use crate::{FilterError, Float};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

pub mod cartesian;
pub mod tripolar;

pub use cartesian::{
    CartesianLaplacian, CartesianLaplacianWithLandMask, IrregularCartesianLaplacianWithLandMask,
};
pub use tripolar::{PopTripolarLaplacianTGrid, PopTripolarLaplacianUGrid};

/// Named 2D grid variables (wet mask, metrics, ...) lent to a filter.
pub type GridVars<'a> = BTreeMap<&'a str, &'a Field>;

pub trait Laplacian: Send + Sync {
    /// Writes the discrete Laplacian of `field` into `out`, using `wrk` as
    /// scratch space for the ghost exchange.
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field);

    /// The spatial shape the operator is bound to, if it has one.
    fn dim(&self) -> Option<FieldDim>;
}

/// Operators that are assembled from a fixed set of named grid variables.
pub trait FromGridVars<'a>: Sized {
    const REQUIRED_GRID_VARS: &'static [&'static str];

    /// Assumes the keys of `grid_vars` have already been checked.
    fn from_grid_vars(grid_vars: &GridVars<'a>) -> Result<Self, FilterError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridType {
    Cartesian,
    CartesianWithLand,
    IrregularCartesianWithLand,
    PopSimpleTripolarTGrid,
    PopSimpleTripolarUGrid,
}

impl GridType {
    pub const ALL: [GridType; 5] = [
        GridType::Cartesian,
        GridType::CartesianWithLand,
        GridType::IrregularCartesianWithLand,
        GridType::PopSimpleTripolarTGrid,
        GridType::PopSimpleTripolarUGrid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GridType::Cartesian => "CARTESIAN",
            GridType::CartesianWithLand => "CARTESIAN_WITH_LAND",
            GridType::IrregularCartesianWithLand => "IRREGULAR_CARTESIAN_WITH_LAND",
            GridType::PopSimpleTripolarTGrid => "POP_SIMPLE_TRIPOLAR_T_GRID",
            GridType::PopSimpleTripolarUGrid => "POP_SIMPLE_TRIPOLAR_U_GRID",
        }
    }

    pub fn required_grid_vars(&self) -> &'static [&'static str] {
        match self {
            GridType::Cartesian => CartesianLaplacian::REQUIRED_GRID_VARS,
            GridType::CartesianWithLand => CartesianLaplacianWithLandMask::REQUIRED_GRID_VARS,
            GridType::IrregularCartesianWithLand => {
                IrregularCartesianLaplacianWithLandMask::REQUIRED_GRID_VARS
            }
            GridType::PopSimpleTripolarTGrid => PopTripolarLaplacianTGrid::REQUIRED_GRID_VARS,
            GridType::PopSimpleTripolarUGrid => PopTripolarLaplacianUGrid::REQUIRED_GRID_VARS,
        }
    }

    /// Checks that `grid_vars` holds exactly the variables this grid type
    /// needs, all of the same shape.
    pub fn check_grid_vars(&self, grid_vars: &GridVars) -> Result<(), FilterError> {
        let mut required: Vec<String> = self
            .required_grid_vars()
            .iter()
            .map(|s| s.to_string())
            .collect();
        required.sort();
        let provided: Vec<String> = grid_vars.keys().map(|s| s.to_string()).collect();
        if provided != required {
            return Err(FilterError::GridVarsMismatch {
                grid_type: self.name().to_string(),
                provided,
                required,
            });
        }
        let mut vars = grid_vars.iter();
        if let Some((_, first)) = vars.next() {
            let expected = first.dim();
            for (name, fld) in vars {
                let found = fld.dim();
                if found != expected {
                    return Err(FilterError::GridVarShape {
                        name: name.to_string(),
                        expected: (expected.size_y, expected.size_x),
                        found: (found.size_y, found.size_x),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validates `grid_vars` and builds the matching Laplacian.
    pub fn laplacian<'a>(
        &self,
        grid_vars: &GridVars<'a>,
    ) -> Result<Box<dyn Laplacian + 'a>, FilterError> {
        self.check_grid_vars(grid_vars)?;
        let laplacian: Box<dyn Laplacian + 'a> = match self {
            GridType::Cartesian => Box::new(CartesianLaplacian::from_grid_vars(grid_vars)?),
            GridType::CartesianWithLand => {
                Box::new(CartesianLaplacianWithLandMask::from_grid_vars(grid_vars)?)
            }
            GridType::IrregularCartesianWithLand => {
                Box::new(IrregularCartesianLaplacianWithLandMask::from_grid_vars(grid_vars)?)
            }
            GridType::PopSimpleTripolarTGrid => {
                Box::new(PopTripolarLaplacianTGrid::from_grid_vars(grid_vars)?)
            }
            GridType::PopSimpleTripolarUGrid => {
                Box::new(PopTripolarLaplacianUGrid::from_grid_vars(grid_vars)?)
            }
        };
        Ok(laplacian)
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn grid_var<'a>(grid_vars: &GridVars<'a>, name: &str) -> Result<&'a Field, FilterError> {
    grid_vars
        .get(name)
        .copied()
        .ok_or_else(|| FilterError::InvalidParameter(format!("missing grid variable `{}`", name)))
}

/// Number of wet neighbours of every cell, computed on the ghosted mask.
pub(crate) fn wet_neighbours(wet_mask: &Field, boundary: &Boundary) -> Vec<Float> {
    let dim = wet_mask.dim();
    let mut g = GhostedField::new(dim);
    g.load(wet_mask, None, &boundary.scalar());
    let stride = g.stride();
    let mut wet_fac = Vec::with_capacity(dim.len());
    for row in 0..dim.size_y {
        for col in 0..dim.size_x {
            let ig = g.interior_index(Pos { row, col });
            let s = &g.spatial;
            wet_fac.push(s[ig - 1] + s[ig + 1] + s[ig - stride] + s[ig + stride]);
        }
    }
    wet_fac
}
