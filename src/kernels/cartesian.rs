use crate::flds::field::{Field, FieldDim, Pos};
use crate::flds::ghosts::{Boundary, GhostedField};
use crate::kernels::{grid_var, wet_neighbours, FromGridVars, GridVars, Laplacian};
use crate::{FilterError, Float};
use itertools::izip;

/// Five-point Laplacian on a doubly periodic regular grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct CartesianLaplacian;

impl<'a> FromGridVars<'a> for CartesianLaplacian {
    const REQUIRED_GRID_VARS: &'static [&'static str] = &[];

    fn from_grid_vars(_grid_vars: &GridVars<'a>) -> Result<Self, FilterError> {
        Ok(CartesianLaplacian)
    }
}

impl Laplacian for CartesianLaplacian {
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(field.dim(), out.dim());
        }
        wrk.load(field, None, &Boundary::PERIODIC);
        let dim = field.dim();
        let stride = wrk.stride();
        let g = &wrk.spatial;
        for row in 0..dim.size_y {
            let mut ig = wrk.interior_index(Pos { row, col: 0 });
            let start = row * dim.size_x;
            for v in &mut out.spatial[start..start + dim.size_x] {
                *v = g[ig - 1] + g[ig + 1] + g[ig - stride] + g[ig + stride] - 4.0 * g[ig];
                ig += 1;
            }
        }
    }

    fn dim(&self) -> Option<FieldDim> {
        None
    }
}

/// Masked five-point stencil shared by the land-aware regular grids.
///
/// With `g = wet_mask * field` the output is
/// `wet_mask * (sum of the four ghosted neighbours of g - n_wet * g)`,
/// where `n_wet` counts the wet neighbours. Fluxes into land vanish so the
/// wet sum is conserved whenever the neighbour relation is symmetric.
pub(crate) struct MaskedFivePoint<'a> {
    wet_mask: &'a Field,
    wet_fac: Vec<Float>,
    boundary: Boundary,
}

impl<'a> MaskedFivePoint<'a> {
    pub(crate) fn new(wet_mask: &'a Field, boundary: Boundary) -> MaskedFivePoint<'a> {
        MaskedFivePoint {
            wet_mask,
            wet_fac: wet_neighbours(wet_mask, &boundary),
            boundary,
        }
    }

    pub(crate) fn dim(&self) -> FieldDim {
        self.wet_mask.dim()
    }

    pub(crate) fn wet_mask(&self) -> &'a Field {
        self.wet_mask
    }

    pub(crate) fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        let dim = self.dim();
        if !cfg!(feature = "unchecked") {
            assert_eq!(field.dim(), dim);
            assert_eq!(out.dim(), dim);
        }
        wrk.load(field, Some(self.wet_mask), &self.boundary);
        let stride = wrk.stride();
        let g = &wrk.spatial;
        for row in 0..dim.size_y {
            let mut ig = wrk.interior_index(Pos { row, col: 0 });
            let start = row * dim.size_x;
            let end = start + dim.size_x;
            for (v, &w, &fac) in izip!(
                &mut out.spatial[start..end],
                &self.wet_mask.spatial[start..end],
                &self.wet_fac[start..end]
            ) {
                *v = w * (g[ig - 1] + g[ig + 1] + g[ig - stride] + g[ig + stride] - fac * g[ig]);
                ig += 1;
            }
        }
    }
}

/// Doubly periodic regular grid with land cells removed from the domain.
pub struct CartesianLaplacianWithLandMask<'a> {
    stencil: MaskedFivePoint<'a>,
}

impl<'a> FromGridVars<'a> for CartesianLaplacianWithLandMask<'a> {
    const REQUIRED_GRID_VARS: &'static [&'static str] = &["wet_mask"];

    fn from_grid_vars(grid_vars: &GridVars<'a>) -> Result<Self, FilterError> {
        let wet_mask = grid_var(grid_vars, "wet_mask")?;
        Ok(CartesianLaplacianWithLandMask {
            stencil: MaskedFivePoint::new(wet_mask, Boundary::PERIODIC),
        })
    }
}

impl<'a> Laplacian for CartesianLaplacianWithLandMask<'a> {
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        self.stencil.apply(field, wrk, out);
    }

    fn dim(&self) -> Option<FieldDim> {
        Some(self.stencil.dim())
    }
}

/// Flux-form Laplacian on a doubly periodic grid with non-uniform metrics.
///
/// `dxw`, `dyw` belong to the face east of a cell, `dxs`, `dys` to the face
/// north of it. Face coefficients vanish unless both cells are wet, and the
/// divergence is divided by the cell area. The area weighted sum
/// `sum(area * field)` over wet cells is conserved.
pub struct IrregularCartesianLaplacianWithLandMask<'a> {
    wet_mask: &'a Field,
    area: &'a Field,
    // face coefficients, ghosted so the west and south faces are one lookup away
    x_coef: GhostedField,
    y_coef: GhostedField,
}

impl<'a> FromGridVars<'a> for IrregularCartesianLaplacianWithLandMask<'a> {
    const REQUIRED_GRID_VARS: &'static [&'static str] =
        &["wet_mask", "dxw", "dyw", "dxs", "dys", "area"];

    fn from_grid_vars(grid_vars: &GridVars<'a>) -> Result<Self, FilterError> {
        let wet_mask = grid_var(grid_vars, "wet_mask")?;
        let dxw = grid_var(grid_vars, "dxw")?;
        let dyw = grid_var(grid_vars, "dyw")?;
        let dxs = grid_var(grid_vars, "dxs")?;
        let dys = grid_var(grid_vars, "dys")?;
        let area = grid_var(grid_vars, "area")?;
        let dim = wet_mask.dim();

        let mut x_coef = Field::new(dim);
        let mut y_coef = Field::new(dim);
        for row in 0..dim.size_y {
            for col in 0..dim.size_x {
                let c = Pos { row, col };
                let w_c = wet_mask.get(c);
                if w_c == 0.0 {
                    continue;
                }
                if !(area.get(c) > 0.0) {
                    return Err(FilterError::InvalidParameter(format!(
                        "wet cell {:?} has non-positive area {}",
                        c,
                        area.get(c)
                    )));
                }
                let east = Pos {
                    row,
                    col: (col + 1) % dim.size_x,
                };
                let north = Pos {
                    row: (row + 1) % dim.size_y,
                    col,
                };
                let w_e = wet_mask.get(east);
                if w_e != 0.0 {
                    x_coef.set(c, w_c * w_e * face_ratio("dyw/dxw", c, dyw.get(c), dxw.get(c))?);
                }
                let w_n = wet_mask.get(north);
                if w_n != 0.0 {
                    y_coef.set(c, w_c * w_n * face_ratio("dxs/dys", c, dxs.get(c), dys.get(c))?);
                }
            }
        }

        let mut x_ghosted = GhostedField::new(dim);
        x_ghosted.load(&x_coef, None, &Boundary::PERIODIC);
        let mut y_ghosted = GhostedField::new(dim);
        y_ghosted.load(&y_coef, None, &Boundary::PERIODIC);

        Ok(IrregularCartesianLaplacianWithLandMask {
            wet_mask,
            area,
            x_coef: x_ghosted,
            y_coef: y_ghosted,
        })
    }
}

fn face_ratio(what: &str, pos: Pos, num: Float, den: Float) -> Result<Float, FilterError> {
    if !(den > 0.0) || !num.is_finite() {
        return Err(FilterError::InvalidParameter(format!(
            "bad metric {} = {} / {} at wet face of cell {:?}",
            what, num, den, pos
        )));
    }
    Ok(num / den)
}

impl<'a> Laplacian for IrregularCartesianLaplacianWithLandMask<'a> {
    fn apply(&self, field: &Field, wrk: &mut GhostedField, out: &mut Field) {
        let dim = self.wet_mask.dim();
        if !cfg!(feature = "unchecked") {
            assert_eq!(field.dim(), dim);
            assert_eq!(out.dim(), dim);
        }
        wrk.load(field, Some(self.wet_mask), &Boundary::PERIODIC);
        let stride = wrk.stride();
        let g = &wrk.spatial;
        let xc = &self.x_coef.spatial;
        let yc = &self.y_coef.spatial;
        for row in 0..dim.size_y {
            let mut ig = wrk.interior_index(Pos { row, col: 0 });
            for col in 0..dim.size_x {
                let ind = row * dim.size_x + col;
                out.spatial[ind] = if self.wet_mask.spatial[ind] == 0.0 {
                    0.0
                } else {
                    let div = xc[ig] * (g[ig + 1] - g[ig]) - xc[ig - 1] * (g[ig] - g[ig - 1])
                        + yc[ig] * (g[ig + stride] - g[ig])
                        - yc[ig - stride] * (g[ig] - g[ig - stride]);
                    div / self.area.spatial[ind]
                };
                ig += 1;
            }
        }
    }

    fn dim(&self) -> Option<FieldDim> {
        Some(self.wet_mask.dim())
    }
}
