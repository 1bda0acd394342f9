use crate::flds::field::{Field, FieldDim, Pos};
use crate::Float;
use itertools::izip;

/// What a stencil sees past the northern edge of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NorthEdge {
    Periodic,
    Closed,
    /// Tripolar fold through T-points: (ny-1, i) neighbours (ny-1, nx-1-i).
    TFold,
    /// Tripolar fold through U-points: (ny-1, i) neighbours
    /// (ny-2, (nx-2-i) mod nx). Vector components may flip sign across it.
    UFold { invert: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SouthEdge {
    Periodic,
    Closed,
}

/// Grid topology as seen by the ghost exchange. East-west is always periodic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Boundary {
    pub north: NorthEdge,
    pub south: SouthEdge,
}

impl Boundary {
    pub const PERIODIC: Boundary = Boundary {
        north: NorthEdge::Periodic,
        south: SouthEdge::Periodic,
    };

    pub const TRIPOLAR_T: Boundary = Boundary {
        north: NorthEdge::TFold,
        south: SouthEdge::Closed,
    };

    pub const fn tripolar_u(invert: bool) -> Boundary {
        Boundary {
            north: NorthEdge::UFold { invert },
            south: SouthEdge::Closed,
        }
    }

    /// The same topology without any sign flip; masks are scalars.
    pub fn scalar(&self) -> Boundary {
        match self.north {
            NorthEdge::UFold { .. } => Boundary::tripolar_u(false),
            _ => *self,
        }
    }
}

/// A copy of a field surrounded by one ring of ghost cells.
pub struct GhostedField {
    pub spatial: Vec<Float>,
    with_ghost_dim: FieldDim,
    no_ghost_dim: FieldDim,
}

impl GhostedField {
    pub fn new(dim: FieldDim) -> GhostedField {
        let with_ghost_dim = FieldDim {
            size_x: dim.size_x + 2,
            size_y: dim.size_y + 2,
        };
        GhostedField {
            spatial: vec![0.0; with_ghost_dim.len()],
            with_ghost_dim,
            no_ghost_dim: dim,
        }
    }

    #[inline(always)]
    pub fn no_ghost_dim(&self) -> FieldDim {
        self.no_ghost_dim
    }

    /// Distance in `spatial` between vertically adjacent cells.
    #[inline(always)]
    pub fn stride(&self) -> usize {
        self.with_ghost_dim.size_x
    }

    #[inline(always)]
    pub fn interior_index(&self, pos: Pos) -> usize {
        self.with_ghost_dim.get_index(Pos {
            row: pos.row + 1,
            col: pos.col + 1,
        })
    }

    /// Copies `fld`, optionally multiplied by `weight`, into the interior and
    /// refreshes the ghost cells. NaNs are read as zero.
    pub fn load(&mut self, fld: &Field, weight: Option<&Field>, boundary: &Boundary) {
        let dim = fld.dim();
        if dim != self.no_ghost_dim {
            *self = GhostedField::new(dim);
        }
        if !cfg!(feature = "unchecked") {
            if let Some(w) = weight {
                assert_eq!(w.dim(), dim);
            }
        }
        let size_x = dim.size_x;
        for iy in 0..dim.size_y {
            let ij = iy * size_x;
            let ij_ghosts = self.interior_index(Pos { row: iy, col: 0 });
            let row_out = &mut self.spatial[ij_ghosts..ij_ghosts + size_x];
            let row_in = &fld.spatial[ij..ij + size_x];
            match weight {
                Some(w) => {
                    for (out, &v, &wv) in izip!(row_out, row_in, &w.spatial[ij..ij + size_x]) {
                        *out = if v.is_nan() { 0.0 } else { wv * v };
                    }
                }
                None => {
                    for (out, &v) in row_out.iter_mut().zip(row_in) {
                        *out = if v.is_nan() { 0.0 } else { v };
                    }
                }
            }
        }
        self.update_ghosts(boundary);
    }

    pub fn update_ghosts(&mut self, boundary: &Boundary) {
        let size_x = self.no_ghost_dim.size_x;
        let size_y = self.no_ghost_dim.size_y;
        if !cfg!(feature = "unchecked") {
            assert_eq!(self.spatial.len(), (size_x + 2) * (size_y + 2));
        }
        if size_x == 0 || size_y == 0 {
            return;
        }
        let dim = self.with_ghost_dim;
        let fld = &mut self.spatial;

        // copy into left ghost column from right real column and
        // into right ghost column from left real column
        for row in 1..=size_y {
            let ghost_left = dim.get_index(Pos { row, col: 0 });
            fld[ghost_left] = fld[ghost_left + size_x];
            fld[ghost_left + size_x + 1] = fld[ghost_left + 1];
        }

        // bottom ghost row
        let ghost_start = dim.get_index(Pos { row: 0, col: 1 });
        match boundary.south {
            SouthEdge::Periodic => {
                let real_start = dim.get_index(Pos {
                    row: size_y,
                    col: 1,
                });
                fld.copy_within(real_start..real_start + size_x, ghost_start);
            }
            SouthEdge::Closed => {
                for v in &mut fld[ghost_start..ghost_start + size_x] {
                    *v = 0.0;
                }
            }
        }

        // top ghost row
        let ghost_start = dim.get_index(Pos {
            row: size_y + 1,
            col: 1,
        });
        match boundary.north {
            NorthEdge::Periodic => {
                let real_start = dim.get_index(Pos { row: 1, col: 1 });
                fld.copy_within(real_start..real_start + size_x, ghost_start);
            }
            NorthEdge::Closed => {
                for v in &mut fld[ghost_start..ghost_start + size_x] {
                    *v = 0.0;
                }
            }
            NorthEdge::TFold => {
                // mirror of the top real row
                let real_start = dim.get_index(Pos {
                    row: size_y,
                    col: 1,
                });
                for i in 0..size_x {
                    fld[ghost_start + i] = fld[real_start + size_x - 1 - i];
                }
            }
            NorthEdge::UFold { invert } => {
                // mirror of the second row from the top, shifted one cell west
                if !cfg!(feature = "unchecked") {
                    assert!(size_y >= 2);
                }
                let sign: Float = if invert { -1.0 } else { 1.0 };
                let real_start = dim.get_index(Pos {
                    row: size_y - 1,
                    col: 1,
                });
                for i in 0..size_x {
                    let src = (2 * size_x - 2 - i) % size_x;
                    fld[ghost_start + i] = sign * fld[real_start + src];
                }
            }
        }
        // the corners are never read by the five-point stencils
    }
}
