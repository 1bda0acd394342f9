use crate::{FilterError, Float};
use itertools::izip;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDim {
    pub size_x: usize,
    pub size_y: usize,
}

/// A 2D scalar field on the grid, stored row-major. Row 0 is the
/// southernmost row and the column index increases eastwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub spatial: Vec<Float>,
    dim: FieldDim,
}

impl FieldDim {
    pub fn get_index(&self, pos: Pos) -> usize {
        // Convenience method to get a position in the array.
        // Using a 1d vec to represent 2D array for speed.
        // Here is the layout if it were a 2d array,
        // with the 1D vec position in []
        // ----------------------------------
        // |   [0]    |   [1]    |   [2]    |
        // |  row: 0  |  row: 0  |  row: 0  |
        // |  col: 0  |  col: 1  |  col: 2  |
        // |          |          |          |
        // ----------------------------------
        // |   [3]    |   [4]    |   [5]    |
        // |  row: 1  |  row: 1  |  row: 1  |
        // |  col: 0  |  col: 1  |  col: 2  |
        // |          |          |          |
        // ----------------------------------
        // |   [6]    |   [7]    |   [8]    |
        // |  row: 2  |  row: 2  |  row: 2  |
        // |  col: 0  |  col: 1  |  col: 2  |
        // |          |          |          |
        // ----------------------------------

        if !cfg!(feature = "unchecked") {
            assert!(pos.col < self.size_x);
            assert!(pos.row < self.size_y);
        }

        pos.row * self.size_x + pos.col
    }

    pub fn len(&self) -> usize {
        self.size_x * self.size_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Field {
    pub fn new(dim: FieldDim) -> Field {
        Field {
            spatial: vec![0.0; dim.len()],
            dim,
        }
    }

    pub fn from_vec(size_y: usize, size_x: usize, spatial: Vec<Float>) -> Result<Field, FilterError> {
        if spatial.len() != size_y * size_x {
            return Err(FilterError::Dimension(format!(
                "{} values cannot fill a {} x {} field",
                spatial.len(),
                size_y,
                size_x
            )));
        }
        Ok(Field {
            spatial,
            dim: FieldDim { size_x, size_y },
        })
    }

    pub fn filled(dim: FieldDim, value: Float) -> Field {
        Field {
            spatial: vec![value; dim.len()],
            dim,
        }
    }

    #[inline(always)]
    pub fn dim(&self) -> FieldDim {
        self.dim
    }

    #[inline(always)]
    pub fn get(&self, pos: Pos) -> Float {
        self.spatial[self.dim.get_index(pos)]
    }

    #[inline(always)]
    pub fn set(&mut self, pos: Pos, value: Float) {
        let ind = self.dim.get_index(pos);
        self.spatial[ind] = value;
    }

    pub fn sum(&self) -> Float {
        self.spatial.iter().sum()
    }

    pub fn sum_of_squares(&self) -> Float {
        self.spatial.iter().map(|v| v * v).sum()
    }

    /// self += a * x
    #[inline(always)]
    pub fn axpy(&mut self, a: Float, x: &Field) {
        if !cfg!(feature = "unchecked") {
            assert_eq!(self.dim, x.dim);
        }
        for (v, xv) in izip!(&mut self.spatial, &x.spatial) {
            *v += a * xv;
        }
    }
}
