use crate::flds::field::Field;
use crate::{FilterError, Float};
use itertools::Itertools;

/// A rectangular, row-major array whose axes carry names, e.g.
/// `["time", "y", "x"]`. This is all the filter needs from a labelled
/// array library.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedArray {
    dims: Vec<String>,
    shape: Vec<usize>,
    pub data: Vec<Float>,
}

impl NamedArray {
    pub fn new(dims: Vec<String>, shape: Vec<usize>, data: Vec<Float>) -> Result<NamedArray, FilterError> {
        if dims.len() != shape.len() {
            return Err(FilterError::Dimension(format!(
                "{} dimension names given for an array with {} axes",
                dims.len(),
                shape.len()
            )));
        }
        if dims.iter().unique().count() != dims.len() {
            return Err(FilterError::Dimension(format!(
                "dimension names must be unique, got {:?}",
                dims
            )));
        }
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(FilterError::Dimension(format!(
                "array of shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(NamedArray { dims, shape, data })
    }

    /// Wraps a single 2D field with the given axis names (rows, columns).
    pub fn from_field(field: &Field, dim_y: &str, dim_x: &str) -> Result<NamedArray, FilterError> {
        let dim = field.dim();
        NamedArray::new(
            vec![dim_y.to_string(), dim_x.to_string()],
            vec![dim.size_y, dim.size_x],
            field.spatial.clone(),
        )
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn axis(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == name)
    }

    pub fn sum(&self) -> Float {
        self.data.iter().sum()
    }

    pub fn sum_of_squares(&self) -> Float {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Resolves the two filter dimensions (y first, then x) to axis indices.
    pub fn spatial_axes(&self, dims: &[&str]) -> Result<(usize, usize), FilterError> {
        if dims.len() != 2 {
            return Err(FilterError::Dimension(format!(
                "filtering needs exactly two dimensions, got {:?}",
                dims
            )));
        }
        let find = |name: &str| {
            self.axis(name).ok_or_else(|| {
                FilterError::Dimension(format!(
                    "dimension `{}` not found in {:?}",
                    name, self.dims
                ))
            })
        };
        let axis_y = find(dims[0])?;
        let axis_x = find(dims[1])?;
        if axis_y == axis_x {
            return Err(FilterError::Dimension(format!(
                "filter dimensions must differ, got {:?}",
                dims
            )));
        }
        Ok((axis_y, axis_x))
    }

    fn strides(&self) -> Vec<usize> {
        let mut strides = vec![1; self.shape.len()];
        for ax in (0..self.shape.len().saturating_sub(1)).rev() {
            strides[ax] = strides[ax + 1] * self.shape[ax + 1];
        }
        strides
    }

    pub fn n_slices(&self, axis_y: usize, axis_x: usize) -> usize {
        self.shape
            .iter()
            .enumerate()
            .filter(|&(ax, _)| ax != axis_y && ax != axis_x)
            .map(|(_, &n)| n)
            .product()
    }

    /// Offsets into `data` of the first element of every 2D slice spanned by
    /// `axis_y` and `axis_x`, one per combination of the remaining axes.
    pub fn slice_offsets(&self, axis_y: usize, axis_x: usize) -> Vec<usize> {
        let strides = self.strides();
        let batch_axes: Vec<usize> = (0..self.shape.len())
            .filter(|&ax| ax != axis_y && ax != axis_x)
            .collect();
        if batch_axes.is_empty() {
            return vec![0];
        }
        batch_axes
            .iter()
            .map(|&ax| 0..self.shape[ax])
            .multi_cartesian_product()
            .map(|index| {
                index
                    .iter()
                    .zip(&batch_axes)
                    .map(|(i, &ax)| i * strides[ax])
                    .sum()
            })
            .collect()
    }

    /// Copies one 2D slice out into a contiguous field.
    pub fn gather(&self, offset: usize, axis_y: usize, axis_x: usize) -> Result<Field, FilterError> {
        let strides = self.strides();
        let (size_y, size_x) = (self.shape[axis_y], self.shape[axis_x]);
        let (stride_y, stride_x) = (strides[axis_y], strides[axis_x]);
        let mut spatial = Vec::with_capacity(size_y * size_x);
        for iy in 0..size_y {
            let row = offset + iy * stride_y;
            spatial.extend((0..size_x).map(|ix| self.data[row + ix * stride_x]));
        }
        Field::from_vec(size_y, size_x, spatial)
    }

    /// Writes a 2D field back into the slice starting at `offset`.
    pub fn scatter(&mut self, offset: usize, axis_y: usize, axis_x: usize, fld: &Field) {
        let strides = self.strides();
        let (stride_y, stride_x) = (strides[axis_y], strides[axis_x]);
        let dim = fld.dim();
        if !cfg!(feature = "unchecked") {
            assert_eq!(dim.size_y, self.shape[axis_y]);
            assert_eq!(dim.size_x, self.shape[axis_x]);
        }
        for iy in 0..dim.size_y {
            let row = offset + iy * stride_y;
            for ix in 0..dim.size_x {
                self.data[row + ix * stride_x] = fld.spatial[iy * dim.size_x + ix];
            }
        }
    }
}
