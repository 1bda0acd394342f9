use thiserror::Error;

/// Everything that can go wrong while building or applying a filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid filter parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "Provided `grid_vars` {provided:?} do not match the required `grid_vars` {required:?} for grid type {grid_type}"
    )]
    GridVarsMismatch {
        grid_type: String,
        provided: Vec<String>,
        required: Vec<String>,
    },

    #[error("grid variable `{name}` has shape {found:?}, expected {expected:?}")]
    GridVarShape {
        name: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error(
        "adaptive step search gave up after {tried} candidates at n_steps = {n_steps} (limit {max_steps}): rms error {error:.3e} exceeds tolerance {tolerance:.1e}"
    )]
    NonConvergence {
        tried: usize,
        n_steps: usize,
        max_steps: usize,
        error: f64,
        tolerance: f64,
    },

    #[error("numerical failure in filter solver: {0}")]
    Solver(String),

    #[error("dimension error: {0}")]
    Dimension(String),
}
