use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context, Result};
use log::info;

pub mod error;
pub mod filter;
pub mod flds;
pub mod kernels;
pub mod save;

pub use crate::error::FilterError;
pub use crate::filter::spec::{FilterShape, FilterSpec};
pub use crate::filter::{Filter, FilterArgs};
pub use crate::flds::field::{Field, FieldDim, Pos};
pub use crate::flds::named::NamedArray;
pub use crate::kernels::{GridType, GridVars};

// We use a type alias for f64/Float to easily support
// double and single precision. The filter solver always runs in f64,
// only the field data follows this alias.
#[cfg(feature = "dprec")]
pub type Float = f64;

#[cfg(not(feature = "dprec"))]
pub type Float = f32;

pub const PI: f64 = std::f64::consts::PI;

// Relative tolerance used by the tests.
#[cfg(feature = "dprec")]
pub const E_TOL: Float = 1E-10;

#[cfg(not(feature = "dprec"))]
pub const E_TOL: Float = 1E-4;

#[derive(Deserialize)]
pub struct Config {
    pub filter: FilterParams,
    pub grid: GridParams,
    pub field: FieldParams,
    pub output: Output,
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub filter_scale: f64,
    pub dx_min: f64,
    pub filter_shape: FilterShape,
    #[serde(default = "default_transition_width")]
    pub transition_width: f64,
    #[serde(default = "default_ndim")]
    pub ndim: usize,
    #[serde(default)]
    pub n_steps: Option<usize>,
}

fn default_transition_width() -> f64 {
    PI
}

fn default_ndim() -> usize {
    2
}

#[derive(Deserialize)]
pub struct GridParams {
    pub grid_type: GridType,
    // grid variable name -> path of a .npy file holding it
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct FieldParams {
    pub path: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub filter_dims: Vec<String>,
}

#[derive(Deserialize)]
pub struct Output {
    pub path: String,
}

impl Config {
    pub fn new() -> Result<Config> {
        Config::from_file("config.toml")
    }

    pub fn from_file(path: &str) -> Result<Config> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Could not open {}", path))?;
        toml::from_str(&contents).with_context(|| format!("Could not parse config file {}", path))
    }
}

impl From<&FilterParams> for FilterArgs {
    fn from(params: &FilterParams) -> FilterArgs {
        FilterArgs {
            filter_scale: params.filter_scale,
            dx_min: params.dx_min,
            filter_shape: params.filter_shape,
            transition_width: params.transition_width,
            ndim: params.ndim,
            n_steps: params.n_steps,
        }
    }
}

pub fn run(cfg: Config) -> Result<()> {
    if cfg.field.filter_dims.len() != 2 {
        return Err(anyhow::Error::msg(
            "filter_dims must name exactly two axes (y, x)",
        ));
    }
    let n_values: usize = cfg.field.shape.iter().product();
    info!("loading field from {}", cfg.field.path);
    let data = save::load_npy(&cfg.field.path, n_values)?;
    let field = NamedArray::new(cfg.field.dims.clone(), cfg.field.shape.clone(), data)
        .context("Field description in config does not match the data")?;

    let filter_dims = [
        cfg.field.filter_dims[0].as_str(),
        cfg.field.filter_dims[1].as_str(),
    ];
    let (axis_y, axis_x) = field
        .spatial_axes(&filter_dims)
        .context("Could not locate the filter dimensions")?;
    let size_y = field.shape()[axis_y];
    let size_x = field.shape()[axis_x];

    // The grid variables are owned here and only lent to the filter.
    let mut owned_vars: BTreeMap<String, Field> = BTreeMap::new();
    for (name, path) in &cfg.grid.vars {
        info!("loading grid variable {} from {}", name, path);
        let values = save::load_npy(path, size_y * size_x)?;
        let fld = Field::from_vec(size_y, size_x, values)
            .with_context(|| format!("Grid variable {} has the wrong size", name))?;
        owned_vars.insert(name.clone(), fld);
    }
    let grid_vars: GridVars = owned_vars
        .iter()
        .map(|(name, fld)| (name.as_str(), fld))
        .collect();

    let args = FilterArgs::from(&cfg.filter);
    let filter = Filter::new(cfg.grid.grid_type, &grid_vars, &args)
        .context("Could not construct the filter")?;

    info!("applying filter to {} slices", field.n_slices(axis_y, axis_x));
    let filtered = filter
        .apply(&field, &filter_dims)
        .context("Filtering failed")?;

    save::save_npy(&cfg.output.path, &filtered)?;
    info!("wrote filtered field to {}", cfg.output.path);
    Ok(())
}

#[cfg(test)]
pub(crate) fn build_test_field(size_y: usize, size_x: usize) -> Field {
    // deterministic, non-trivial values; no rng needed for unit tests
    let values = (0..size_y * size_x)
        .map(|ind| {
            let row = (ind / size_x) as Float;
            let col = (ind % size_x) as Float;
            (0.3 * row).sin() + (0.7 * col).cos() + 0.01 * (ind % 7) as Float
        })
        .collect();
    Field::from_vec(size_y, size_x, values).unwrap()
}
