#![allow(dead_code)]

use gcm_filters_rs::{Field, FieldDim, FilterArgs, FilterShape, Float, GridType, GridVars, Pos};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Uniform;
use std::collections::BTreeMap;

pub const NY: usize = 64;
pub const NX: usize = 128;

pub fn dim(size_y: usize, size_x: usize) -> FieldDim {
    FieldDim { size_x, size_y }
}

/// Uniform random values in [0, 1), reproducible from `seed`.
pub fn random_field(size_y: usize, size_x: usize, seed: u64) -> Field {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..size_y * size_x).map(|_| rng.gen::<Float>()).collect();
    Field::from_vec(size_y, size_x, values).unwrap()
}

/// Random metric values in [0.9, 1.1].
pub fn random_metric(size_y: usize, size_x: usize, seed: u64) -> Field {
    let rng = StdRng::seed_from_u64(seed);
    let values = rng
        .sample_iter(Uniform::new_inclusive(0.9, 1.1))
        .take(size_y * size_x)
        .collect();
    Field::from_vec(size_y, size_x, values).unwrap()
}

/// All wet except the south-west quarter.
pub fn land_mask(size_y: usize, size_x: usize) -> Field {
    let mut mask = Field::filled(dim(size_y, size_x), 1.0);
    for row in 0..size_y / 2 {
        for col in 0..size_x / 2 {
            mask.set(Pos { row, col }, 0.0);
        }
    }
    mask
}

/// `land_mask` plus a closed southern row (Antarctica).
pub fn tripolar_mask(size_y: usize, size_x: usize) -> Field {
    let mut mask = land_mask(size_y, size_x);
    for col in 0..size_x {
        mask.set(Pos { row: 0, col }, 0.0);
    }
    mask
}

/// Makes the top row of a U-point field consistent with the tripolar fold:
/// its western half mirrors the eastern half, shifted by one cell, and the
/// two Arctic singularities are put on land.
pub fn fold_northern_boundary(fld: &mut Field, invert: bool) {
    let FieldDim { size_x, size_y } = fld.dim();
    let top = size_y - 1;
    let row: Vec<Float> = (0..size_x).map(|col| fld.get(Pos { row: top, col })).collect();
    let sign = if invert { -1.0 } else { 1.0 };
    for col in 0..size_x / 2 {
        let src = size_x - 1 - (col + 1) % size_x;
        fld.set(Pos { row: top, col }, sign * row[src]);
    }
    fld.set(Pos { row: top, col: size_x / 2 - 1 }, 0.0);
    fld.set(Pos { row: top, col: size_x - 1 }, 0.0);
}

/// Owns the grid variables for one grid type so filters can borrow them.
pub struct Grid {
    pub grid_type: GridType,
    pub vars: BTreeMap<&'static str, Field>,
    /// Input data prepared for this grid (folded on U-grids).
    pub data: Field,
}

impl Grid {
    pub fn new(grid_type: GridType, size_y: usize, size_x: usize, seed: u64) -> Grid {
        let mut data = random_field(size_y, size_x, seed);
        let mut vars = BTreeMap::new();
        match grid_type {
            GridType::Cartesian => {}
            GridType::CartesianWithLand => {
                vars.insert("wet_mask", land_mask(size_y, size_x));
            }
            GridType::IrregularCartesianWithLand => {
                vars.insert("wet_mask", land_mask(size_y, size_x));
                let ones = Field::filled(dim(size_y, size_x), 1.0);
                for &name in ["dxw", "dyw", "dxs", "dys", "area"].iter() {
                    vars.insert(name, ones.clone());
                }
            }
            GridType::PopSimpleTripolarTGrid => {
                vars.insert("wet_mask", tripolar_mask(size_y, size_x));
            }
            GridType::PopSimpleTripolarUGrid => {
                fold_northern_boundary(&mut data, false);
                let mut mask = tripolar_mask(size_y, size_x);
                fold_northern_boundary(&mut mask, false);
                vars.insert("wet_mask", mask);
            }
        }
        Grid {
            grid_type,
            vars,
            data,
        }
    }

    pub fn grid_vars(&self) -> GridVars {
        self.vars.iter().map(|(&name, fld)| (name, fld)).collect()
    }

    pub fn wet_mask(&self) -> Option<&Field> {
        self.vars.get("wet_mask")
    }
}

/// TAPER filter of scale 2 with a fixed ten step polynomial.
pub fn taper_args() -> FilterArgs {
    FilterArgs::new(2.0, 1.0, FilterShape::Taper).n_steps(10)
}

pub fn assert_rel_close(a: Float, b: Float, rel: Float) {
    assert!(
        (a - b).abs() <= rel * b.abs().max(1.0),
        "{} and {} differ by more than {} relative",
        a,
        b,
        rel
    );
}
