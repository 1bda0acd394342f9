#[macro_use]
extern crate criterion;

use criterion::{black_box, Criterion};
use gcm_filters_rs::{Field, FieldDim, Filter, FilterArgs, FilterShape, Float, GridType, GridVars, Pos};

const NY: usize = 128;
const NX: usize = 256;

fn test_data() -> (Field, Field) {
    let values = (0..NY * NX)
        .map(|ind| {
            let (row, col) = ((ind / NX) as Float, (ind % NX) as Float);
            (0.11 * row).sin() * (0.07 * col).cos() + 0.1 * (1.3 * (row + col)).sin()
        })
        .collect();
    let data = Field::from_vec(NY, NX, values).unwrap();
    let mut mask = Field::filled(FieldDim { size_x: NX, size_y: NY }, 1.0);
    for row in 0..NY / 2 {
        for col in 0..NX / 2 {
            mask.set(Pos { row, col }, 0.0);
        }
    }
    (data, mask)
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("filter spec taper L=8", |b| {
        let args = FilterArgs::new(8.0, 1.0, FilterShape::Taper);
        b.iter(|| black_box(&args).filter_spec().unwrap())
    });

    let (data, mask) = test_data();
    let mut vars = GridVars::new();
    vars.insert("wet_mask", &mask);
    let args = FilterArgs::new(4.0, 1.0, FilterShape::Gaussian);
    let filter = Filter::new(GridType::PopSimpleTripolarTGrid, &vars, &args).unwrap();
    c.bench_function("tripolar t-grid apply 128x256", |b| {
        b.iter(|| filter.apply_2d(black_box(&data)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
