use anyhow::Result;
use gcm_filters_rs::{run, Config};
use std::env;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // config path is the first argument, config.toml otherwise
    let cfg = match env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::new()?,
    };
    run(cfg)
}
