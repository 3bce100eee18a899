//! Config command — prints the layered configuration

use anyhow::{Context, Result};
use flurry_particles::SimulationConfig;
use std::path::Path;

pub fn run(path: Option<&Path>) -> Result<()> {
    let config = SimulationConfig::load(path).context("Failed to load configuration")?;
    let rendered = config
        .to_toml_string()
        .context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
