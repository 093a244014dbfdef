//! Punto de entrada.
//!
//! Este módulo expone la CLI y conecta al driver con la etapa de
//! listado para producir `<OUTPUT_DIR>/<unidad>.asm`.

use anyhow::{self, Context};
use env_logger::Env;
use kabsa::{
    config::{Config, Input, Trace},
    driver::Driver,
    listing,
};

fn main() -> anyhow::Result<()> {
    // Errores de configuración terminan aquí, sin realizar trabajo
    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    let level = if config.trace.is_empty() { "warn" } else { "trace" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut driver = Driver::from_config(&config);
    match &config.input {
        Input::Stdin => driver.parse_stdin(),
        Input::File(path) => driver.parse_file(path),
    }
    .context("Compilation failed")?;

    let ast = driver
        .ast()
        .context("Parsing succeeded without a syntax tree")?;

    if config.trace.contains(Trace::PARSING) {
        log::trace!("Syntax tree: {}", ast);
    }

    let mut output = Vec::new();
    listing::emit(ast, driver.unit_name(), &mut output).context("Failed to emit listing")?;

    let path = driver.write_output(&output)?;
    log::debug!("Artifact committed to {}", path.display());

    Ok(())
}
