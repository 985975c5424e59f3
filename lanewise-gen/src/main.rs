//! lanewise-gen binary.
//!
//! Writes `kernels.rs`, `api.rs` and `arrays.rs` into the working directory.
//! Tiers come from `LANEWISE_TIERS`; log verbosity from `RUST_LOG`.

use std::path::Path;

use clap::Parser;
use lanewise_gen::{generate_into, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "lanewise-gen", version, about = "Generate lanewise elementwise kernels")]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = GeneratorConfig::from_env().and_then(|config| generate_into(Path::new("."), &config));
    if let Err(e) = result {
        log::error!("{e}");
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            log::error!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
