//! lanewise-gen - source generator for lanewise elementwise kernels.
//!
//! The generator walks two static tables, a [`CapabilityMatrix`] saying which
//! tier accelerates which (operation, type) pair and an [`IntrinsicTable`]
//! saying which callable implements each load, compute and store for it, and
//! emits three Rust artifacts that the `lanewise` crate includes:
//!
//! - `kernels.rs` - scalar defaults, tier variants and resolved backends
//! - `api.rs` - the `SimdAdd`/`SimdSub`/`SimdMul`/`SimdDiv` traits and macros
//! - `arrays.rs` - fixed-size array backends
//!
//! # Usage
//!
//! ```no_run
//! use lanewise_gen::{generate, GeneratorConfig};
//!
//! let config = GeneratorConfig::from_env()?.for_target_arch("x86_64");
//! let artifacts = generate(&config)?;
//! assert!(artifacts.implementation.contains("pub unsafe fn add_i32("));
//! # Ok::<(), lanewise_gen::GenError>(())
//! ```

#[macro_use]
pub mod srcgen;

pub mod capability;
pub mod config;
pub mod emit;
pub mod error;
pub mod intrinsics;
pub mod types;

use std::path::Path;

pub use capability::{CapabilityMatrix, CapabilityRow};
pub use config::{GeneratorConfig, TierSet, TIERS_ENV};
pub use emit::Generator;
pub use error::{GenError, GenResult};
pub use intrinsics::{Binding, IntrinsicTable, PointerForm};
pub use srcgen::{Artifacts, OutputSink};
pub use types::{NumericType, Operation, Role, Tier};

/// Generate the artifacts from the shipped x86 tables.
pub fn generate(config: &GeneratorConfig) -> GenResult<Artifacts> {
    let caps = CapabilityMatrix::x86()?;
    let intrinsics = IntrinsicTable::x86();
    Generator::new(&caps, &intrinsics, config).generate()
}

/// Open the sink in `dir`, generate, and commit.
///
/// The three files are opened before generation starts; nothing is written
/// unless generation succeeds.
pub fn generate_into(dir: &Path, config: &GeneratorConfig) -> GenResult<()> {
    let sink = OutputSink::open(dir)?;
    let artifacts = generate(config)?;
    sink.commit(&artifacts)
}
