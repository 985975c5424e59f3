// build.rs
//
// Runs lanewise-gen into OUT_DIR and tells rustc which tier guards to define. A tier's guard
// is set when LANEWISE_TIERS requests it (all tiers by default) and the tier exists on the
// target architecture; the generator emits variants for exactly the same set, so every
// `#[cfg(lanewise_<tier>)]` item in the output is either compiled in or absent together with
// its entry in the variant lists.

use std::env;
use std::path::PathBuf;

use lanewise_gen::{generate_into, GeneratorConfig, Tier, TIERS_ENV};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={TIERS_ENV}");

    for tier in Tier::ALL {
        println!("cargo:rustc-check-cfg=cfg({})", tier.meta().guard);
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    let arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap();

    let config = match GeneratorConfig::from_env() {
        Ok(config) => config.for_target_arch(&arch),
        Err(e) => panic!("{TIERS_ENV}: {e}"),
    };

    for tier in config.tiers.iter() {
        println!("cargo:rustc-cfg={}", tier.meta().guard);
    }

    if let Err(e) = generate_into(&out_dir, &config) {
        panic!("lanewise-gen failed: {e}");
    }
}
