//! lanewise - elementwise arithmetic with per-tier SIMD variants.
//!
//! Every routine computes `c[i] = a[i] op b[i]` for `op` in add, sub, mul and
//! div over `i8`..`i128`, `u8`..`u128`, `f32` and `f64`. Integer lanes wrap on
//! overflow; integer division by zero panics. None of the routines are written
//! by hand: `build.rs` runs `lanewise-gen` and the three modules below include
//! its output.
//!
//! # Usage
//!
//! ```
//! use lanewise::{simd_add, SimdAdd, SimdMul};
//!
//! let a = [1i32, 2, 3, 4];
//! let b = [10i32, 20, 30, 40];
//!
//! let mut sum = [0i32; 4];
//! i32::add_slice(&a, &b, &mut sum);
//! assert_eq!(sum, [11, 22, 33, 44]);
//!
//! let mut product = [0i32; 4];
//! i32::mul_array(&a, &b, &mut product);
//! assert_eq!(product, [10, 40, 90, 160]);
//!
//! let mut again = [0i32; 4];
//! simd_add!(a, b, again);
//! assert_eq!(again, sum);
//! ```
//!
//! # Layout
//!
//! - [`kernels`] - scalar defaults, tier variants and resolved backends
//! - [`api`] - the entry-point traits ([`SimdAdd`], [`SimdSub`], [`SimdMul`], [`SimdDiv`])
//! - [`arrays`] - fixed-size array backends
//! - [`dispatch`] - runtime variant selection
//! - [`mm64`] - the 64-bit lane type behind the `mmx` tier
//!
//! # Testing
//!
//! On x86 the default build compiles every tier, so the default-only build is
//! exercised only with `LANEWISE_TIERS=none cargo test`. Run it alongside the
//! plain `cargo test`.

pub mod dispatch;
pub mod mm64;

/// Generated kernels: `<op>_<ty>_default`, `<op>_<ty>_<tier>`,
/// `<op>_<ty>_variants` and the resolved `<op>_<ty>`.
#[allow(clippy::missing_safety_doc)]
pub mod kernels {
    include!(concat!(env!("OUT_DIR"), "/kernels.rs"));
}

/// Generated entry-point traits and macros.
pub mod api {
    include!(concat!(env!("OUT_DIR"), "/api.rs"));
}

/// Generated fixed-size array backends.
pub mod arrays {
    include!(concat!(env!("OUT_DIR"), "/arrays.rs"));
}

pub use api::*;
pub use dispatch::{Kernel, Variant};
pub use kernels::Tier;
