// This module is the emitter. It walks the four operations, the emitted numeric types and the
// five tiers in a fixed order and writes Rust source into the three lock-step streams. For each
// (operation, type) it produces a scalar default variant, one accelerated variant per tier that
// is both enabled by the configuration and supported by the capability matrix, a list of the
// compiled variants, and a resolved backend that picks the widest available variant once per
// process. Declarations get the per-operation trait and macro plus one impl per type, and the
// instantiation stream gets the fixed-size array backend. Accelerated variants probe the
// alignment of each pointer independently, run a register-wide main loop with per-pointer
// aligned/unaligned loads and stores, finish with a scalar tail, and release the register file
// if the tier requires it. Every binding is resolved from the intrinsic table; the table is
// checked against the matrix before any text is produced, so a hole aborts the whole run.

//! Emission of kernels, declarations and array instantiations.

use crate::capability::CapabilityMatrix;
use crate::config::GeneratorConfig;
use crate::error::GenResult;
use crate::intrinsics::IntrinsicTable;
use crate::srcgen::{Artifacts, Formatter, Streams};
use crate::types::{NumericType, Operation, Role, Tier};

const HEADERS: [&str; 3] = [
    "Elementwise kernels: scalar defaults, tier variants and resolved backends.",
    "Per-operation traits, their impls and convenience macros.",
    "Fixed-size array backends.",
];

/// Source generator over a capability matrix and an intrinsic table.
pub struct Generator<'a> {
    caps: &'a CapabilityMatrix,
    intrinsics: &'a IntrinsicTable,
    config: &'a GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(caps: &'a CapabilityMatrix, intrinsics: &'a IntrinsicTable, config: &'a GeneratorConfig) -> Self {
        Self {
            caps,
            intrinsics,
            config,
        }
    }

    /// Produce all three artifacts, or nothing.
    pub fn generate(&self) -> GenResult<Artifacts> {
        self.intrinsics.check(self.caps)?;

        let mut streams = Streams::new();
        streams.header(HEADERS);
        emit_prelude(&mut streams.implementation);

        let mut cells = 0;
        let mut variants = 0;
        for op in Operation::ALL {
            streams.region(op.name(), |s| {
                emit_trait(op, &mut s.declarations);
                for ty in NumericType::emitted() {
                    let region = format!("{op}/{ty}");
                    variants += s.region(&region, |s| self.emit_cell(op, ty, s))?;
                    cells += 1;
                }
                Ok(())
            })?;
        }

        log::info!(
            "generated {cells} routines with {variants} accelerated variants (tiers: {})",
            self.config.tiers
        );
        Ok(streams.finish())
    }

    /// Tiers that get a variant for (op, ty), narrowest first.
    pub fn variant_tiers(&self, op: Operation, ty: NumericType) -> impl Iterator<Item = Tier> + '_ {
        self.caps
            .tiers_for(op, ty)
            .filter(move |&tier| self.config.tiers.contains(tier))
    }

    fn emit_cell(&self, op: Operation, ty: NumericType, s: &mut Streams) -> GenResult<usize> {
        log::debug!("emitting {op}/{ty}");

        emit_default(op, ty, &mut s.implementation);
        let tiers: Vec<Tier> = self.variant_tiers(op, ty).collect();
        for &tier in &tiers {
            self.emit_variant(op, ty, tier, &mut s.implementation)?;
        }
        emit_variant_list(op, ty, &tiers, &mut s.implementation);
        emit_resolved(op, ty, &mut s.implementation);
        emit_impl(op, ty, &mut s.declarations);
        emit_array(op, ty, &mut s.instantiations);

        Ok(tiers.len())
    }

    fn emit_variant(&self, op: Operation, ty: NumericType, tier: Tier, fmt: &mut Formatter) -> GenResult<()> {
        let meta = tier.meta();
        let register = self.intrinsics.register(tier, ty)?;
        let aligned_load = self.intrinsics.binding(tier, Role::AlignedLoad, ty)?;
        let unaligned_load = self.intrinsics.binding(tier, Role::UnalignedLoad, ty)?;
        let compute = self.intrinsics.binding(tier, Role::Compute(op), ty)?;
        let aligned_store = self.intrinsics.binding(tier, Role::AlignedStore, ty)?;
        let unaligned_store = self.intrinsics.binding(tier, Role::UnalignedStore, ty)?;
        let stride = tier.lanes(ty);
        let bytes = tier.alignment();

        log::trace!("  {op}_{ty}_{tier}: {stride} lanes of {register}");

        fmtln!(fmt, "/// `{op}` over `{ty}`, {stride} lanes per step on the {tier} tier.");
        fmtln!(fmt, "#[cfg({})]", meta.guard);
        if let Some(feature) = meta.target_feature {
            fmtln!(fmt, "#[target_feature(enable = \"{feature}\")]");
        }
        fmt.block(signature(&format!("{op}_{ty}_{tier}"), ty), "}", |fmt| {
            for p in ["a", "b", "c"] {
                fmtln!(fmt, "let aligned_{p} = is_aligned({p}, {bytes});");
            }
            fmt.line("let mut i = 0;");
            fmt.block(format!("while i + {} < len", stride - 1), "}", |fmt| {
                for p in ["a", "b"] {
                    let ptr = format!("{p}.add(i)");
                    fmtln!(
                        fmt,
                        "let vec_{p}: {register} = if aligned_{p} {{ {} }} else {{ {} }};",
                        aligned_load.load_expr(&ptr, register),
                        unaligned_load.load_expr(&ptr, register),
                    );
                }
                fmtln!(fmt, "let vec_c: {register} = {};", compute.compute_expr("vec_a", "vec_b"));
                fmt.block("if aligned_c", "} else {", |fmt| {
                    fmtln!(fmt, "{};", aligned_store.store_expr("c.add(i)", register, "vec_c"));
                });
                fmt.indent(|fmt| {
                    fmtln!(fmt, "{};", unaligned_store.store_expr("c.add(i)", register, "vec_c"));
                });
                fmt.line("}");
                fmtln!(fmt, "i += {stride};");
            });
            fmt.block("while i < len", "}", |fmt| {
                fmtln!(fmt, "*c.add(i) = {};", element_expr(op, ty));
                fmt.line("i += 1;");
            });
            if let Some(deactivate) = meta.deactivate {
                fmtln!(fmt, "{deactivate};");
            }
        });
        fmt.empty_line();
        Ok(())
    }
}

fn signature(name: &str, ty: NumericType) -> String {
    format!("pub unsafe fn {name}(a: *const {ty}, b: *const {ty}, c: *mut {ty}, len: usize)")
}

fn element_expr(op: Operation, ty: NumericType) -> String {
    op.scalar_expr(ty, "*a.add(i)", "*b.add(i)")
}

/// Imports and the runtime `Tier` enum.
fn emit_prelude(fmt: &mut Formatter) {
    for arch in ["x86", "x86_64"] {
        fmtln!(fmt, "#[cfg(target_arch = \"{arch}\")]");
        fmt.line("#[allow(unused_imports)]");
        fmtln!(fmt, "use core::arch::{arch}::*;");
    }
    fmt.line("use std::sync::OnceLock;");
    fmt.empty_line();
    fmt.line("#[allow(unused_imports)]");
    fmt.line("use crate::dispatch::{is_aligned, resolve, Kernel, Variant};");
    fmt.empty_line();

    fmt.doc_comment("Instruction-set tiers, narrowest first.\n\nA tier is usable when its cfg guard was set at build time and the running CPU\nreports the feature; no tier implies another.");
    fmt.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
    fmt.block("pub enum Tier", "}", |fmt| {
        for tier in Tier::ALL {
            fmtln!(fmt, "{},", tier.meta().ident);
        }
    });
    fmt.empty_line();

    fmt.block("impl Tier", "}", |fmt| {
        let idents: Vec<_> = Tier::ALL.iter().map(|t| format!("Tier::{}", t.meta().ident)).collect();
        fmtln!(fmt, "pub const ALL: [Tier; {}] = [{}];", Tier::COUNT, idents.join(", "));
        fmt.empty_line();

        fmt.block("pub const fn name(self) -> &'static str", "}", |fmt| {
            fmt.block("match self", "}", |fmt| {
                for tier in Tier::ALL {
                    fmtln!(fmt, "Tier::{} => \"{}\",", tier.meta().ident, tier.name());
                }
            });
        });
        fmt.empty_line();

        fmt.block("pub const fn register_bits(self) -> u32", "}", |fmt| {
            fmt.block("match self", "}", |fmt| {
                for tier in Tier::ALL {
                    fmtln!(fmt, "Tier::{} => {},", tier.meta().ident, tier.meta().register_bits);
                }
            });
        });
        fmt.empty_line();

        fmt.doc_comment("Byte alignment of the aligned loads and stores.");
        fmt.block("pub const fn alignment(self) -> usize", "}", |fmt| {
            fmt.line("self.register_bits() as usize / 8");
        });
        fmt.empty_line();

        fmt.doc_comment("Elements of `elem_bytes` bytes per register.");
        fmt.block("pub const fn lanes(self, elem_bytes: usize) -> usize", "}", |fmt| {
            fmt.line("self.alignment() / elem_bytes");
        });
        fmt.empty_line();

        fmt.doc_comment("Whether the tier was compiled in and the running CPU supports it.");
        fmt.line("#[allow(unreachable_patterns)]");
        fmt.block("pub fn is_available(self) -> bool", "}", |fmt| {
            fmt.block("match self", "}", |fmt| {
                for tier in Tier::ALL {
                    let meta = tier.meta();
                    fmtln!(fmt, "#[cfg({})]", meta.guard);
                    match meta.detect {
                        Some(feature) => fmtln!(
                            fmt,
                            "Tier::{} => std::arch::is_x86_feature_detected!(\"{feature}\"),",
                            meta.ident
                        ),
                        None => fmtln!(fmt, "Tier::{} => true,", meta.ident),
                    }
                }
                fmt.line("_ => false,");
            });
        });
    });
    fmt.empty_line();

    fmt.block("impl core::fmt::Display for Tier", "}", |fmt| {
        fmt.block("fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result", "}", |fmt| {
            fmt.line("f.write_str(self.name())");
        });
    });
    fmt.empty_line();
}

fn emit_default(op: Operation, ty: NumericType, fmt: &mut Formatter) {
    log::trace!("  {op}_{ty}_default");
    fmtln!(fmt, "/// Scalar `{op}` over `{ty}`.");
    fmt.line("///");
    fmt.line("/// # Safety");
    fmt.line("///");
    fmt.line("/// `a` and `b` must be valid for `len` reads and `c` for `len` writes.");
    fmt.block(signature(&format!("{op}_{ty}_default"), ty), "}", |fmt| {
        fmt.block("for i in 0..len", "}", |fmt| {
            fmtln!(fmt, "*c.add(i) = {};", element_expr(op, ty));
        });
    });
    fmt.empty_line();
}

fn emit_variant_list(op: Operation, ty: NumericType, tiers: &[Tier], fmt: &mut Formatter) {
    fmtln!(fmt, "/// Compiled accelerated variants of `{op}` over `{ty}`, narrowest first.");
    fmt.line("#[allow(unused_mut)]");
    fmt.block(format!("pub fn {op}_{ty}_variants() -> Vec<Variant<{ty}>>"), "}", |fmt| {
        fmt.line("let mut variants = Vec::new();");
        for &tier in tiers {
            let meta = tier.meta();
            fmtln!(fmt, "#[cfg({})]", meta.guard);
            fmtln!(fmt, "variants.push(Variant::new(Tier::{}, {op}_{ty}_{tier}));", meta.ident);
        }
        fmt.line("variants");
    });
    fmt.empty_line();
}

fn emit_resolved(op: Operation, ty: NumericType, fmt: &mut Formatter) {
    fmtln!(fmt, "/// `{op}` over `{ty}` through the widest variant the CPU supports.");
    fmt.line("///");
    fmt.line("/// # Safety");
    fmt.line("///");
    fmtln!(fmt, "/// Same contract as [`{op}_{ty}_default`].");
    fmt.block(signature(&format!("{op}_{ty}"), ty), "}", |fmt| {
        fmtln!(fmt, "static RESOLVED: OnceLock<Kernel<{ty}>> = OnceLock::new();");
        fmtln!(
            fmt,
            "let kernel = *RESOLVED.get_or_init(|| resolve(\"{op}\", \"{ty}\", {op}_{ty}_default, &{op}_{ty}_variants()));"
        );
        fmt.line("kernel(a, b, c, len)");
    });
    fmt.empty_line();
}

fn emit_trait(op: Operation, fmt: &mut Formatter) {
    let meta = op.meta();
    let name = meta.name;

    fmtln!(fmt, "/// Elementwise `{name}` (`c[i] = a[i] {} b[i]`).", meta.symbol);
    fmt.line("///");
    fmt.line("/// Integers wrap on overflow.");
    fmt.block(format!("pub trait {}: Copy", meta.trait_name), "}", |fmt| {
        fmt.doc_comment(
            "Pointer entry point.\n\n# Safety\n\n`a` and `b` must be valid for `len` reads, `c` for `len` writes,\nand `c` must not overlap either input.",
        );
        fmtln!(fmt, "unsafe fn {name}_raw(a: *const Self, b: *const Self, c: *mut Self, len: usize);");
        fmt.empty_line();

        fmt.doc_comment("Slice entry point.\n\nPanics if `a` and `b` differ in length or `c` is shorter than them.");
        fmt.block(format!("fn {name}_slice(a: &[Self], b: &[Self], c: &mut [Self])"), "}", |fmt| {
            fmtln!(fmt, "assert_eq!(a.len(), b.len(), \"{name}: input lengths differ\");");
            fmtln!(fmt, "assert!(c.len() >= a.len(), \"{name}: output shorter than inputs\");");
            fmt.line("// SAFETY: lengths checked above; `c` is an exclusive borrow.");
            fmtln!(fmt, "unsafe {{ Self::{name}_raw(a.as_ptr(), b.as_ptr(), c.as_mut_ptr(), a.len()) }}");
        });
        fmt.empty_line();

        fmt.doc_comment("Fixed-size entry point.");
        fmtln!(fmt, "fn {name}_array<const N: usize>(a: &[Self; N], b: &[Self; N], c: &mut [Self; N]);");
    });
    fmt.empty_line();

    fmtln!(fmt, "/// `{}!(a, b, c)` applies `{name}` over three arrays of equal size.", meta.macro_name);
    fmt.line("#[macro_export]");
    fmt.block(format!("macro_rules! {}", meta.macro_name), "}", |fmt| {
        fmt.block("($a:expr, $b:expr, $c:expr $(,)?) =>", "};", |fmt| {
            fmtln!(fmt, "$crate::{}::{name}_array(&$a, &$b, &mut $c)", meta.trait_name);
        });
    });
    fmt.empty_line();
}

fn emit_impl(op: Operation, ty: NumericType, fmt: &mut Formatter) {
    let meta = op.meta();
    fmt.block(format!("impl {} for {ty}", meta.trait_name), "}", |fmt| {
        fmt.block(
            format!("unsafe fn {op}_raw(a: *const {ty}, b: *const {ty}, c: *mut {ty}, len: usize)"),
            "}",
            |fmt| fmtln!(fmt, "crate::kernels::{op}_{ty}(a, b, c, len)"),
        );
        fmt.empty_line();
        fmt.block(
            format!("fn {op}_array<const N: usize>(a: &[{ty}; N], b: &[{ty}; N], c: &mut [{ty}; N])"),
            "}",
            |fmt| fmtln!(fmt, "crate::arrays::{op}_{ty}_array(a, b, c)"),
        );
    });
}

fn emit_array(op: Operation, ty: NumericType, fmt: &mut Formatter) {
    fmtln!(fmt, "/// `{op}` over `[{ty}; N]`.");
    fmt.block(
        format!("pub fn {op}_{ty}_array<const N: usize>(a: &[{ty}; N], b: &[{ty}; N], c: &mut [{ty}; N])"),
        "}",
        |fmt| {
            fmt.line("// SAFETY: all three arrays hold N elements and `c` is an exclusive borrow.");
            fmtln!(fmt, "unsafe {{ crate::kernels::{op}_{ty}(a.as_ptr(), b.as_ptr(), c.as_mut_ptr(), N) }}");
        },
    );
}
