// This module holds the metadata tables of the generator: the three finite sets it iterates
// (numeric types, operations, instruction-set tiers) and the fixed facts attached to each
// member. Numeric types know their bit width, Rust spelling and whether they are integers or
// floats; operations know the names used for the generated trait, macro and functions and the
// scalar expression that defines them; tiers know their register width, the cfg guard that
// gates their code, the target feature and runtime detection names, the architectures they
// exist on, and the deactivation call the narrow tier needs. Role names the five slots of the
// intrinsic table. Every enum lists its members in emission order through an ALL constant.

//! Numeric types, operations, tiers and their metadata.

use std::fmt;

/// Whether a numeric type is a signed integer, an unsigned integer or a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Signed,
    Unsigned,
    Float,
}

/// Element types the generated routines operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    /// Reserved: no stable Rust primitive, never emitted.
    F16,
    F32,
    F64,
    /// Reserved: no stable Rust primitive, never emitted.
    F128,
}

/// Static facts about a [`NumericType`].
#[derive(Debug, Clone, Copy)]
pub struct NumericMeta {
    /// Long name, used in diagnostics and docs.
    pub name: &'static str,
    /// Rust spelling, also the suffix of every generated function name.
    pub spelling: &'static str,
    pub bits: u32,
    pub kind: NumericKind,
    /// Reserved types carry metadata but are never emitted.
    pub reserved: bool,
}

impl NumericType {
    pub const COUNT: usize = 14;

    /// Signed widths ascending, then unsigned, then floats.
    pub const ALL: [NumericType; Self::COUNT] = [
        NumericType::I8,
        NumericType::I16,
        NumericType::I32,
        NumericType::I64,
        NumericType::I128,
        NumericType::U8,
        NumericType::U16,
        NumericType::U32,
        NumericType::U64,
        NumericType::U128,
        NumericType::F16,
        NumericType::F32,
        NumericType::F64,
        NumericType::F128,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn meta(self) -> NumericMeta {
        use NumericKind::*;
        let (name, spelling, bits, kind, reserved) = match self {
            NumericType::I8 => ("int8", "i8", 8, Signed, false),
            NumericType::I16 => ("int16", "i16", 16, Signed, false),
            NumericType::I32 => ("int32", "i32", 32, Signed, false),
            NumericType::I64 => ("int64", "i64", 64, Signed, false),
            NumericType::I128 => ("int128", "i128", 128, Signed, false),
            NumericType::U8 => ("uint8", "u8", 8, Unsigned, false),
            NumericType::U16 => ("uint16", "u16", 16, Unsigned, false),
            NumericType::U32 => ("uint32", "u32", 32, Unsigned, false),
            NumericType::U64 => ("uint64", "u64", 64, Unsigned, false),
            NumericType::U128 => ("uint128", "u128", 128, Unsigned, false),
            // No stable Rust primitive for either half or quad precision.
            NumericType::F16 => ("float16", "f16", 16, Float, true),
            NumericType::F32 => ("float32", "f32", 32, Float, false),
            NumericType::F64 => ("float64", "f64", 64, Float, false),
            NumericType::F128 => ("float128", "f128", 128, Float, true),
        };
        NumericMeta {
            name,
            spelling,
            bits,
            kind,
            reserved,
        }
    }

    pub const fn spelling(self) -> &'static str {
        self.meta().spelling
    }

    pub const fn bits(self) -> u32 {
        self.meta().bits
    }

    pub const fn is_float(self) -> bool {
        matches!(self.meta().kind, NumericKind::Float)
    }

    pub const fn is_reserved(self) -> bool {
        self.meta().reserved
    }

    /// Types that take part in generation, in emission order.
    pub fn emitted() -> impl Iterator<Item = NumericType> {
        Self::ALL.into_iter().filter(|ty| !ty.is_reserved())
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// Elementwise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

/// Static facts about an [`Operation`].
#[derive(Debug, Clone, Copy)]
pub struct OperationMeta {
    /// Display name and function-name prefix.
    pub name: &'static str,
    /// Public trait carrying the three entry points.
    pub trait_name: &'static str,
    /// Exported convenience macro.
    pub macro_name: &'static str,
    /// Infix operator used for floats.
    pub symbol: char,
    /// Method used for integers, matching the modular lane arithmetic of vector units.
    pub wrapping: &'static str,
}

impl Operation {
    pub const COUNT: usize = 4;

    pub const ALL: [Operation; Self::COUNT] =
        [Operation::Add, Operation::Sub, Operation::Mul, Operation::Div];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn meta(self) -> OperationMeta {
        let (name, trait_name, macro_name, symbol, wrapping) = match self {
            Operation::Add => ("add", "SimdAdd", "simd_add", '+', "wrapping_add"),
            Operation::Sub => ("sub", "SimdSub", "simd_sub", '-', "wrapping_sub"),
            Operation::Mul => ("mul", "SimdMul", "simd_mul", '*', "wrapping_mul"),
            Operation::Div => ("div", "SimdDiv", "simd_div", '/', "wrapping_div"),
        };
        OperationMeta {
            name,
            trait_name,
            macro_name,
            symbol,
            wrapping,
        }
    }

    pub const fn name(self) -> &'static str {
        self.meta().name
    }

    /// Rust expression for one element, given the two operand expressions.
    pub fn scalar_expr(self, ty: NumericType, lhs: &str, rhs: &str) -> String {
        let meta = self.meta();
        if ty.is_float() {
            format!("{lhs} {} {rhs}", meta.symbol)
        } else {
            format!("({lhs}).{}({rhs})", meta.wrapping)
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Instruction-set capability levels, narrowest first.
///
/// Each tier is gated on its own; the ordering only fixes emission order and the
/// preference of the runtime resolver, never an implication between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Mmx,
    Sse,
    Sse2,
    Avx,
    Avx2,
}

/// Static facts about a [`Tier`].
#[derive(Debug, Clone, Copy)]
pub struct TierMeta {
    /// Human-readable name, also the generated function suffix.
    pub name: &'static str,
    /// Variant name of the generated `Tier` enum.
    pub ident: &'static str,
    /// cfg symbol the build script defines when the tier is compiled in.
    pub guard: &'static str,
    /// `#[target_feature(enable = ..)]` name, if the tier needs one.
    pub target_feature: Option<&'static str>,
    /// `is_x86_feature_detected!` name; `None` means always present where compiled.
    pub detect: Option<&'static str>,
    pub register_bits: u32,
    /// Values of `target_arch` the tier exists on.
    pub arches: &'static [&'static str],
    /// Statement run once after the tail loop, for register files that must be released.
    pub deactivate: Option<&'static str>,
}

const X86: &[&str] = &["x86", "x86_64"];

impl Tier {
    pub const COUNT: usize = 5;

    pub const ALL: [Tier; Self::COUNT] = [Tier::Mmx, Tier::Sse, Tier::Sse2, Tier::Avx, Tier::Avx2];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn meta(self) -> TierMeta {
        match self {
            Tier::Mmx => TierMeta {
                name: "mmx",
                ident: "Mmx",
                guard: "lanewise_mmx",
                target_feature: None,
                detect: None,
                register_bits: 64,
                arches: X86,
                deactivate: Some("crate::mm64::empty()"),
            },
            Tier::Sse => TierMeta {
                name: "sse",
                ident: "Sse",
                guard: "lanewise_sse",
                target_feature: Some("sse"),
                detect: Some("sse"),
                register_bits: 128,
                arches: X86,
                deactivate: None,
            },
            Tier::Sse2 => TierMeta {
                name: "sse2",
                ident: "Sse2",
                guard: "lanewise_sse2",
                target_feature: Some("sse2"),
                detect: Some("sse2"),
                register_bits: 128,
                arches: X86,
                deactivate: None,
            },
            Tier::Avx => TierMeta {
                name: "avx",
                ident: "Avx",
                guard: "lanewise_avx",
                target_feature: Some("avx"),
                detect: Some("avx"),
                register_bits: 256,
                arches: X86,
                deactivate: None,
            },
            Tier::Avx2 => TierMeta {
                name: "avx2",
                ident: "Avx2",
                guard: "lanewise_avx2",
                target_feature: Some("avx2"),
                detect: Some("avx2"),
                register_bits: 256,
                arches: X86,
                deactivate: None,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        self.meta().name
    }

    /// Byte alignment the aligned load/store bindings require.
    pub const fn alignment(self) -> u32 {
        self.meta().register_bits / 8
    }

    /// Elements of `ty` per register, which is also the main-loop stride.
    pub const fn lanes(self, ty: NumericType) -> u32 {
        self.meta().register_bits / ty.bits()
    }

    pub fn from_name(name: &str) -> Option<Tier> {
        Self::ALL.into_iter().find(|tier| tier.name() == name)
    }

    pub fn exists_on(self, arch: &str) -> bool {
        self.meta().arches.contains(&arch)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slots of the intrinsic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    AlignedLoad,
    UnalignedLoad,
    Compute(Operation),
    AlignedStore,
    UnalignedStore,
}

impl Role {
    /// The four memory roles every accelerated variant uses.
    pub const MEMORY: [Role; 4] = [
        Role::AlignedLoad,
        Role::UnalignedLoad,
        Role::AlignedStore,
        Role::UnalignedStore,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::AlignedLoad => f.write_str("aligned-load"),
            Role::UnalignedLoad => f.write_str("unaligned-load"),
            Role::Compute(op) => write!(f, "compute({op})"),
            Role::AlignedStore => f.write_str("aligned-store"),
            Role::UnalignedStore => f.write_str("unaligned-store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitted_types_skip_reserved() {
        let emitted: Vec<_> = NumericType::emitted().map(|ty| ty.spelling()).collect();
        assert_eq!(
            emitted,
            ["i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128", "f32", "f64"]
        );
    }

    #[test]
    fn test_half_and_quad_are_reserved() {
        let reserved: Vec<_> = NumericType::ALL.into_iter().filter(|ty| ty.is_reserved()).collect();
        assert_eq!(reserved, [NumericType::F16, NumericType::F128]);
        assert!(NumericType::emitted().all(|ty| ty != NumericType::F128));
    }

    #[test]
    fn test_indices_follow_declaration_order() {
        for (i, ty) in NumericType::ALL.into_iter().enumerate() {
            assert_eq!(ty.index(), i);
        }
        for (i, tier) in Tier::ALL.into_iter().enumerate() {
            assert_eq!(tier.index(), i);
        }
        for (i, op) in Operation::ALL.into_iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }

    #[test]
    fn test_lanes_and_alignment() {
        assert_eq!(Tier::Mmx.lanes(NumericType::I8), 8);
        assert_eq!(Tier::Mmx.alignment(), 8);
        assert_eq!(Tier::Sse2.lanes(NumericType::I32), 4);
        assert_eq!(Tier::Avx2.lanes(NumericType::U8), 32);
        assert_eq!(Tier::Avx.lanes(NumericType::F64), 4);
        assert_eq!(Tier::Avx.alignment(), 32);
    }

    #[test]
    fn test_scalar_expressions_are_distinct_per_operation() {
        let exprs: Vec<_> = Operation::ALL
            .into_iter()
            .map(|op| op.scalar_expr(NumericType::I32, "x", "y"))
            .collect();
        assert_eq!(
            exprs,
            [
                "(x).wrapping_add(y)",
                "(x).wrapping_sub(y)",
                "(x).wrapping_mul(y)",
                "(x).wrapping_div(y)",
            ]
        );
        assert_eq!(Operation::Div.scalar_expr(NumericType::F64, "x", "y"), "x / y");
    }

    #[test]
    fn test_tier_names_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.name()), Some(tier));
        }
        assert_eq!(Tier::from_name("avx512f"), None);
        assert!(Tier::Sse2.exists_on("x86_64"));
        assert!(!Tier::Sse2.exists_on("aarch64"));
    }
}
