// This module defines the intrinsic table: which callable implements each role (aligned load,
// unaligned load, compute for one operation, aligned store, unaligned store) for a given tier
// and numeric type, plus the register type a variant keeps its operands in. The table is
// partial and stored in hashbrown maps keyed by those identities. Lookups of a missing entry
// return GenError::MissingBinding or GenError::MissingRegister naming the exact triple, and
// check() walks every supported cell of a capability matrix up front, also rejecting a type
// that does not fit one lane of the tier's register, so that generation never starts with a
// hole in the table. A Binding is a tagged value rather than a code snippet: it
// carries the callable path and whether the element pointer is passed as-is or cast to a
// pointer to the register type first, which is all the emitter needs to spell a call.

//! Intrinsic table: (tier, role, type) to the callable implementing it.

use hashbrown::HashMap;

use crate::capability::CapabilityMatrix;
use crate::error::{GenError, GenResult};
use crate::types::{NumericType, Operation, Role, Tier};

/// How a load or store binding takes its pointer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerForm {
    /// `*const T` / `*mut T` as-is.
    Element,
    /// Cast to `*const R` / `*mut R`, `R` being the register type.
    Register,
}

/// The callable bound to one (tier, role, type) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub path: String,
    pub pointer: PointerForm,
}

impl Binding {
    pub fn new(path: impl Into<String>, pointer: PointerForm) -> Self {
        Self {
            path: path.into(),
            pointer,
        }
    }

    /// A compute binding; the pointer form is irrelevant for register operands.
    pub fn compute(path: impl Into<String>) -> Self {
        Self::new(path, PointerForm::Element)
    }

    /// Call expression loading from `ptr` (an expression of type `*const T`).
    pub fn load_expr(&self, ptr: &str, register: &str) -> String {
        match self.pointer {
            PointerForm::Element => format!("{}({ptr})", self.path),
            PointerForm::Register => format!("{}({ptr}.cast::<{register}>())", self.path),
        }
    }

    /// Call expression storing `value` to `ptr` (an expression of type `*mut T`).
    pub fn store_expr(&self, ptr: &str, register: &str, value: &str) -> String {
        match self.pointer {
            PointerForm::Element => format!("{}({ptr}, {value})", self.path),
            PointerForm::Register => format!("{}({ptr}.cast::<{register}>(), {value})", self.path),
        }
    }

    pub fn compute_expr(&self, lhs: &str, rhs: &str) -> String {
        format!("{}({lhs}, {rhs})", self.path)
    }
}

/// Memory bindings shared by a group of numeric types on one tier.
struct MemoryFamily {
    tier: Tier,
    register: &'static str,
    pointer: PointerForm,
    /// aligned load, unaligned load, aligned store, unaligned store
    calls: [&'static str; 4],
    types: &'static [NumericType],
}

const MMX_INTS: &[NumericType] = &[
    NumericType::I8,
    NumericType::I16,
    NumericType::I32,
    NumericType::U8,
    NumericType::U16,
    NumericType::U32,
];

const WIDE_INTS: &[NumericType] = &[
    NumericType::I8,
    NumericType::I16,
    NumericType::I32,
    NumericType::I64,
    NumericType::U8,
    NumericType::U16,
    NumericType::U32,
    NumericType::U64,
];

#[rustfmt::skip]
const X86_MEMORY: &[MemoryFamily] = &[
    MemoryFamily {
        tier: Tier::Mmx,
        register: "crate::mm64::Mm64",
        pointer: PointerForm::Element,
        calls: ["crate::mm64::load", "crate::mm64::loadu", "crate::mm64::store", "crate::mm64::storeu"],
        types: MMX_INTS,
    },
    MemoryFamily {
        tier: Tier::Sse,
        register: "__m128",
        pointer: PointerForm::Element,
        calls: ["_mm_load_ps", "_mm_loadu_ps", "_mm_store_ps", "_mm_storeu_ps"],
        types: &[NumericType::F32],
    },
    MemoryFamily {
        tier: Tier::Sse2,
        register: "__m128i",
        pointer: PointerForm::Register,
        calls: ["_mm_load_si128", "_mm_loadu_si128", "_mm_store_si128", "_mm_storeu_si128"],
        types: WIDE_INTS,
    },
    MemoryFamily {
        tier: Tier::Sse2,
        register: "__m128d",
        pointer: PointerForm::Element,
        calls: ["_mm_load_pd", "_mm_loadu_pd", "_mm_store_pd", "_mm_storeu_pd"],
        types: &[NumericType::F64],
    },
    MemoryFamily {
        tier: Tier::Avx,
        register: "__m256",
        pointer: PointerForm::Element,
        calls: ["_mm256_load_ps", "_mm256_loadu_ps", "_mm256_store_ps", "_mm256_storeu_ps"],
        types: &[NumericType::F32],
    },
    MemoryFamily {
        tier: Tier::Avx,
        register: "__m256d",
        pointer: PointerForm::Element,
        calls: ["_mm256_load_pd", "_mm256_loadu_pd", "_mm256_store_pd", "_mm256_storeu_pd"],
        types: &[NumericType::F64],
    },
    MemoryFamily {
        tier: Tier::Avx2,
        register: "__m256i",
        pointer: PointerForm::Register,
        calls: ["_mm256_load_si256", "_mm256_loadu_si256", "_mm256_store_si256", "_mm256_storeu_si256"],
        types: WIDE_INTS,
    },
];

#[rustfmt::skip]
const X86_COMPUTE: &[(Tier, Operation, NumericType, &str)] = {
    use NumericType::*;
    use Operation::*;
    use Tier::*;
    &[
        (Mmx, Add, I8, "crate::mm64::add_pi8"),
        (Mmx, Add, I16, "crate::mm64::add_pi16"),
        (Mmx, Add, I32, "crate::mm64::add_pi32"),
        (Mmx, Add, U8, "crate::mm64::add_pi8"),
        (Mmx, Add, U16, "crate::mm64::add_pi16"),
        (Mmx, Add, U32, "crate::mm64::add_pi32"),
        (Mmx, Sub, I8, "crate::mm64::sub_pi8"),
        (Mmx, Sub, I16, "crate::mm64::sub_pi16"),
        (Mmx, Sub, I32, "crate::mm64::sub_pi32"),
        (Mmx, Sub, U8, "crate::mm64::sub_pi8"),
        (Mmx, Sub, U16, "crate::mm64::sub_pi16"),
        (Mmx, Sub, U32, "crate::mm64::sub_pi32"),
        (Mmx, Mul, I16, "crate::mm64::mullo_pi16"),
        (Mmx, Mul, U16, "crate::mm64::mullo_pi16"),

        (Sse, Add, F32, "_mm_add_ps"),
        (Sse, Sub, F32, "_mm_sub_ps"),
        (Sse, Mul, F32, "_mm_mul_ps"),
        (Sse, Div, F32, "_mm_div_ps"),

        (Sse2, Add, I8, "_mm_add_epi8"),
        (Sse2, Add, I16, "_mm_add_epi16"),
        (Sse2, Add, I32, "_mm_add_epi32"),
        (Sse2, Add, I64, "_mm_add_epi64"),
        (Sse2, Add, U8, "_mm_add_epi8"),
        (Sse2, Add, U16, "_mm_add_epi16"),
        (Sse2, Add, U32, "_mm_add_epi32"),
        (Sse2, Add, U64, "_mm_add_epi64"),
        (Sse2, Add, F64, "_mm_add_pd"),
        (Sse2, Sub, I8, "_mm_sub_epi8"),
        (Sse2, Sub, I16, "_mm_sub_epi16"),
        (Sse2, Sub, I32, "_mm_sub_epi32"),
        (Sse2, Sub, I64, "_mm_sub_epi64"),
        (Sse2, Sub, U8, "_mm_sub_epi8"),
        (Sse2, Sub, U16, "_mm_sub_epi16"),
        (Sse2, Sub, U32, "_mm_sub_epi32"),
        (Sse2, Sub, U64, "_mm_sub_epi64"),
        (Sse2, Sub, F64, "_mm_sub_pd"),
        (Sse2, Mul, I16, "_mm_mullo_epi16"),
        (Sse2, Mul, U16, "_mm_mullo_epi16"),
        (Sse2, Mul, F64, "_mm_mul_pd"),
        (Sse2, Div, F64, "_mm_div_pd"),

        (Avx, Add, F32, "_mm256_add_ps"),
        (Avx, Add, F64, "_mm256_add_pd"),
        (Avx, Sub, F32, "_mm256_sub_ps"),
        (Avx, Sub, F64, "_mm256_sub_pd"),
        (Avx, Mul, F32, "_mm256_mul_ps"),
        (Avx, Mul, F64, "_mm256_mul_pd"),
        (Avx, Div, F32, "_mm256_div_ps"),
        (Avx, Div, F64, "_mm256_div_pd"),

        (Avx2, Add, I8, "_mm256_add_epi8"),
        (Avx2, Add, I16, "_mm256_add_epi16"),
        (Avx2, Add, I32, "_mm256_add_epi32"),
        (Avx2, Add, I64, "_mm256_add_epi64"),
        (Avx2, Add, U8, "_mm256_add_epi8"),
        (Avx2, Add, U16, "_mm256_add_epi16"),
        (Avx2, Add, U32, "_mm256_add_epi32"),
        (Avx2, Add, U64, "_mm256_add_epi64"),
        (Avx2, Sub, I8, "_mm256_sub_epi8"),
        (Avx2, Sub, I16, "_mm256_sub_epi16"),
        (Avx2, Sub, I32, "_mm256_sub_epi32"),
        (Avx2, Sub, I64, "_mm256_sub_epi64"),
        (Avx2, Sub, U8, "_mm256_sub_epi8"),
        (Avx2, Sub, U16, "_mm256_sub_epi16"),
        (Avx2, Sub, U32, "_mm256_sub_epi32"),
        (Avx2, Sub, U64, "_mm256_sub_epi64"),
        (Avx2, Mul, I16, "_mm256_mullo_epi16"),
        (Avx2, Mul, I32, "_mm256_mullo_epi32"),
        (Avx2, Mul, U16, "_mm256_mullo_epi16"),
        (Avx2, Mul, U32, "_mm256_mullo_epi32"),
    ]
};

/// Partial map from (tier, role, type) to a [`Binding`], plus register types.
#[derive(Debug, Clone, Default)]
pub struct IntrinsicTable {
    bindings: HashMap<(Tier, Role, NumericType), Binding>,
    registers: HashMap<(Tier, NumericType), String>,
}

impl IntrinsicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shipped x86 table, matching [`CapabilityMatrix::x86`].
    pub fn x86() -> Self {
        let mut table = Self::new();

        for family in X86_MEMORY {
            let [load, loadu, store, storeu] = family.calls;
            for &ty in family.types {
                table.set_register(family.tier, ty, family.register);
                table.bind(family.tier, Role::AlignedLoad, ty, Binding::new(load, family.pointer));
                table.bind(family.tier, Role::UnalignedLoad, ty, Binding::new(loadu, family.pointer));
                table.bind(family.tier, Role::AlignedStore, ty, Binding::new(store, family.pointer));
                table.bind(family.tier, Role::UnalignedStore, ty, Binding::new(storeu, family.pointer));
            }
        }

        for &(tier, op, ty, path) in X86_COMPUTE {
            table.bind(tier, Role::Compute(op), ty, Binding::compute(path));
        }

        table
    }

    pub fn bind(&mut self, tier: Tier, role: Role, ty: NumericType, binding: Binding) {
        self.bindings.insert((tier, role, ty), binding);
    }

    pub fn set_register(&mut self, tier: Tier, ty: NumericType, register: impl Into<String>) {
        self.registers.insert((tier, ty), register.into());
    }

    /// Drop one binding, returning it if it was present.
    pub fn unbind(&mut self, tier: Tier, role: Role, ty: NumericType) -> Option<Binding> {
        self.bindings.remove(&(tier, role, ty))
    }

    pub fn binding(&self, tier: Tier, role: Role, ty: NumericType) -> GenResult<&Binding> {
        self.bindings
            .get(&(tier, role, ty))
            .ok_or(GenError::MissingBinding { tier, role, ty })
    }

    pub fn register(&self, tier: Tier, ty: NumericType) -> GenResult<&str> {
        self.registers
            .get(&(tier, ty))
            .map(String::as_str)
            .ok_or(GenError::MissingRegister { tier, ty })
    }

    /// Verify every supported cell of `caps` fits at least one lane in the
    /// register and has its register type, compute binding and all four
    /// memory bindings.
    pub fn check(&self, caps: &CapabilityMatrix) -> GenResult<()> {
        for (tier, op, ty) in caps.supported_cells() {
            if tier.lanes(ty) == 0 {
                return Err(GenError::TypeWiderThanRegister { tier, ty });
            }
            self.register(tier, ty)?;
            self.binding(tier, Role::Compute(op), ty)?;
            for role in Role::MEMORY {
                self.binding(tier, role, ty)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
