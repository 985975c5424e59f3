// This module defines the capability matrix: for every (tier, operation, numeric type) cell,
// whether the tier has a vector instruction for the operation on that type. The matrix is a
// total function. It is built from rows, one per (tier, operation), each listing an explicit
// true/false for all fourteen numeric types in declaration order, and construction fails if
// any row is missing, so no cell is ever filled in by default. The shipped rows mirror the x86
// vector extensions: 64-bit packed integer add/sub plus 16-bit low multiply on the narrow
// tier, single precision on sse, integer and double precision on sse2, both float widths on
// avx, and 256-bit integer add/sub/low-multiply on avx2. No tier divides integers.

//! Capability matrix: which operation is accelerated for which type on which tier.

use crate::error::{GenError, GenResult};
use crate::types::{NumericType, Operation, Tier};

/// One explicit row of the matrix, indexed by [`NumericType::index`].
pub type CapabilityRow = (Tier, Operation, [bool; NumericType::COUNT]);

const Y: bool = true;
const N: bool = false;

#[rustfmt::skip]
const DEFAULT_ROWS: &[CapabilityRow] = &[
    //                        i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f16 f32 f64 f128
    (Tier::Mmx,  Operation::Add, [Y, Y,  Y,  N,  N,   Y, Y,  Y,  N,  N,   N,  N,  N,  N]),
    (Tier::Mmx,  Operation::Sub, [Y, Y,  Y,  N,  N,   Y, Y,  Y,  N,  N,   N,  N,  N,  N]),
    (Tier::Mmx,  Operation::Mul, [N, Y,  N,  N,  N,   N, Y,  N,  N,  N,   N,  N,  N,  N]),
    (Tier::Mmx,  Operation::Div, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  N,  N,  N]),
    (Tier::Sse,  Operation::Add, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  N,  N]),
    (Tier::Sse,  Operation::Sub, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  N,  N]),
    (Tier::Sse,  Operation::Mul, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  N,  N]),
    (Tier::Sse,  Operation::Div, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  N,  N]),
    (Tier::Sse2, Operation::Add, [Y, Y,  Y,  Y,  N,   Y, Y,  Y,  Y,  N,   N,  N,  Y,  N]),
    (Tier::Sse2, Operation::Sub, [Y, Y,  Y,  Y,  N,   Y, Y,  Y,  Y,  N,   N,  N,  Y,  N]),
    (Tier::Sse2, Operation::Mul, [N, Y,  N,  N,  N,   N, Y,  N,  N,  N,   N,  N,  Y,  N]),
    (Tier::Sse2, Operation::Div, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  N,  Y,  N]),
    (Tier::Avx,  Operation::Add, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  Y,  N]),
    (Tier::Avx,  Operation::Sub, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  Y,  N]),
    (Tier::Avx,  Operation::Mul, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  Y,  N]),
    (Tier::Avx,  Operation::Div, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  Y,  Y,  N]),
    (Tier::Avx2, Operation::Add, [Y, Y,  Y,  Y,  N,   Y, Y,  Y,  Y,  N,   N,  N,  N,  N]),
    (Tier::Avx2, Operation::Sub, [Y, Y,  Y,  Y,  N,   Y, Y,  Y,  Y,  N,   N,  N,  N,  N]),
    (Tier::Avx2, Operation::Mul, [N, Y,  Y,  N,  N,   N, Y,  Y,  N,  N,   N,  N,  N,  N]),
    (Tier::Avx2, Operation::Div, [N, N,  N,  N,  N,   N, N,  N,  N,  N,   N,  N,  N,  N]),
];

/// Total boolean matrix over tier x operation x numeric type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMatrix {
    cells: [[[bool; NumericType::COUNT]; Operation::COUNT]; Tier::COUNT],
}

impl CapabilityMatrix {
    /// Build the matrix from explicit rows.
    ///
    /// Every (tier, operation) pair needs exactly one row; a later duplicate
    /// replaces an earlier one.
    pub fn from_rows(rows: &[CapabilityRow]) -> GenResult<Self> {
        let mut cells = [[[false; NumericType::COUNT]; Operation::COUNT]; Tier::COUNT];
        let mut seen = [[false; Operation::COUNT]; Tier::COUNT];

        for (tier, op, row) in rows {
            cells[tier.index()][op.index()] = *row;
            seen[tier.index()][op.index()] = true;
        }

        for tier in Tier::ALL {
            for op in Operation::ALL {
                if !seen[tier.index()][op.index()] {
                    return Err(GenError::MissingCapabilityRow { tier, op });
                }
            }
        }

        Ok(Self { cells })
    }

    /// The shipped x86 matrix.
    pub fn x86() -> GenResult<Self> {
        Self::from_rows(DEFAULT_ROWS)
    }

    /// The matrix in which no tier accelerates anything.
    pub fn none() -> Self {
        Self {
            cells: [[[false; NumericType::COUNT]; Operation::COUNT]; Tier::COUNT],
        }
    }

    /// The shipped x86 rows, for callers that want to patch a few cells.
    pub fn default_rows() -> &'static [CapabilityRow] {
        DEFAULT_ROWS
    }

    pub fn supported(&self, tier: Tier, op: Operation, ty: NumericType) -> bool {
        self.cells[tier.index()][op.index()][ty.index()]
    }

    /// Tiers that accelerate `op` over `ty`, narrowest first.
    pub fn tiers_for(&self, op: Operation, ty: NumericType) -> impl Iterator<Item = Tier> + '_ {
        Tier::ALL
            .into_iter()
            .filter(move |&tier| self.supported(tier, op, ty))
    }

    /// Every supported cell.
    pub fn supported_cells(&self) -> impl Iterator<Item = (Tier, Operation, NumericType)> + '_ {
        Tier::ALL.into_iter().flat_map(move |tier| {
            Operation::ALL.into_iter().flat_map(move |op| {
                NumericType::ALL
                    .into_iter()
                    .filter(move |&ty| self.supported(tier, op, ty))
                    .map(move |ty| (tier, op, ty))
            })
        })
    }
}
