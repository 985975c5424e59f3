//! Shared helpers for the kernel tests: element types, placed buffers and a
//! visitor over every generated (operation, type) routine.

#![allow(dead_code)]

use std::fmt::Debug;
use std::mem::size_of;

use lanewise::{kernels, Kernel, Variant};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

/// splitmix64
pub fn mix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub trait Element: Copy + Default + Debug + PartialEq + 'static {
    const IS_FLOAT: bool;

    fn sample(seed: u64) -> Self;

    /// `self`, or one if `self` is zero.
    fn nonzero(self) -> Self;

    fn apply(op: Op, a: Self, b: Self) -> Self;

    /// Bit equality.
    fn same(self, other: Self) -> bool;
}

macro_rules! int_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const IS_FLOAT: bool = false;

                fn sample(seed: u64) -> Self {
                    let x = mix(seed);
                    ((x as u128) << 64 | mix(x) as u128) as $t
                }

                fn nonzero(self) -> Self {
                    if self == 0 { 1 } else { self }
                }

                fn apply(op: Op, a: Self, b: Self) -> Self {
                    match op {
                        Op::Add => a.wrapping_add(b),
                        Op::Sub => a.wrapping_sub(b),
                        Op::Mul => a.wrapping_mul(b),
                        Op::Div => a.wrapping_div(b),
                    }
                }

                fn same(self, other: Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

macro_rules! float_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const IS_FLOAT: bool = true;

                fn sample(seed: u64) -> Self {
                    let unit = (mix(seed) >> 11) as f64 / (1u64 << 53) as f64;
                    (unit * 2000.0 - 1000.0) as $t
                }

                fn nonzero(self) -> Self {
                    if self == 0.0 { 1.0 } else { self }
                }

                fn apply(op: Op, a: Self, b: Self) -> Self {
                    match op {
                        Op::Add => a + b,
                        Op::Sub => a - b,
                        Op::Mul => a * b,
                        Op::Div => a / b,
                    }
                }

                fn same(self, other: Self) -> bool {
                    self.to_bits() == other.to_bits()
                }
            }
        )*
    };
}

int_element!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);
float_element!(f32, f64);

/// Inputs of length `len`; divisors are never zero.
pub fn inputs<T: Element>(op: Op, len: usize, seed: u64) -> (Vec<T>, Vec<T>) {
    let a = (0..len).map(|i| T::sample(seed.wrapping_mul(1_000_003) ^ (2 * i as u64))).collect();
    let b = (0..len)
        .map(|i| {
            let x = T::sample(seed.wrapping_mul(1_000_003) ^ (2 * i as u64 + 1));
            if op == Op::Div { x.nonzero() } else { x }
        })
        .collect();
    (a, b)
}

pub fn reference<T: Element>(op: Op, a: &[T], b: &[T]) -> Vec<T> {
    a.iter().zip(b).map(|(&x, &y)| T::apply(op, x, y)).collect()
}

/// A copy of some values starting `shift` elements past a 32-byte boundary,
/// followed by `spare` extra elements.
pub struct Placed<T> {
    storage: Vec<T>,
    start: usize,
    len: usize,
}

impl<T: Element> Placed<T> {
    pub fn new(values: &[T], shift: usize, spare: &[T]) -> Self {
        let pad = 64 / size_of::<T>() + shift;
        let mut storage = vec![T::default(); pad + values.len() + spare.len()];
        let start = storage.as_ptr().align_offset(32) + shift;
        storage[start..start + values.len()].copy_from_slice(values);
        storage[start + values.len()..start + values.len() + spare.len()].copy_from_slice(spare);
        Self {
            storage,
            start,
            len: values.len(),
        }
    }

    pub fn as_ptr(&self) -> *const T {
        self.storage[self.start..].as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.storage[self.start..].as_mut_ptr()
    }

    pub fn values(&self) -> &[T] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn spare(&self, count: usize) -> &[T] {
        &self.storage[self.start + self.len..self.start + self.len + count]
    }
}

/// Run `kernel` with a, b and c shifted by `shifts` elements from 32-byte
/// alignment.
pub fn run<T: Element>(kernel: Kernel<T>, a: &[T], b: &[T], shifts: [usize; 3]) -> Vec<T> {
    assert_eq!(a.len(), b.len());
    let pa = Placed::new(a, shifts[0], &[]);
    let pb = Placed::new(b, shifts[1], &[]);
    let mut pc = Placed::new(&vec![T::default(); a.len()], shifts[2], &[]);
    unsafe { kernel(pa.as_ptr(), pb.as_ptr(), pc.as_mut_ptr(), a.len()) };
    pc.values().to_vec()
}

#[track_caller]
pub fn assert_same<T: Element>(got: &[T], want: &[T], context: &str) {
    assert_eq!(got.len(), want.len(), "{context}");
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        assert!(g.same(*w), "{context}: element {i}: got {g:?}, want {w:?}");
    }
}

/// Lanes per register for `variant`.
pub fn width<T>(variant: &Variant<T>) -> usize {
    variant.tier().lanes(size_of::<T>())
}

/// Variants the running CPU can execute.
pub fn available<T>(variants: &[Variant<T>]) -> impl Iterator<Item = &Variant<T>> {
    variants.iter().filter(|v| v.is_available())
}

/// One generated routine.
pub struct Cell<T> {
    pub name: &'static str,
    pub op: Op,
    pub default: Kernel<T>,
    pub variants: Vec<Variant<T>>,
    pub resolved: Kernel<T>,
}

pub trait CellVisitor {
    fn visit<T: Element>(&mut self, cell: Cell<T>);
}

macro_rules! visit_cells {
    ($visitor:ident; $($op:ident $ty:ident: $default:ident $variants:ident $resolved:ident;)*) => {
        $(
            $visitor.visit(Cell::<$ty> {
                name: stringify!($resolved),
                op: Op::$op,
                default: kernels::$default,
                variants: kernels::$variants(),
                resolved: kernels::$resolved,
            });
        )*
    };
}

pub fn for_each_cell(visitor: &mut impl CellVisitor) {
    visit_cells! {
        visitor;
        Add i8: add_i8_default add_i8_variants add_i8;
        Add i16: add_i16_default add_i16_variants add_i16;
        Add i32: add_i32_default add_i32_variants add_i32;
        Add i64: add_i64_default add_i64_variants add_i64;
        Add i128: add_i128_default add_i128_variants add_i128;
        Add u8: add_u8_default add_u8_variants add_u8;
        Add u16: add_u16_default add_u16_variants add_u16;
        Add u32: add_u32_default add_u32_variants add_u32;
        Add u64: add_u64_default add_u64_variants add_u64;
        Add u128: add_u128_default add_u128_variants add_u128;
        Add f32: add_f32_default add_f32_variants add_f32;
        Add f64: add_f64_default add_f64_variants add_f64;
        Sub i8: sub_i8_default sub_i8_variants sub_i8;
        Sub i16: sub_i16_default sub_i16_variants sub_i16;
        Sub i32: sub_i32_default sub_i32_variants sub_i32;
        Sub i64: sub_i64_default sub_i64_variants sub_i64;
        Sub i128: sub_i128_default sub_i128_variants sub_i128;
        Sub u8: sub_u8_default sub_u8_variants sub_u8;
        Sub u16: sub_u16_default sub_u16_variants sub_u16;
        Sub u32: sub_u32_default sub_u32_variants sub_u32;
        Sub u64: sub_u64_default sub_u64_variants sub_u64;
        Sub u128: sub_u128_default sub_u128_variants sub_u128;
        Sub f32: sub_f32_default sub_f32_variants sub_f32;
        Sub f64: sub_f64_default sub_f64_variants sub_f64;
        Mul i8: mul_i8_default mul_i8_variants mul_i8;
        Mul i16: mul_i16_default mul_i16_variants mul_i16;
        Mul i32: mul_i32_default mul_i32_variants mul_i32;
        Mul i64: mul_i64_default mul_i64_variants mul_i64;
        Mul i128: mul_i128_default mul_i128_variants mul_i128;
        Mul u8: mul_u8_default mul_u8_variants mul_u8;
        Mul u16: mul_u16_default mul_u16_variants mul_u16;
        Mul u32: mul_u32_default mul_u32_variants mul_u32;
        Mul u64: mul_u64_default mul_u64_variants mul_u64;
        Mul u128: mul_u128_default mul_u128_variants mul_u128;
        Mul f32: mul_f32_default mul_f32_variants mul_f32;
        Mul f64: mul_f64_default mul_f64_variants mul_f64;
        Div i8: div_i8_default div_i8_variants div_i8;
        Div i16: div_i16_default div_i16_variants div_i16;
        Div i32: div_i32_default div_i32_variants div_i32;
        Div i64: div_i64_default div_i64_variants div_i64;
        Div i128: div_i128_default div_i128_variants div_i128;
        Div u8: div_u8_default div_u8_variants div_u8;
        Div u16: div_u16_default div_u16_variants div_u16;
        Div u32: div_u32_default div_u32_variants div_u32;
        Div u64: div_u64_default div_u64_variants div_u64;
        Div u128: div_u128_default div_u128_variants div_u128;
        Div f32: div_f32_default div_f32_variants div_f32;
        Div f64: div_f64_default div_f64_variants div_f64;
    }
}
