//! 64-bit packed lanes for the narrow (`mmx`) tier.
//!
//! `core::arch` has no 64-bit vector type, so [`Mm64`] keeps 8, 4 or 2 lanes
//! in a `u64` and the packed operations are done with SWAR arithmetic: lanes
//! are added or subtracted with their top bit masked off so no carry or borrow
//! crosses a lane boundary, then the top bits are patched back in.

/// Eight 8-bit, four 16-bit or two 32-bit lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct Mm64(u64);

const HIGH_8: u64 = 0x8080_8080_8080_8080;
const HIGH_16: u64 = 0x8000_8000_8000_8000;
const HIGH_32: u64 = 0x8000_0000_8000_0000;

impl Mm64 {
    pub const fn from_bits(bits: u64) -> Self {
        Mm64(bits)
    }

    pub const fn to_bits(self) -> u64 {
        self.0
    }
}

/// Load 8 bytes from an 8-byte aligned address.
///
/// # Safety
///
/// `ptr` must be valid for an 8-byte read and aligned for `Mm64`.
#[inline(always)]
pub unsafe fn load<T>(ptr: *const T) -> Mm64 {
    ptr.cast::<Mm64>().read()
}

/// # Safety
///
/// `ptr` must be valid for an 8-byte read.
#[inline(always)]
pub unsafe fn loadu<T>(ptr: *const T) -> Mm64 {
    ptr.cast::<Mm64>().read_unaligned()
}

/// # Safety
///
/// `ptr` must be valid for an 8-byte write and aligned for `Mm64`.
#[inline(always)]
pub unsafe fn store<T>(ptr: *mut T, value: Mm64) {
    ptr.cast::<Mm64>().write(value)
}

/// # Safety
///
/// `ptr` must be valid for an 8-byte write.
#[inline(always)]
pub unsafe fn storeu<T>(ptr: *mut T, value: Mm64) {
    ptr.cast::<Mm64>().write_unaligned(value)
}

#[inline(always)]
fn swar_add(a: u64, b: u64, high: u64) -> u64 {
    ((a & !high).wrapping_add(b & !high)) ^ ((a ^ b) & high)
}

#[inline(always)]
fn swar_sub(a: u64, b: u64, high: u64) -> u64 {
    ((a | high).wrapping_sub(b & !high)) ^ ((a ^ !b) & high)
}

#[inline(always)]
pub fn add_pi8(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_add(a.0, b.0, HIGH_8))
}

#[inline(always)]
pub fn add_pi16(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_add(a.0, b.0, HIGH_16))
}

#[inline(always)]
pub fn add_pi32(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_add(a.0, b.0, HIGH_32))
}

#[inline(always)]
pub fn sub_pi8(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_sub(a.0, b.0, HIGH_8))
}

#[inline(always)]
pub fn sub_pi16(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_sub(a.0, b.0, HIGH_16))
}

#[inline(always)]
pub fn sub_pi32(a: Mm64, b: Mm64) -> Mm64 {
    Mm64(swar_sub(a.0, b.0, HIGH_32))
}

/// Low 16 bits of each 16-bit lane product.
#[inline(always)]
pub fn mullo_pi16(a: Mm64, b: Mm64) -> Mm64 {
    let mut out = 0u64;
    for shift in (0..64).step_by(16) {
        let x = (a.0 >> shift) as u16;
        let y = (b.0 >> shift) as u16;
        out |= u64::from(x.wrapping_mul(y)) << shift;
    }
    Mm64(out)
}

/// Release the x87/MMX register file after a run of narrow-tier code.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[inline(always)]
pub fn empty() {
    // SAFETY: `emms` only resets the x87 tag word, and every x87 register is
    // declared clobbered so the stack is empty around it.
    unsafe {
        core::arch::asm!(
            "emms",
            out("st(0)") _,
            out("st(1)") _,
            out("st(2)") _,
            out("st(3)") _,
            out("st(4)") _,
            out("st(5)") _,
            out("st(6)") _,
            out("st(7)") _,
            options(nostack, preserves_flags),
        );
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[inline(always)]
pub fn empty() {}
