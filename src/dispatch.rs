// This module holds the runtime half of variant selection. Every generated (operation, type)
// pair exposes its compiled accelerated variants as a list of Variant values, narrowest tier
// first, and its resolved backend calls resolve() once to pick the last variant whose tier is
// available on the running CPU, falling back to the scalar default. The choice is cached by
// the caller in a OnceLock. is_aligned() is the per-pointer probe the variants use to choose
// between aligned and unaligned loads and stores.

//! Variant lists, runtime resolution and the alignment probe.

use std::fmt;

use crate::kernels::Tier;

/// Signature shared by every default, variant and resolved backend.
pub type Kernel<T> = unsafe fn(*const T, *const T, *mut T, usize);

/// An accelerated variant together with the tier it needs.
pub struct Variant<T> {
    tier: Tier,
    kernel: Kernel<T>,
}

impl<T> Clone for Variant<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Variant<T> {}

impl<T> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("tier", &self.tier)
            .field("kernel", &(self.kernel as *const ()))
            .finish()
    }
}

impl<T> Variant<T> {
    pub fn new(tier: Tier, kernel: Kernel<T>) -> Self {
        Self { tier, kernel }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn kernel(&self) -> Kernel<T> {
        self.kernel
    }

    pub fn is_available(&self) -> bool {
        self.tier.is_available()
    }

    /// Run the variant.
    ///
    /// # Safety
    ///
    /// The tier must be available, `a` and `b` valid for `len` reads and `c`
    /// valid for `len` writes without overlapping either input.
    pub unsafe fn call(&self, a: *const T, b: *const T, c: *mut T, len: usize) {
        (self.kernel)(a, b, c, len)
    }
}

/// Pick the widest available variant, or `default` if none is.
///
/// `variants` is ordered narrowest first.
pub fn resolve<T>(op: &str, ty: &str, default: Kernel<T>, variants: &[Variant<T>]) -> Kernel<T> {
    match variants.iter().rev().find(|v| v.is_available()) {
        Some(variant) => {
            log::debug!("{op}/{ty}: using the {} variant", variant.tier());
            variant.kernel()
        }
        None => {
            log::debug!("{op}/{ty}: no accelerated variant available, using the default");
            default
        }
    }
}

/// Whether `ptr` is a multiple of `alignment` bytes.
#[inline(always)]
pub fn is_aligned<P>(ptr: *const P, alignment: usize) -> bool {
    (ptr as usize) % alignment == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn mark<const M: u8>(_a: *const u8, _b: *const u8, c: *mut u8, len: usize) {
        for i in 0..len {
            *c.add(i) = M;
        }
    }

    fn run(kernel: Kernel<u8>) -> u8 {
        let mut out = [0u8; 1];
        unsafe { kernel([0].as_ptr(), [0].as_ptr(), out.as_mut_ptr(), 1) };
        out[0]
    }

    #[test]
    fn test_is_aligned() {
        let buf = [0u64; 8];
        let p = buf.as_ptr().cast::<u8>();
        let base = p.align_offset(32);
        let p = unsafe { p.add(base) };
        assert!(is_aligned(p, 32));
        assert!(is_aligned(p, 8));
        assert!(!is_aligned(unsafe { p.add(1) }, 2));
        assert!(is_aligned(unsafe { p.add(16) }, 16));
        assert!(!is_aligned(unsafe { p.add(16) }, 32));
    }

    #[test]
    fn test_resolve_without_variants_uses_default() {
        let _ = env_logger::builder().is_test(true).try_init();
        assert_eq!(run(resolve("add", "u8", mark::<1>, &[])), 1);
    }

    #[test]
    fn test_resolve_prefers_last_available() {
        let _ = env_logger::builder().is_test(true).try_init();
        let kernels: [Kernel<u8>; 5] = [mark::<10>, mark::<11>, mark::<12>, mark::<13>, mark::<14>];
        let variants: Vec<_> = Tier::ALL
            .into_iter()
            .zip(kernels)
            .map(|(tier, kernel)| Variant::new(tier, kernel))
            .collect();

        let expected = Tier::ALL
            .into_iter()
            .enumerate()
            .rev()
            .find(|(_, tier)| tier.is_available())
            .map_or(1, |(i, _)| 10 + i as u8);
        assert_eq!(run(resolve("add", "u8", mark::<1>, &variants)), expected);
    }

    #[test]
    fn test_variant_accessors() {
        let variant = Variant::new(Tier::Sse2, mark::<7> as Kernel<u8>);
        let copy = variant;
        assert_eq!(copy.tier(), Tier::Sse2);
        assert_eq!(run(variant.kernel()), 7);
        assert!(format!("{variant:?}").starts_with("Variant { tier: Sse2"));
    }
}
