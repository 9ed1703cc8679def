use core::ops::Add;

/// A physical address on the PS side of the SoC.
///
/// The bus is a flat space, so no canonicalization is performed; the type
/// exists to keep addresses from mixing with plain sizes and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(u64);

impl PhysAddr {
    #[must_use]
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[must_use]
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[must_use]
    #[inline]
    pub const fn as_ptr<T>(self) -> *const T {
        self.0 as _
    }

    #[must_use]
    #[inline]
    pub const fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as _
    }
}

impl Add<u64> for PhysAddr {
    type Output = Self;

    #[inline]
    fn add(self, rhs: u64) -> Self {
        Self(self.0 + rhs)
    }
}

impl core::fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::PhysAddr;

    #[test]
    fn offset_arithmetic() {
        let base = PhysAddr::new(0x2000_0000);
        assert_eq!((base + 0x1000).as_u64(), 0x2000_1000);
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(format!("{:#x}", PhysAddr::new(0xA000_0004)), "0xa0000004");
    }
}
