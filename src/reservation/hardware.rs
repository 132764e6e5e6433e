//! Native reservation instructions.
//!
//! riscv: `lr.w` / `sc.w`
//! aarch64: `ldxr` / `stxr`
//! arm: `ldrex` / `strex`
//!
//! Every other architecture gets an uninhabited [`Hardware`] and
//! [`Hardware::detect`] reports the platform as unsupported.

use core::sync::atomic::AtomicU32;

use super::Reservation;
use crate::error::Result;

#[cfg(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
))]
#[derive(Clone, Copy, Debug)]
enum Platform {
    Native,
}

#[cfg(not(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
)))]
#[derive(Clone, Copy, Debug)]
enum Platform {}

/// The target CPU's own reserve/conditional-store pair.
#[derive(Clone, Copy, Debug)]
pub struct Hardware {
    platform: Platform,
}

impl Hardware {
    /// Whether this build has a native implementation.
    pub const SUPPORTED: bool = cfg!(any(
        target_arch = "riscv64",
        target_arch = "riscv32",
        target_arch = "aarch64",
        target_arch = "arm"
    ));

    /// Obtain the native implementation, or fail closed.
    pub fn detect() -> Result<Self> {
        #[cfg(any(
            target_arch = "riscv64",
            target_arch = "riscv32",
            target_arch = "aarch64",
            target_arch = "arm"
        ))]
        {
            Ok(Self {
                platform: Platform::Native,
            })
        }
        #[cfg(not(any(
            target_arch = "riscv64",
            target_arch = "riscv32",
            target_arch = "aarch64",
            target_arch = "arm"
        )))]
        {
            Err(crate::error::ProbeError::UnsupportedPlatform {
                arch: std::env::consts::ARCH,
            })
        }
    }
}

#[cfg(any(target_arch = "riscv64", target_arch = "riscv32"))]
impl Reservation for Hardware {
    #[inline(always)]
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32 {
        let Platform::Native = self.platform;
        let value: u32;
        // SAFETY: `cell` is a live, aligned u32 for the duration of the call.
        unsafe {
            core::arch::asm!(
                "lr.w {v}, ({p})",
                v = out(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool {
        let rc: u32;
        // SAFETY: as above; sc.w writes only when the reservation still holds.
        unsafe {
            core::arch::asm!(
                "sc.w {rc}, {v}, ({p})",
                rc = out(reg) rc,
                v = in(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        rc == 0
    }

    fn name(&self) -> &'static str {
        "lr.w/sc.w"
    }
}

#[cfg(target_arch = "aarch64")]
impl Reservation for Hardware {
    #[inline(always)]
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32 {
        let Platform::Native = self.platform;
        let value: u32;
        // SAFETY: `cell` is a live, aligned u32 for the duration of the call.
        unsafe {
            core::arch::asm!(
                "ldxr {v:w}, [{p}]",
                v = out(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool {
        let rc: u32;
        // SAFETY: as above; stxr writes only while the exclusive monitor is held.
        unsafe {
            core::arch::asm!(
                "stxr {rc:w}, {v:w}, [{p}]",
                rc = out(reg) rc,
                v = in(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        rc == 0
    }

    fn name(&self) -> &'static str {
        "ldxr/stxr"
    }
}

#[cfg(target_arch = "arm")]
impl Reservation for Hardware {
    #[inline(always)]
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32 {
        let Platform::Native = self.platform;
        let value: u32;
        // SAFETY: `cell` is a live, aligned u32 for the duration of the call.
        unsafe {
            core::arch::asm!(
                "ldrex {v}, [{p}]",
                v = out(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        value
    }

    #[inline(always)]
    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool {
        let rc: u32;
        // SAFETY: as above; strex writes only while the exclusive monitor is held.
        unsafe {
            core::arch::asm!(
                "strex {rc}, {v}, [{p}]",
                rc = out(reg) rc,
                v = in(reg) value,
                p = in(reg) cell.as_ptr(),
                options(nostack),
            );
        }
        rc == 0
    }

    fn name(&self) -> &'static str {
        "ldrex/strex"
    }
}

#[cfg(not(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
)))]
impl Reservation for Hardware {
    fn load_reserved(&mut self, _cell: &AtomicU32) -> u32 {
        match self.platform {}
    }

    fn store_conditional(&mut self, _cell: &AtomicU32, _value: u32) -> bool {
        match self.platform {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;

    #[test]
    fn detect_matches_build_support() {
        assert_eq!(Hardware::detect().is_ok(), Hardware::SUPPORTED);
    }

    #[test]
    fn unsupported_build_fails_closed() {
        if let Err(err) = Hardware::detect() {
            assert!(matches!(err, ProbeError::UnsupportedPlatform { .. }));
            assert!(err.to_string().contains(std::env::consts::ARCH));
        }
    }

    #[cfg(any(
        target_arch = "riscv64",
        target_arch = "riscv32",
        target_arch = "aarch64",
        target_arch = "arm"
    ))]
    #[test]
    fn uncontended_pair_commits() {
        let mut hw = Hardware::detect().unwrap();
        let cell = AtomicU32::new(41);
        let mut attempts = 0;
        loop {
            attempts += 1;
            let v = hw.load_reserved(&cell);
            if hw.store_conditional(&cell, v + 1) {
                break;
            }
            assert!(attempts < 1000, "store-conditional never committed");
        }
        assert_eq!(cell.load(core::sync::atomic::Ordering::SeqCst), 42);
    }
}
