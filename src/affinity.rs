//! Best-effort CPU pinning for the hammer threads.
//!
//! Linux:
//!   - CPU pin: pthread_setaffinity_np on the current thread.
//! Elsewhere pinning is a no-op and the scheduler decides placement.

use serde::Serialize;

/// Where to place the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PinConfig {
    /// Optional logical core to pin the thread to.
    pub core_id: Option<usize>,
}

impl PinConfig {
    /// Pin to one logical core.
    pub const fn core(core_id: usize) -> Self {
        Self {
            core_id: Some(core_id),
        }
    }
}

/// Apply `cfg` to the calling thread. Returns `true` if the kernel accepted it.
pub fn pin_current_thread(cfg: &PinConfig) -> bool {
    let Some(core_id) = cfg.core_id else {
        return false;
    };

    #[cfg(target_os = "linux")]
    {
        use core::mem::{size_of, zeroed};

        // cpu_set_t is a fixed bitset; cores past its width cannot be expressed.
        if core_id >= 8 * size_of::<libc::cpu_set_t>() {
            tracing::warn!(core_id, "core id outside cpu_set_t, not pinning");
            return false;
        }
        // SAFETY: the set is plain data sized by libc, and pthread_self is
        // always a valid handle for the calling thread.
        unsafe {
            let mut set: libc::cpu_set_t = zeroed();
            libc::CPU_SET(core_id, &mut set);
            let r = libc::pthread_setaffinity_np(
                libc::pthread_self(),
                size_of::<libc::cpu_set_t>(),
                &set as *const libc::cpu_set_t,
            );
            if r != 0 {
                tracing::warn!(core_id, errno = r, "pthread_setaffinity_np failed");
                return false;
            }
        }
        tracing::debug!(core_id, "pinned worker");
        true
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::debug!(core_id, "thread pinning unsupported on this OS");
        false
    }
}
