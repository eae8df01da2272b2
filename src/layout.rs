//! Alignment helpers and the cross-process monotonic clock.
//!
//! Kept deliberately small and allocation-free: everything here runs on the
//! builder's single layout pass or on the publish/consume hot path.

/// Cache line size assumed for false-sharing avoidance. True on every
/// mainstream x86_64/aarch64 target this crate is built for.
pub const CACHE_LINE: usize = 64;

/// Round `value` up to the next multiple of `align` (`align` must be a power
/// of two).
#[inline]
pub const fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Round `value` up to the next power of two. `0` rounds up to `1`.
#[inline]
pub fn next_power_of_two(value: u64) -> u64 {
    if value <= 1 {
        1
    } else {
        value.next_power_of_two()
    }
}

/// A nanosecond timestamp read from `CLOCK_MONOTONIC`.
///
/// This crate never reads `CLOCK_REALTIME`: wall-clock time can jump
/// (NTP steps, leap seconds) and slot headers are compared for ordering
/// only within a single boot, which is exactly what `CLOCK_MONOTONIC`
/// guarantees across the processes that share one mapped region on the
/// same machine. `std::time::Instant` is avoided on purpose — it makes no
/// cross-process comparability guarantee.
#[inline]
pub fn monotonic_now_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // Safety: `ts` is a valid, local `timespec` and `CLOCK_MONOTONIC` is
    // supported on every platform this crate builds for.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    debug_assert_eq!(rc, 0, "clock_gettime(CLOCK_MONOTONIC) failed");
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 64), 0);
        assert_eq!(align_up(1, 64), 64);
        assert_eq!(align_up(64, 64), 64);
        assert_eq!(align_up(65, 64), 128);
        assert_eq!(align_up(32, 8), 32);
        assert_eq!(align_up(33, 8), 40);
    }

    #[test]
    fn next_pow2_rounds_correctly() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(2), 2);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(1024), 1024);
        assert_eq!(next_power_of_two(1025), 2048);
    }

    #[test]
    fn monotonic_clock_is_nondecreasing() {
        let a = monotonic_now_ns();
        let b = monotonic_now_ns();
        assert!(b >= a);
    }
}
