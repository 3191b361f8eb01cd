//! Unit conversion policy for persisted samples.
//!
//! Downstream delta tooling expects these exact factors; change them and every
//! previously captured run stops being comparable.

/// Seconds (or USER_HZ-normalised ticks) to centiseconds.
pub const CENTIS_PER_SECOND: f64 = 100.0;

/// Bytes to the "kilobyte-equivalent" used by memory fields.
pub const MEMORY_SCALE: f64 = 1.0 / 1000.0;

/// Kernel clock ticks per second as exposed to userspace (`USER_HZ`).
pub const USER_HZ: f64 = 100.0;

/// Bytes per disk sector in `/proc/diskstats` and blkio counters.
pub const SECTOR_BYTES: u64 = 512;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * 1024;

/// Clock ticks (jiffies) to centiseconds.
#[inline]
pub fn ticks_to_centis(ticks: u64) -> f64 {
    ticks as f64 / USER_HZ * CENTIS_PER_SECOND
}

/// Microseconds to centiseconds.
#[inline]
pub fn usec_to_centis(usec: u64) -> f64 {
    usec as f64 / 1_000_000.0 * CENTIS_PER_SECOND
}

/// Memory bytes to the persisted memory unit, rounded like the delta tooling does.
#[inline]
pub fn bytes_to_memory_unit(bytes: u64) -> u64 {
    (bytes as f64 * MEMORY_SCALE).round() as u64
}

/// Event counters that historically carry the time multiplier as well.
#[inline]
pub fn scaled_counter(count: u64) -> u64 {
    count.saturating_mul(CENTIS_PER_SECOND as u64)
}

/// Parse a sysfs cache size (`32K`, `8M`, `1024`) into bytes.
pub fn parse_cache_size(raw: &str) -> Option<u64> {
    let s = raw.trim();
    let (digits, mult) = match s.chars().last()? {
        'K' => (&s[..s.len() - 1], KIB),
        'M' => (&s[..s.len() - 1], MIB),
        _ => (s, 1),
    };
    digits.trim().parse::<u64>().ok().map(|v| v.saturating_mul(mult))
}
