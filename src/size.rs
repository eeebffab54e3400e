//! Human-readable file sizes for catalog rows.
//!
//! Units step at powers of 1024 and are written lowercase after a space:
//! `658 b`, `32.4 kb`, `8.1 mb`, `1.9 gb`, `1.1 tb`. Anything from one
//! exbibyte up is collapsed into the literal `> 1 eb`.

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;
const TB: u64 = 1 << 40;
const PB: u64 = 1 << 50;
const EB: u64 = 1 << 60;

/// Unit table: (exclusive upper bound, divisor, suffix).
const UNITS: &[(u64, u64, &str)] = &[
    (MB, KB, "kb"),
    (GB, MB, "mb"),
    (TB, GB, "gb"),
    (PB, TB, "tb"),
    (EB, PB, "pb"),
];

/// Format a byte count for display.
///
/// Bytes are printed as-is; every larger unit is rounded to one decimal,
/// with ties going away from zero (`1280` is `1.3 kb`).
///
/// ```
/// # use doclib::size::format_size;
/// assert_eq!(format_size(658), "658 b");
/// assert_eq!(format_size(33_178), "32.4 kb");
/// assert_eq!(format_size(1 << 60), "> 1 eb");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < KB {
        return format!("{} b", bytes);
    }
    for &(limit, divisor, unit) in UNITS {
        if bytes < limit {
            // `{:.1}` alone would round ties to even
            let value = (bytes as f64 / divisor as f64 * 10.0).round() / 10.0;
            return format!("{:.1} {}", value, unit);
        }
    }
    "> 1 eb".to_string()
}
