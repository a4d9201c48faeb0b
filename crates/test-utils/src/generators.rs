//! Test data generators for creating synthetic swath-like data.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Measurement value at (spot, scan, channel).
///
/// Calculated as `spot * 1000 + scan * 10 + channel`, where `channel` is the
/// 1-based channel number. Values are unique while there are fewer than 100
/// scans and 10 channels, so a test can recover where an output value came
/// from.
///
/// # Example
///
/// ```
/// use test_utils::swath_value;
///
/// assert_eq!(swath_value(2, 3, 1), 2031.0);
/// ```
pub fn swath_value(spot: usize, scan: usize, channel: usize) -> f32 {
    (spot * 1000 + scan * 10 + channel) as f32
}

/// Creates a (spots, scans, channels) measurement cube of [`swath_value`]s,
/// flattened with the channel index varying fastest.
pub fn create_swath_cube(n_spots: usize, n_scans: usize, n_channels: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(n_spots * n_scans * n_channels);
    for spot in 0..n_spots {
        for scan in 0..n_scans {
            for channel in 1..=n_channels {
                data.push(swath_value(spot, scan, channel));
            }
        }
    }
    data
}

/// Latitude at (spot, scan): one half degree per scan, starting at -45.
pub fn swath_latitude(_spot: usize, scan: usize) -> f32 {
    -45.0 + scan as f32 * 0.5
}

/// Longitude at (spot, scan): one half degree per spot, starting at 100.
pub fn swath_longitude(spot: usize, _scan: usize) -> f32 {
    100.0 + spot as f32 * 0.5
}

/// Applies `f` to every (spot, scan) pair, spot-major.
pub fn create_location_field<F>(n_spots: usize, n_scans: usize, f: F) -> Vec<f32>
where
    F: Fn(usize, usize) -> f32,
{
    let mut data = Vec::with_capacity(n_spots * n_scans);
    for spot in 0..n_spots {
        for scan in 0..n_scans {
            data.push(f(spot, scan));
        }
    }
    data
}

/// Creates a flag array where every `every`-th element carries `bits`.
///
/// Element 0 is always flagged (unless `every` is 0, which flags nothing).
pub fn create_sparse_flags(len: usize, every: usize, bits: i64) -> Vec<i64> {
    (0..len)
        .map(|i| if every > 0 && i % every == 0 { bits } else { 0 })
        .collect()
}

/// Per-scan calendar columns in `Year..Second` order.
///
/// Scan `j` is `j` seconds after `start`; seconds and minutes are carried so
/// every row is a valid calendar time for fewer than 3600 scans.
pub fn create_scan_calendar(
    n_scans: usize,
    start: (i64, i64, i64, i64, i64, i64),
) -> [Vec<i64>; 6] {
    let (year, month, day, hour, minute, second) = start;
    let mut columns: [Vec<i64>; 6] = Default::default();
    for j in 0..n_scans as i64 {
        let total = minute * 60 + second + j;
        let row = [year, month, day, hour + total / 3600, (total / 60) % 60, total % 60];
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }
    columns
}
