//! Quality-flag repacking.
//!
//! The per-element `combinedQualityFlag` word in the swath files does not
//! match the overall quality flag of the BUFR product. Repacking rebuilds the
//! BUFR good/bad decision from the raw bits plus the `flagSDRTX` byte.
//!
//! | BUFR bit | Meaning                                     | Raw bit |
//! |----------|---------------------------------------------|---------|
//! | 7        | Outlier, internal calibration target spots  | 7       |
//! | 8        | Outlier, noise diode calibration spots      | 8       |
//! | 9        | Outlier, deep space calibration spots       | 9       |
//! | 13       | Spacecraft in active maneuver               | 13      |
//! | 14       | Solar intrusion                             | 14      |
//! | 15       | Lunar intrusion                             | 15      |
//! | 16       | Radio frequency interference                | 4       |
//! | 17       | Internal cal target / noise diode consistency | 5     |
//! | 19, 20   | Attitude quality                            | 6       |
//! | 21       | Software-defined radio transmit             | `flagSDRTX` |
//! | 22       | Outlier timestamp                           | 3       |
//!
//! Raw bits are numbered from the least significant bit, starting at 1.
//! This table is part of the reference contract and must not change on
//! its own.

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};

/// Pre-QC value of a good element.
pub const GOOD: i32 = 0;
/// Pre-QC value of a bad element.
pub const BAD: i32 = 1;

/// Mask for raw bit `n` (1-based).
const fn bit(n: u32) -> u16 {
    1 << (n - 1)
}

pub const OUTLIER_ICT: u16 = bit(7);
pub const OUTLIER_NOISE_DIODE: u16 = bit(8);
pub const OUTLIER_DEEP_SPACE: u16 = bit(9);
pub const MANEUVER: u16 = bit(13);
pub const SOLAR_INTRUSION: u16 = bit(14);
pub const LUNAR_INTRUSION: u16 = bit(15);
pub const RFI: u16 = bit(4);
pub const ICT_NOISE_DIODE_CONSISTENCY: u16 = bit(5);
pub const ATTITUDE_QUALITY: u16 = bit(6);
pub const OUTLIER_TIMESTAMP: u16 = bit(3);

/// Every raw bit that marks an element bad.
pub const BAD_MASK: u16 = OUTLIER_TIMESTAMP
    | RFI
    | ICT_NOISE_DIODE_CONSISTENCY
    | ATTITUDE_QUALITY
    | OUTLIER_ICT
    | OUTLIER_NOISE_DIODE
    | OUTLIER_DEEP_SPACE
    | MANEUVER
    | SOLAR_INTRUSION
    | LUNAR_INTRUSION;

/// How the raw flag becomes the pre-QC value.
///
/// The same instrument has been converted both ways. Until one is confirmed
/// as canonical both stay available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcPolicy {
    /// Rebuild the BUFR good/bad flag from the raw bits and secondary flag.
    Repacked,
    /// Copy the raw flag word unchanged.
    Passthrough,
}

impl QcPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            QcPolicy::Repacked => "repacked",
            QcPolicy::Passthrough => "passthrough",
        }
    }
}

/// Good/bad decision for one element.
#[inline]
pub fn is_bad(raw: i64, secondary: i64) -> bool {
    // Only the low 16 bits carry the flag word
    (raw as u16) & BAD_MASK != 0 || secondary != 0
}

/// Repack raw flags into [`GOOD`]/[`BAD`] values.
///
/// `secondary`, when present, must have the same length as `raw`.
pub fn repack(raw: &[i64], secondary: Option<&[i64]>) -> Result<Vec<i32>> {
    match secondary {
        Some(sec) => {
            if sec.len() != raw.len() {
                return Err(IngestionError::ShapeMismatch(format!(
                    "secondary flag has {} elements, raw flag has {}",
                    sec.len(),
                    raw.len()
                )));
            }
            Ok(raw
                .iter()
                .zip(sec)
                .map(|(&r, &s)| if is_bad(r, s) { BAD } else { GOOD })
                .collect())
        }
        None => Ok(raw
            .iter()
            .map(|&r| if is_bad(r, 0) { BAD } else { GOOD })
            .collect()),
    }
}

/// Apply a [`QcPolicy`] to a raw flag array.
pub fn apply_policy(policy: QcPolicy, raw: &[i64], secondary: Option<&[i64]>) -> Result<Vec<i32>> {
    match policy {
        QcPolicy::Repacked => repack(raw, secondary),
        QcPolicy::Passthrough => Ok(raw.iter().map(|&r| r as i32).collect()),
    }
}
