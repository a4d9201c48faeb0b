//! Flattened observation output.
//!
//! An [`ObservationSet`] holds `n_locs` retained locations and `n_chans`
//! selected channels. Per-channel arrays are laid out location-major,
//! channel-minor: element `(loc, k)` lives at `n_chans * loc + k`.

use serde::{Deserialize, Serialize};

use crate::error::{ObsError, ObsResult};

/// Time origin label attached to every observation set.
pub const REFERENCE_EPOCH: &str = "seconds since 1970-01-01T00:00:00Z";

/// Row-major per-location metadata: one row per location, one column per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTable<T> {
    names: Vec<String>,
    rows: usize,
    values: Vec<T>,
}

impl<T: Copy + Default> MetadataTable<T> {
    /// Create a zero-filled table with `rows` rows and one column per name.
    pub fn new(names: Vec<String>, rows: usize) -> Self {
        let values = vec![T::default(); rows * names.len()];
        Self {
            names,
            rows,
            values,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Number of rows (locations).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn row(&self, loc: usize) -> &[T] {
        let w = self.width();
        &self.values[loc * w..(loc + 1) * w]
    }

    pub fn row_mut(&mut self, loc: usize) -> &mut [T] {
        let w = self.width();
        &mut self.values[loc * w..(loc + 1) * w]
    }

    /// Copy out a single named column, in location order.
    pub fn column(&self, name: &str) -> Option<Vec<T>> {
        let col = self.names.iter().position(|n| n == name)?;
        let w = self.width();
        Some((0..self.rows).map(|loc| self.values[loc * w + col]).collect())
    }
}

/// Output of one conversion call.
///
/// Created pre-sized by [`ObservationSet::with_shape`] and filled by the
/// assembler; never mutated after it is returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationSet {
    n_locs: usize,
    n_chans: usize,
    /// Latitude per location (degrees north)
    pub latitude: Vec<f32>,
    /// Longitude per location (degrees east)
    pub longitude: Vec<f32>,
    /// Seconds since [`REFERENCE_EPOCH`] per location
    pub datetime: Vec<f64>,
    /// Measurement per (location, channel)
    pub obs_value: Vec<f32>,
    /// Observation error per (location, channel)
    pub obs_error: Vec<f32>,
    /// Pre-QC flag per (location, channel)
    pub pre_qc: Vec<i32>,
    /// 1-based channel numbers in selection order
    pub channel_number: Vec<i32>,
    pub float_metadata: MetadataTable<f32>,
    pub int_metadata: MetadataTable<i32>,
    pub reference_epoch: String,
}

impl ObservationSet {
    /// Allocate an observation set for `n_locs` locations and the given channels.
    pub fn with_shape(
        n_locs: usize,
        channels: &[i32],
        float_metadata_names: Vec<String>,
        int_metadata_names: Vec<String>,
    ) -> Self {
        let n_chans = channels.len();
        Self {
            n_locs,
            n_chans,
            latitude: vec![0.0; n_locs],
            longitude: vec![0.0; n_locs],
            datetime: vec![0.0; n_locs],
            obs_value: vec![0.0; n_locs * n_chans],
            obs_error: vec![0.0; n_locs * n_chans],
            pre_qc: vec![0; n_locs * n_chans],
            channel_number: channels.to_vec(),
            float_metadata: MetadataTable::new(float_metadata_names, n_locs),
            int_metadata: MetadataTable::new(int_metadata_names, n_locs),
            reference_epoch: REFERENCE_EPOCH.to_string(),
        }
    }

    /// The "file unusable" result: no locations, no channels.
    pub fn empty() -> Self {
        Self::with_shape(0, &[], Vec::new(), Vec::new())
    }

    pub fn n_locs(&self) -> usize {
        self.n_locs
    }

    pub fn n_chans(&self) -> usize {
        self.n_chans
    }

    pub fn is_empty(&self) -> bool {
        self.n_locs == 0
    }

    /// Flat index of `(loc, k)` in the per-channel arrays.
    #[inline]
    pub fn index(&self, loc: usize, k: usize) -> usize {
        self.n_chans * loc + k
    }

    /// Check every layout invariant.
    pub fn validate(&self) -> ObsResult<()> {
        let per_loc = [
            ("latitude", self.latitude.len()),
            ("longitude", self.longitude.len()),
            ("datetime", self.datetime.len()),
        ];
        for (name, actual) in per_loc {
            if actual != self.n_locs {
                return Err(ObsError::LengthMismatch {
                    name,
                    expected: self.n_locs,
                    actual,
                });
            }
        }

        if self.channel_number.len() != self.n_chans {
            return Err(ObsError::LengthMismatch {
                name: "channelNumber",
                expected: self.n_chans,
                actual: self.channel_number.len(),
            });
        }

        let expected = self.n_locs * self.n_chans;
        let per_chan = [
            ("obsValue", self.obs_value.len()),
            ("obsError", self.obs_error.len()),
            ("preQc", self.pre_qc.len()),
        ];
        for (name, actual) in per_chan {
            if actual != expected {
                return Err(ObsError::LengthMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }

        if self.float_metadata.rows() != self.n_locs {
            return Err(ObsError::MetadataRows {
                name: "floatMetadata",
                expected: self.n_locs,
                actual: self.float_metadata.rows(),
            });
        }
        if self.int_metadata.rows() != self.n_locs {
            return Err(ObsError::MetadataRows {
                name: "intMetadata",
                expected: self.n_locs,
                actual: self.int_metadata.rows(),
            });
        }

        if self.reference_epoch != REFERENCE_EPOCH {
            return Err(ObsError::Invalid(format!(
                "unexpected reference epoch '{}'",
                self.reference_epoch
            )));
        }

        Ok(())
    }

    /// Counts for logging and reports.
    pub fn summary(&self) -> ObservationSummary {
        ObservationSummary {
            n_locs: self.n_locs,
            n_chans: self.n_chans,
            n_values: self.obs_value.len(),
            n_flagged: self.pre_qc.iter().filter(|&&q| q != 0).count(),
            time_range: time_range(&self.datetime),
        }
    }
}

impl Default for ObservationSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Shape and QC statistics of an [`ObservationSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservationSummary {
    pub n_locs: usize,
    pub n_chans: usize,
    pub n_values: usize,
    /// Number of (location, channel) elements with a nonzero pre-QC flag
    pub n_flagged: usize,
    /// Earliest and latest observation time, if any
    pub time_range: Option<(f64, f64)>,
}

fn time_range(times: &[f64]) -> Option<(f64, f64)> {
    let first = *times.first()?;
    Some(
        times
            .iter()
            .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))),
    )
}
