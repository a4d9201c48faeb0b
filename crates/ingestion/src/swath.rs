//! Raw swath arrays read from a [`VariableStore`].

use netcdf_parser::VariableStore;
use obs_common::ScanCalendar;
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::instruments::{dims, InstrumentDescriptor, ObsErrorSource, TIME_VARIABLES};

/// Dimensions of a swath grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwathShape {
    pub n_spots: usize,
    pub n_scans: usize,
    pub n_channels: usize,
}

impl SwathShape {
    /// Number of (spot, scan) pairs.
    pub fn n_pairs(&self) -> usize {
        self.n_spots * self.n_scans
    }

    /// Number of (spot, scan, channel) elements.
    pub fn n_elements(&self) -> usize {
        self.n_pairs() * self.n_channels
    }

    /// Index of a per-location value.
    #[inline]
    pub fn location_index(&self, spot: usize, scan: usize) -> usize {
        spot * self.n_scans + scan
    }

    /// Index of a per-channel value at raw channel index `channel`.
    #[inline]
    pub fn element_index(&self, spot: usize, scan: usize, channel: usize) -> usize {
        self.location_index(spot, scan) * self.n_channels + channel
    }
}

/// Per-file transient arrays needed to assemble observations.
#[derive(Debug, Clone)]
pub struct SwathDataset {
    pub shape: SwathShape,
    /// (spots, scans)
    pub longitude: Vec<f32>,
    /// (spots, scans)
    pub latitude: Vec<f32>,
    /// (spots, scans, channels)
    pub measurement: Vec<f32>,
    /// (spots, scans, channels)
    pub quality_flag: Vec<i64>,
    /// (spots, scans, channels)
    pub secondary_flag: Option<Vec<i64>>,
    /// (spots, scans, channels), present for [`ObsErrorSource::FromVariable`]
    pub obs_error: Option<Vec<f32>>,
    /// (scans)
    pub calendar: ScanCalendar,
    /// One (spots, scans) array per float metadata field
    pub float_metadata: Vec<Vec<f32>>,
    /// One (spots, scans) array per int metadata field
    pub int_metadata: Vec<Vec<i64>>,
}

impl SwathDataset {
    /// Read the dimensions of a swath file.
    pub fn read_shape(store: &dyn VariableStore) -> Result<SwathShape> {
        Ok(SwathShape {
            n_spots: store.dimension(dims::SPOTS)?,
            n_scans: store.dimension(dims::SCANS)?,
            n_channels: store.dimension(dims::CHANNELS)?,
        })
    }

    /// Read every variable `descriptor` requires, checking each length
    /// against the declared dimensions.
    pub fn read(store: &dyn VariableStore, descriptor: &InstrumentDescriptor) -> Result<Self> {
        let shape = Self::read_shape(store)?;
        let pairs = shape.n_pairs();
        let elements = shape.n_elements();

        debug!(
            source = store.source(),
            spots = shape.n_spots,
            scans = shape.n_scans,
            channels = shape.n_channels,
            "Reading swath variables"
        );

        let longitude = store.read_f32(descriptor.longitude, pairs)?;
        let latitude = store.read_f32(descriptor.latitude, pairs)?;
        let measurement = store.read_f32(descriptor.measurement, elements)?;
        let quality_flag = store.read_i64(descriptor.quality_flag, elements)?;

        let secondary_flag = descriptor
            .secondary_flag
            .map(|name| store.read_i64(name, elements))
            .transpose()?;

        let obs_error = match descriptor.obs_error {
            ObsErrorSource::FromVariable(name) => Some(store.read_f32(name, elements)?),
            ObsErrorSource::Fixed(_) => None,
        };

        let [year, month, day, hour, minute, second] = TIME_VARIABLES;
        let calendar = ScanCalendar {
            year: store.read_i64(year, shape.n_scans)?,
            month: store.read_i64(month, shape.n_scans)?,
            day: store.read_i64(day, shape.n_scans)?,
            hour: store.read_i64(hour, shape.n_scans)?,
            minute: store.read_i64(minute, shape.n_scans)?,
            second: store.read_i64(second, shape.n_scans)?,
        };

        let float_metadata = descriptor
            .float_metadata
            .iter()
            .map(|field| store.read_f32(field.variable, pairs))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let int_metadata = descriptor
            .int_metadata
            .iter()
            .map(|field| store.read_i64(field.variable, pairs))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            shape,
            longitude,
            latitude,
            measurement,
            quality_flag,
            secondary_flag,
            obs_error,
            calendar,
            float_metadata,
            int_metadata,
        })
    }

    /// Re-check the length invariants of a dataset assembled by hand.
    pub fn validate(&self) -> Result<()> {
        let pairs = self.shape.n_pairs();
        let elements = self.shape.n_elements();
        let mut checks = vec![
            ("longitude", self.longitude.len(), pairs),
            ("latitude", self.latitude.len(), pairs),
            ("measurement", self.measurement.len(), elements),
            ("quality flag", self.quality_flag.len(), elements),
            ("calendar", self.calendar.len(), self.shape.n_scans),
        ];
        if let Some(sec) = &self.secondary_flag {
            checks.push(("secondary flag", sec.len(), elements));
        }
        if let Some(err) = &self.obs_error {
            checks.push(("obs error", err.len(), elements));
        }
        checks.extend(self.float_metadata.iter().map(|m| ("float metadata", m.len(), pairs)));
        checks.extend(self.int_metadata.iter().map(|m| ("int metadata", m.len(), pairs)));

        for (name, actual, expected) in checks {
            if actual != expected {
                return Err(IngestionError::ShapeMismatch(format!(
                    "{} has {} elements, expected {}",
                    name, actual, expected
                )));
            }
        }
        Ok(())
    }
}
