//! Common test fixtures for swath conversion tests.
//!
//! [`SwathFixture`] describes a small synthetic swath file carrying every
//! variable any supported instrument reads. It can be materialised as an
//! in-memory [`MemoryStore`] or written to a real NetCDF file.

use std::path::Path;

use netcdf_parser::MemoryStore;

use crate::generators::{
    create_location_field, create_scan_calendar, create_swath_cube, swath_latitude,
    swath_longitude,
};

/// Variable and dimension names used in swath files.
pub mod names {
    pub const SPOTS: &str = "spots";
    pub const SCANS: &str = "scans";
    pub const CHANNELS: &str = "channels";

    pub const LONGITUDE: &str = "longitude";
    pub const LATITUDE: &str = "latitude";
    pub const MEASUREMENT: &str = "brightness_temperature";
    pub const QUALITY_FLAG: &str = "combinedQualityFlag";
    pub const SECONDARY_FLAG: &str = "flagSDRTX";
    pub const OBS_ERROR: &str = "obs_error";

    pub const TIME: [&str; 6] = ["Year", "Month", "Day", "Hour", "Minute", "Second"];

    /// Viewing-geometry variables, dimensioned (spots, scans).
    pub const GEOMETRY: [&str; 7] = [
        "lunar_azimuth_angle",
        "lunar_zenith_angle",
        "sensor_azimuth_angle",
        "sensor_view_angle",
        "sensor_zenith_angle",
        "solar_azimuth_angle",
        "solar_zenith_angle",
    ];
}

/// Start of the first scan in fixtures that do not set one.
pub const DEFAULT_START: (i64, i64, i64, i64, i64, i64) = (2020, 1, 1, 0, 0, 0);

/// Value of geometry variable `k` at location index `loc`.
pub fn geometry_value(k: usize, loc: usize) -> f32 {
    k as f32 * 10.0 + loc as f32 * 0.25
}

/// A synthetic swath file.
#[derive(Debug, Clone)]
pub struct SwathFixture {
    pub n_spots: usize,
    pub n_scans: usize,
    pub n_channels: usize,
    /// Raw quality flags, (spots, scans, channels). All zero by default.
    pub quality_flag: Vec<i64>,
    /// Secondary flag, (spots, scans, channels). All zero by default.
    pub secondary_flag: Option<Vec<i64>>,
    /// Per-element observation error; omitted by default.
    pub obs_error: Option<Vec<f32>>,
    /// Calendar columns, `Year..Second`
    pub calendar: [Vec<i64>; 6],
    /// Whether the viewing-geometry variables are written
    pub geometry: bool,
}

impl SwathFixture {
    /// A fixture with clean flags, geometry, and scans one second apart from
    /// [`DEFAULT_START`].
    pub fn new(n_spots: usize, n_scans: usize, n_channels: usize) -> Self {
        let elements = n_spots * n_scans * n_channels;
        Self {
            n_spots,
            n_scans,
            n_channels,
            quality_flag: vec![0; elements],
            secondary_flag: Some(vec![0; elements]),
            obs_error: None,
            calendar: create_scan_calendar(n_scans, DEFAULT_START),
            geometry: true,
        }
    }

    pub fn n_elements(&self) -> usize {
        self.n_spots * self.n_scans * self.n_channels
    }

    /// Index of (spot, scan, 1-based channel) in per-element arrays.
    pub fn element_index(&self, spot: usize, scan: usize, channel: usize) -> usize {
        (spot * self.n_scans + scan) * self.n_channels + (channel - 1)
    }

    pub fn with_quality_flag(mut self, flags: Vec<i64>) -> Self {
        self.quality_flag = flags;
        self
    }

    pub fn with_secondary_flag(mut self, flags: Option<Vec<i64>>) -> Self {
        self.secondary_flag = flags;
        self
    }

    pub fn with_obs_error(mut self, errors: Vec<f32>) -> Self {
        self.obs_error = Some(errors);
        self
    }

    pub fn with_start(mut self, start: (i64, i64, i64, i64, i64, i64)) -> Self {
        self.calendar = create_scan_calendar(self.n_scans, start);
        self
    }

    pub fn without_geometry(mut self) -> Self {
        self.geometry = false;
        self
    }

    fn float_variables(&self) -> Vec<(&'static str, Vec<f32>, usize)> {
        let mut vars = vec![
            (
                names::LONGITUDE,
                create_location_field(self.n_spots, self.n_scans, swath_longitude),
                2,
            ),
            (
                names::LATITUDE,
                create_location_field(self.n_spots, self.n_scans, swath_latitude),
                2,
            ),
            (
                names::MEASUREMENT,
                create_swath_cube(self.n_spots, self.n_scans, self.n_channels),
                3,
            ),
        ];
        if let Some(errors) = &self.obs_error {
            vars.push((names::OBS_ERROR, errors.clone(), 3));
        }
        if self.geometry {
            let n_scans = self.n_scans;
            for (k, name) in names::GEOMETRY.iter().enumerate() {
                let field = create_location_field(self.n_spots, n_scans, |spot, scan| {
                    geometry_value(k, spot * n_scans + scan)
                });
                vars.push((*name, field, 2));
            }
        }
        vars
    }

    fn int_variables(&self) -> Vec<(&'static str, Vec<i64>, usize)> {
        let mut vars = vec![(names::QUALITY_FLAG, self.quality_flag.clone(), 3)];
        if let Some(flags) = &self.secondary_flag {
            vars.push((names::SECONDARY_FLAG, flags.clone(), 3));
        }
        for (name, column) in names::TIME.iter().zip(&self.calendar) {
            vars.push((*name, column.clone(), 1));
        }
        vars
    }

    /// Build an in-memory store named `fixture`.
    pub fn to_store(&self) -> MemoryStore {
        let mut store = MemoryStore::new("fixture")
            .with_dimension(names::SPOTS, self.n_spots)
            .with_dimension(names::SCANS, self.n_scans)
            .with_dimension(names::CHANNELS, self.n_channels);
        for (name, values, _) in self.float_variables() {
            store.insert_f32(name, values);
        }
        for (name, values, _) in self.int_variables() {
            store.insert_i64(name, values);
        }
        store
    }

    /// Write the fixture as a NetCDF-4 file.
    ///
    /// Flags are stored as `u16`, calendar columns as `i32`.
    pub fn write_netcdf(&self, path: &Path) -> Result<(), netcdf::Error> {
        let mut file = netcdf::create(path)?;
        file.add_dimension(names::SPOTS, self.n_spots)?;
        file.add_dimension(names::SCANS, self.n_scans)?;
        file.add_dimension(names::CHANNELS, self.n_channels)?;

        let dims_for = |rank: usize| -> &'static [&'static str] {
            match rank {
                1 => &[names::SCANS],
                2 => &[names::SPOTS, names::SCANS],
                _ => &[names::SPOTS, names::SCANS, names::CHANNELS],
            }
        };

        for (name, values, rank) in self.float_variables() {
            let mut var = file.add_variable::<f32>(name, dims_for(rank))?;
            var.put_values(&values, ..)?;
        }
        for (name, values, rank) in self.int_variables() {
            if rank == 1 {
                let values: Vec<i32> = values.iter().map(|&v| v as i32).collect();
                let mut var = file.add_variable::<i32>(name, dims_for(rank))?;
                var.put_values(&values, ..)?;
            } else {
                let values: Vec<u16> = values.iter().map(|&v| v as u16).collect();
                let mut var = file.add_variable::<u16>(name, dims_for(rank))?;
                var.put_values(&values, ..)?;
            }
        }
        Ok(())
    }
}
