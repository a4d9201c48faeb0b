//! Per-instrument descriptors.
//!
//! Converters for the different swath products share one pipeline and differ
//! only in what this table records: variable names, metadata columns, the
//! QC policy, the time convention, whether the grid is thinned and in which
//! order it is visited.

use obs_common::TimeConvention;

use crate::error::{IngestionError, Result};
use crate::quality::QcPolicy;
use crate::thinning::RasterOrder;

/// Dimension names common to every swath product.
pub mod dims {
    pub const SPOTS: &str = "spots";
    pub const SCANS: &str = "scans";
    pub const CHANNELS: &str = "channels";
}

/// Per-scan calendar component variables, in `Year..Second` order.
pub const TIME_VARIABLES: [&str; 6] = ["Year", "Month", "Day", "Hour", "Minute", "Second"];

/// A per-location metadata column and the file variable it is copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataField {
    /// Output column name
    pub name: &'static str,
    /// Source variable, dimensioned (spots, scans)
    pub variable: &'static str,
}

/// Where the observation error comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObsErrorSource {
    /// Same value for every element.
    Fixed(f32),
    /// Copied per element from a (spots, scans, channels) variable.
    FromVariable(&'static str),
}

/// Everything that distinguishes one swath product from another.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentDescriptor {
    /// Configuration key (`instrument:`)
    pub key: &'static str,
    /// Short description for logs
    pub description: &'static str,
    pub longitude: &'static str,
    pub latitude: &'static str,
    /// Measurement variable, dimensioned (spots, scans, channels)
    pub measurement: &'static str,
    /// Raw quality flag, dimensioned (spots, scans, channels)
    pub quality_flag: &'static str,
    /// Secondary per-element flag folded in by repacking
    pub secondary_flag: Option<&'static str>,
    pub float_metadata: &'static [MetadataField],
    pub int_metadata: &'static [MetadataField],
    pub qc_policy: QcPolicy,
    pub time_convention: TimeConvention,
    pub obs_error: ObsErrorSource,
    /// Whether `thinning.threshold` applies (and is required)
    pub thinned: bool,
    pub raster_order: RasterOrder,
}

/// Viewing-geometry columns of the radiance product.
const GEOMETRY_METADATA: &[MetadataField] = &[
    MetadataField {
        name: "lunarAzimuthAngle",
        variable: "lunar_azimuth_angle",
    },
    MetadataField {
        name: "lunarZenithAngle",
        variable: "lunar_zenith_angle",
    },
    MetadataField {
        name: "sensorAzimuthAngle",
        variable: "sensor_azimuth_angle",
    },
    MetadataField {
        name: "sensorViewAngle",
        variable: "sensor_view_angle",
    },
    MetadataField {
        name: "sensorZenithAngle",
        variable: "sensor_zenith_angle",
    },
    MetadataField {
        name: "solarAzimuthAngle",
        variable: "solar_azimuth_angle",
    },
    MetadataField {
        name: "solarZenithAngle",
        variable: "solar_zenith_angle",
    },
];

const TMS_BRIGHTNESS_T: InstrumentDescriptor = InstrumentDescriptor {
    key: "tms_brightness_t",
    description: "TMS brightness temperature, raw combined quality flag",
    longitude: "longitude",
    latitude: "latitude",
    measurement: "brightness_temperature",
    quality_flag: "combinedQualityFlag",
    secondary_flag: None,
    float_metadata: &[],
    int_metadata: &[],
    qc_policy: QcPolicy::Passthrough,
    time_convention: TimeConvention::Offset1970,
    obs_error: ObsErrorSource::Fixed(2.0),
    thinned: true,
    raster_order: RasterOrder::SpotMajor,
};

const TMS_RAD: InstrumentDescriptor = InstrumentDescriptor {
    key: "tms_rad",
    description: "TMS radiance product, BUFR-equivalent repacked quality flag",
    longitude: "longitude",
    latitude: "latitude",
    measurement: "brightness_temperature",
    quality_flag: "combinedQualityFlag",
    secondary_flag: Some("flagSDRTX"),
    float_metadata: GEOMETRY_METADATA,
    int_metadata: &[],
    qc_policy: QcPolicy::Repacked,
    time_convention: TimeConvention::Civil,
    obs_error: ObsErrorSource::Fixed(2.0),
    thinned: true,
    raster_order: RasterOrder::SpotMajor,
};

const TMS_TBR: InstrumentDescriptor = InstrumentDescriptor {
    key: "tms_tbr",
    description: "TMS TBR product, unthinned, scan-major",
    longitude: "longitude",
    latitude: "latitude",
    measurement: "brightness_temperature",
    quality_flag: "combinedQualityFlag",
    secondary_flag: None,
    float_metadata: &[],
    int_metadata: &[],
    qc_policy: QcPolicy::Passthrough,
    time_convention: TimeConvention::Offset1970,
    obs_error: ObsErrorSource::Fixed(2.0),
    thinned: false,
    raster_order: RasterOrder::ScanMajor,
};

/// Every known instrument descriptor.
pub const INSTRUMENTS: &[InstrumentDescriptor] = &[TMS_BRIGHTNESS_T, TMS_RAD, TMS_TBR];

/// Key used when the configuration names no instrument.
pub const DEFAULT_INSTRUMENT: &str = "tms_rad";

/// Look up a descriptor by its configuration key.
pub fn descriptor(key: &str) -> Result<&'static InstrumentDescriptor> {
    INSTRUMENTS
        .iter()
        .find(|d| d.key == key)
        .ok_or_else(|| IngestionError::UnknownInstrument(key.to_string()))
}

impl InstrumentDescriptor {
    pub fn float_metadata_names(&self) -> Vec<String> {
        self.float_metadata.iter().map(|f| f.name.to_string()).collect()
    }

    pub fn int_metadata_names(&self) -> Vec<String> {
        self.int_metadata.iter().map(|f| f.name.to_string()).collect()
    }

    /// Every file variable this descriptor reads.
    pub fn required_variables(&self) -> Vec<&'static str> {
        let mut vars = vec![self.longitude, self.latitude, self.measurement, self.quality_flag];
        vars.extend(TIME_VARIABLES);
        vars.extend(self.secondary_flag);
        if let ObsErrorSource::FromVariable(name) = self.obs_error {
            vars.push(name);
        }
        vars.extend(self.float_metadata.iter().map(|f| f.variable));
        vars.extend(self.int_metadata.iter().map(|f| f.variable));
        vars
    }
}
