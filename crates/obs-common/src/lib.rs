//! Common types shared by the swath-to-observation converters.
//!
//! - [`ObservationSet`]: the flattened per-location / per-channel output
//!   handed to the observation writer.
//! - [`TimeReconstructor`]: per-scan calendar components to epoch seconds.

pub mod error;
pub mod observation;
pub mod time;

pub use error::{ObsError, ObsResult};
pub use observation::{MetadataTable, ObservationSet, ObservationSummary, REFERENCE_EPOCH};
pub use time::{ScanCalendar, TimeConvention, TimeError, TimeReconstructor};
