//! Satellite swath conversion library.
//!
//! Converts spot × scan × channel NetCDF swath files into flat
//! [`ObservationSet`](obs_common::ObservationSet)s for data assimilation.
//!
//! # Architecture
//!
//! One pipeline serves every supported instrument; what differs between
//! products lives in the [`instruments`] table. A conversion:
//!
//! - reads the swath arrays through a [`netcdf_parser::VariableStore`]
//! - reconstructs one epoch time per scan
//! - derives pre-QC values under the configured [`QcPolicy`]
//! - thins the spot × scan grid with a reproducible generator
//! - copies retained locations and selected channels into the output
//!
//! A file that cannot be opened yields an empty set, not an error.

pub mod assembler;
pub mod channels;
pub mod config;
pub mod converter;
pub mod error;
pub mod instruments;
pub mod quality;
pub mod swath;
pub mod thinning;

// Re-exports
pub use assembler::ObservationAssembler;
pub use channels::ChannelSelection;
pub use config::{ChannelSpec, ConverterConfig, ResolvedConfig, ThinningConfig};
pub use converter::{ConversionOutcome, Converter};
pub use error::{IngestionError, Result};
pub use instruments::{descriptor, InstrumentDescriptor, ObsErrorSource, INSTRUMENTS};
pub use quality::QcPolicy;
pub use swath::{SwathDataset, SwathShape};
pub use thinning::{RasterOrder, ReproducibleThinner, THINNING_SEED};
