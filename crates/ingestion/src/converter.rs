//! Main Converter struct for swath file conversion.

use std::path::{Path, PathBuf};

use netcdf_parser::{NetCdfResult, NetCdfSwath, VariableStore};
use obs_common::{ObservationSet, TimeReconstructor};
use tracing::{debug, info, warn};

use crate::assembler::ObservationAssembler;
use crate::config::{ConverterConfig, ResolvedConfig};
use crate::error::Result;
use crate::quality;
use crate::swath::SwathDataset;
use crate::thinning::ReproducibleThinner;

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// The file was read and converted.
    Converted(ObservationSet),
    /// The file could not be opened. Nothing was read.
    Skipped { path: PathBuf, reason: String },
}

impl ConversionOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ConversionOutcome::Skipped { .. })
    }

    /// The converted observations, if any.
    pub fn observations(&self) -> Option<&ObservationSet> {
        match self {
            ConversionOutcome::Converted(obs) => Some(obs),
            ConversionOutcome::Skipped { .. } => None,
        }
    }

    /// Observations for the hand-off; a skipped file yields an empty set.
    pub fn into_observations(self) -> ObservationSet {
        match self {
            ConversionOutcome::Converted(obs) => obs,
            ConversionOutcome::Skipped { .. } => ObservationSet::empty(),
        }
    }
}

/// Converts swath files of one instrument into [`ObservationSet`]s.
///
/// Holds a validated configuration; each call to [`Converter::convert`]
/// is independent and shares no state with previous calls.
#[derive(Debug, Clone)]
pub struct Converter {
    config: ResolvedConfig,
}

impl Converter {
    /// Create a converter, validating `config`.
    pub fn new(config: &ConverterConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        Ok(Self::from_resolved(resolved))
    }

    pub fn from_resolved(config: ResolvedConfig) -> Self {
        info!(
            instrument = config.descriptor.key,
            channels = ?config.channels.channels(),
            threshold = ?config.threshold,
            qc_policy = config.qc_policy.name(),
            time_convention = config.time_convention.name(),
            binning = config.binning,
            "Converter configured"
        );
        Self { config }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Convert a NetCDF swath file.
    ///
    /// A file that cannot be opened is logged and reported as
    /// [`ConversionOutcome::Skipped`]. Any failure after the file is open
    /// is returned as an error.
    pub fn convert(&self, path: &Path) -> Result<ConversionOutcome> {
        self.convert_with(path, NetCdfSwath::open)
    }

    /// Convert a file opened by `open`.
    pub fn convert_with<S, F>(&self, path: &Path, open: F) -> Result<ConversionOutcome>
    where
        S: VariableStore,
        F: FnOnce(&Path) -> NetCdfResult<S>,
    {
        info!(
            path = %path.display(),
            instrument = self.config.descriptor.key,
            "Converting swath file"
        );
        let store = match open(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot open swath file, producing no observations"
                );
                return Ok(ConversionOutcome::Skipped {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let obs = self.convert_store(&store)?;
        Ok(ConversionOutcome::Converted(obs))
    }

    /// Convert an already opened store.
    pub fn convert_store(&self, store: &dyn VariableStore) -> Result<ObservationSet> {
        let descriptor = self.config.descriptor;
        let swath = SwathDataset::read(store, descriptor)?;
        let shape = swath.shape;

        let scan_times = TimeReconstructor::new(self.config.time_convention)
            .reconstruct(&swath.calendar)?;

        let secondary = match self.config.qc_policy {
            quality::QcPolicy::Repacked => swath.secondary_flag.as_deref(),
            quality::QcPolicy::Passthrough => None,
        };
        let pre_qc = quality::apply_policy(self.config.qc_policy, &swath.quality_flag, secondary)?;

        let thinner = match self.config.threshold {
            Some(threshold) => ReproducibleThinner::new(
                threshold,
                descriptor.raster_order,
                shape.n_spots,
                shape.n_scans,
            ),
            None => ReproducibleThinner::disabled(descriptor.raster_order, shape.n_spots, shape.n_scans),
        };
        debug!(
            source = store.source(),
            threshold = ?thinner.threshold(),
            order = ?thinner.order(),
            "Thinning swath grid"
        );

        let obs = ObservationAssembler::new(&self.config).assemble(
            &swath,
            &scan_times,
            &pre_qc,
            &thinner,
        )?;

        info!(
            source = store.source(),
            instrument = descriptor.key,
            pairs = shape.n_pairs(),
            n_locs = obs.n_locs(),
            n_chans = obs.n_chans(),
            "Converted swath"
        );
        Ok(obs)
    }
}
