//! Assembly of the flattened [`ObservationSet`].

use obs_common::ObservationSet;
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::{IngestionError, Result};
use crate::instruments::ObsErrorSource;
use crate::swath::SwathDataset;
use crate::thinning::ReproducibleThinner;

/// Copies retained swath locations into an [`ObservationSet`].
pub struct ObservationAssembler<'a> {
    config: &'a ResolvedConfig,
}

impl<'a> ObservationAssembler<'a> {
    pub fn new(config: &'a ResolvedConfig) -> Self {
        Self { config }
    }

    /// Build the observation set.
    ///
    /// `scan_times` has one entry per scan; `pre_qc` one entry per
    /// (spot, scan, raw channel) element. The output is sized by a counting
    /// pass of `thinner` and filled by a second, independent pass.
    pub fn assemble(
        &self,
        swath: &SwathDataset,
        scan_times: &[f64],
        pre_qc: &[i32],
        thinner: &ReproducibleThinner,
    ) -> Result<ObservationSet> {
        let shape = swath.shape;
        swath.validate()?;
        if scan_times.len() != shape.n_scans {
            return Err(IngestionError::ShapeMismatch(format!(
                "{} scan times for {} scans",
                scan_times.len(),
                shape.n_scans
            )));
        }
        if pre_qc.len() != shape.n_elements() {
            return Err(IngestionError::ShapeMismatch(format!(
                "{} quality flags for {} elements",
                pre_qc.len(),
                shape.n_elements()
            )));
        }

        let raw_channels = self.config.channels.raw_indices(shape.n_channels)?;
        let descriptor = self.config.descriptor;

        let n_locs = thinner.count_retained();
        let mut obs = ObservationSet::with_shape(
            n_locs,
            self.config.channels.channels(),
            descriptor.float_metadata_names(),
            descriptor.int_metadata_names(),
        );
        debug!(
            n_locs = n_locs,
            n_chans = raw_channels.len(),
            "Allocated observation set"
        );

        let mut loc = 0;
        for (spot, scan) in thinner.retained() {
            if loc == n_locs {
                return Err(IngestionError::InvariantViolation(format!(
                    "assembly pass retained more than the {} counted locations",
                    n_locs
                )));
            }

            let pair = shape.location_index(spot, scan);
            obs.latitude[loc] = swath.latitude[pair];
            obs.longitude[loc] = swath.longitude[pair];
            obs.datetime[loc] = scan_times[scan];

            for (k, &ch) in raw_channels.iter().enumerate() {
                let idx = shape.element_index(spot, scan, ch);
                let out = obs.index(loc, k);

                obs.obs_value[out] = swath.measurement[idx];
                obs.obs_error[out] = match (self.config.obs_error, &swath.obs_error) {
                    (ObsErrorSource::Fixed(value), _) => value,
                    (ObsErrorSource::FromVariable(_), Some(errors)) => errors[idx],
                    (ObsErrorSource::FromVariable(name), None) => {
                        return Err(IngestionError::MissingVariable(name.to_string()))
                    }
                };
                obs.pre_qc[out] = if self.config.binning { 0 } else { pre_qc[idx] };
            }

            let row = obs.float_metadata.row_mut(loc);
            for (value, field) in row.iter_mut().zip(&swath.float_metadata) {
                *value = field[pair];
            }
            let row = obs.int_metadata.row_mut(loc);
            for (value, field) in row.iter_mut().zip(&swath.int_metadata) {
                *value = field[pair] as i32;
            }

            loc += 1;
        }

        if loc != n_locs {
            return Err(IngestionError::InvariantViolation(format!(
                "assembled {} locations, counted {}",
                loc, n_locs
            )));
        }

        obs.validate()?;
        Ok(obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::thinning::RasterOrder;
    use obs_common::ScanCalendar;
    use crate::swath::SwathShape;

    fn swath(n_spots: usize, n_scans: usize, n_channels: usize) -> SwathDataset {
        let shape = SwathShape {
            n_spots,
            n_scans,
            n_channels,
        };
        let pairs = shape.n_pairs();
        let elements = shape.n_elements();
        SwathDataset {
            shape,
            longitude: (0..pairs).map(|p| p as f32).collect(),
            latitude: (0..pairs).map(|p| -(p as f32)).collect(),
            measurement: (0..elements).map(|e| 100.0 + e as f32).collect(),
            quality_flag: vec![0; elements],
            secondary_flag: None,
            obs_error: None,
            calendar: ScanCalendar::uniform(n_scans, (2020, 1, 1, 0, 0, 0)),
            float_metadata: Vec::new(),
            int_metadata: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_all_locations_channel_minor() {
        let resolved = ConverterConfig::new("tms_tbr", "3,1").resolve().unwrap();
        let data = swath(2, 2, 3);
        let times = vec![10.0, 20.0];
        let pre_qc: Vec<i32> = (0..12).collect();
        let thinner = ReproducibleThinner::disabled(RasterOrder::SpotMajor, 2, 2);

        let obs = ObservationAssembler::new(&resolved)
            .assemble(&data, &times, &pre_qc, &thinner)
            .unwrap();

        assert_eq!(obs.n_locs(), 4);
        assert_eq!(obs.channel_number, vec![3, 1]);
        // loc 1 is (spot 0, scan 1): element base (0*2+1)*3 = 3
        assert_eq!(obs.obs_value[obs.index(1, 0)], 100.0 + 5.0);
        assert_eq!(obs.obs_value[obs.index(1, 1)], 100.0 + 3.0);
        assert_eq!(obs.pre_qc[obs.index(1, 0)], 5);
        assert_eq!(obs.datetime, vec![10.0, 20.0, 10.0, 20.0]);
        assert!(obs.obs_error.iter().all(|&e| e == 2.0));
    }

    #[test]
    fn test_binning_zeroes_pre_qc() {
        let mut config = ConverterConfig::new("tms_tbr", "1");
        config.binning = true;
        let resolved = config.resolve().unwrap();
        let data = swath(1, 2, 1);
        let thinner = ReproducibleThinner::disabled(RasterOrder::ScanMajor, 1, 2);

        let obs = ObservationAssembler::new(&resolved)
            .assemble(&data, &[0.0, 0.0], &[7, 9], &thinner)
            .unwrap();
        assert_eq!(obs.pre_qc, vec![0, 0]);
    }

    #[test]
    fn test_channel_outside_file_is_rejected() {
        let resolved = ConverterConfig::new("tms_tbr", "4").resolve().unwrap();
        let data = swath(1, 1, 3);
        let thinner = ReproducibleThinner::disabled(RasterOrder::SpotMajor, 1, 1);
        let result = ObservationAssembler::new(&resolved).assemble(&data, &[0.0], &[0, 0, 0], &thinner);
        assert!(matches!(result, Err(IngestionError::ConfigParse(_))));
    }

    #[test]
    fn test_mismatched_flag_length_is_rejected() {
        let resolved = ConverterConfig::new("tms_tbr", "1").resolve().unwrap();
        let data = swath(2, 2, 1);
        let thinner = ReproducibleThinner::disabled(RasterOrder::SpotMajor, 2, 2);
        let result = ObservationAssembler::new(&resolved).assemble(&data, &[0.0, 0.0], &[0; 3], &thinner);
        assert!(matches!(result, Err(IngestionError::ShapeMismatch(_))));
    }
}
