//! End-to-end conversion of synthetic swath files.

use std::path::Path;

use ingestion::{
    ChannelSelection, ConversionOutcome, Converter, ConverterConfig, IngestionError,
    InstrumentDescriptor, ObsErrorSource, QcPolicy, RasterOrder, ResolvedConfig,
    ReproducibleThinner,
};
use netcdf_parser::MemoryStore;
use obs_common::{TimeConvention, TimeReconstructor};
use test_utils::{
    assert_approx_eq, assert_coords_approx_eq, geometry_value, names, swath_latitude,
    swath_longitude, swath_value, temp_test_dir, SwathFixture,
};

fn converter(config: ConverterConfig) -> Converter {
    Converter::new(&config).unwrap()
}

fn civil_seconds(y: i64, mo: i64, d: i64, h: i64, mi: i64, s: i64) -> f64 {
    TimeReconstructor::new(TimeConvention::Civil)
        .epoch_seconds(y, mo, d, h, mi, s)
        .unwrap() as f64
}

// ============================================================================
// Unthinned, scan-major product
// ============================================================================

#[test]
fn test_tbr_keeps_every_location_scan_major() {
    let fixture = SwathFixture::new(3, 4, 5);
    let obs = converter(ConverterConfig::new("tms_tbr", "2,5"))
        .convert_store(&fixture.to_store())
        .unwrap();

    assert_eq!(obs.n_locs(), 12);
    assert_eq!(obs.n_chans(), 2);
    assert_eq!(obs.channel_number, vec![2, 5]);
    assert_eq!(obs.obs_value.len(), 24);
    assert!(obs.validate().is_ok());

    let mut seen = std::collections::HashSet::new();
    for loc in 0..12 {
        for k in 0..2 {
            let idx = obs.index(loc, k);
            assert!(idx < obs.obs_value.len());
            assert!(seen.insert(idx));
        }
    }

    // Location l is (spot l % 3, scan l / 3)
    for loc in 0..12 {
        let (spot, scan) = (loc % 3, loc / 3);
        assert_eq!(obs.obs_value[obs.index(loc, 0)], swath_value(spot, scan, 2));
        assert_eq!(obs.obs_value[obs.index(loc, 1)], swath_value(spot, scan, 5));
        assert_coords_approx_eq!(
            (obs.longitude[loc], obs.latitude[loc]),
            (swath_longitude(spot, scan), swath_latitude(spot, scan)),
            1e-6
        );
    }
}

#[test]
fn test_tbr_time_uses_1970_offset() {
    let fixture = SwathFixture::new(2, 3, 1).with_start((2020, 1, 1, 6, 0, 0));
    let obs = converter(ConverterConfig::new("tms_tbr", "1"))
        .convert_store(&fixture.to_store())
        .unwrap();

    // Year 2020 is read as 1950 and day 1 as day 0
    for loc in 0..obs.n_locs() {
        let scan = (loc / 2) as i64;
        assert_eq!(obs.datetime[loc], civil_seconds(1949, 12, 31, 6, 0, scan));
    }
}

#[test]
fn test_tbr_passes_raw_flags_through() {
    let fixture = SwathFixture::new(2, 2, 3);
    let mut flags = vec![0; fixture.n_elements()];
    flags[fixture.element_index(1, 0, 3)] = 0x2000;
    flags[fixture.element_index(0, 1, 3)] = 0x0001;
    let fixture = fixture.with_quality_flag(flags);

    let obs = converter(ConverterConfig::new("tms_tbr", "3"))
        .convert_store(&fixture.to_store())
        .unwrap();

    // Scan-major: loc 1 = (spot 1, scan 0), loc 2 = (spot 0, scan 1)
    assert_eq!(obs.pre_qc, vec![0, 0x2000, 0x0001, 0]);
    assert!(obs.obs_error.iter().all(|&e| e == 2.0));
}

#[test]
fn test_binning_key_zeroes_pre_qc() {
    let fixture = SwathFixture::new(2, 2, 1).with_quality_flag(vec![7, 7, 7, 7]);
    let config = ConverterConfig::from_yaml_str("instrument: tms_tbr\nchannel: 1\nbinning:\n").unwrap();
    assert!(config.binning);

    let obs = converter(config).convert_store(&fixture.to_store()).unwrap();
    assert_eq!(obs.pre_qc, vec![0; 4]);
}

// ============================================================================
// Thinned, repacked radiance product
// ============================================================================

#[test]
fn test_rad_zero_threshold_keeps_everything_spot_major() {
    let fixture = SwathFixture::new(3, 4, 2);
    let obs = converter(ConverterConfig::new("tms_rad", "1,2").with_threshold(0.0))
        .convert_store(&fixture.to_store())
        .unwrap();

    assert_eq!(obs.n_locs(), 12);
    for loc in 0..12 {
        let (spot, scan) = (loc / 4, loc % 4);
        assert_eq!(obs.obs_value[obs.index(loc, 0)], swath_value(spot, scan, 1));
        assert_eq!(obs.datetime[loc], 1_577_836_800.0 + scan as f64);
    }
}

#[test]
fn test_rad_copies_geometry_metadata() {
    let fixture = SwathFixture::new(2, 3, 1);
    let obs = converter(ConverterConfig::new("tms_rad", "1").with_threshold(0.0))
        .convert_store(&fixture.to_store())
        .unwrap();

    assert_eq!(obs.float_metadata.width(), 7);
    assert_eq!(obs.float_metadata.names()[3], "sensorViewAngle");
    assert_eq!(obs.int_metadata.width(), 0);

    let view = obs.float_metadata.column("sensorViewAngle").unwrap();
    let solar_zenith = obs.float_metadata.column("solarZenithAngle").unwrap();
    for loc in 0..obs.n_locs() {
        assert_approx_eq!(view[loc], geometry_value(3, loc), 1e-5);
        assert_approx_eq!(solar_zenith[loc], geometry_value(6, loc), 1e-5);
    }
}

#[test]
fn test_rad_repacks_flags() {
    let fixture = SwathFixture::new(1, 4, 1);
    // solar intrusion, clean, unlisted bit 1, clean
    let flags = vec![1 << 13, 0, 1, 0];
    // SDR transmit on the last scan only
    let sdrtx = vec![0, 0, 0, 1];
    let fixture = fixture
        .with_quality_flag(flags)
        .with_secondary_flag(Some(sdrtx));

    let obs = converter(ConverterConfig::new("tms_rad", "1").with_threshold(0.0))
        .convert_store(&fixture.to_store())
        .unwrap();
    assert_eq!(obs.pre_qc, vec![1, 0, 0, 1]);
}

#[test]
fn test_rad_passthrough_override() {
    let fixture = SwathFixture::new(1, 2, 1).with_quality_flag(vec![1 << 13, 1]);
    let mut config = ConverterConfig::new("tms_rad", "1").with_threshold(0.0);
    config.qc_policy = Some(QcPolicy::Passthrough);

    let obs = converter(config).convert_store(&fixture.to_store()).unwrap();
    assert_eq!(obs.pre_qc, vec![1 << 13, 1]);
}

#[test]
fn test_unit_threshold_gives_empty_set() {
    let fixture = SwathFixture::new(5, 5, 2);
    let obs = converter(ConverterConfig::new("tms_rad", "1,2").with_threshold(1.0))
        .convert_store(&fixture.to_store())
        .unwrap();

    assert_eq!(obs.n_locs(), 0);
    assert!(obs.latitude.is_empty());
    assert!(obs.obs_value.is_empty());
    assert!(obs.validate().is_ok());
}

#[test]
fn test_thinning_count_matches_assembly() {
    let (n_spots, n_scans) = (20, 30);
    let fixture = SwathFixture::new(n_spots, n_scans, 1);
    let obs = converter(ConverterConfig::new("tms_brightness_t", "1").with_threshold(0.5))
        .convert_store(&fixture.to_store())
        .unwrap();

    let thinner = ReproducibleThinner::new(0.5, RasterOrder::SpotMajor, n_spots, n_scans);
    assert_eq!(obs.n_locs(), thinner.count_retained());
    assert!(obs.n_locs() > 0 && obs.n_locs() < n_spots * n_scans);

    for (loc, (spot, scan)) in thinner.retained().enumerate() {
        assert_eq!(obs.obs_value[loc], swath_value(spot, scan, 1));
    }
}

#[test]
fn test_conversion_is_reproducible() {
    let store = SwathFixture::new(10, 10, 3).to_store();
    let c = converter(ConverterConfig::new("tms_rad", "1,3").with_threshold(0.3));
    let first = c.convert_store(&store).unwrap();
    let second = c.convert_store(&store).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_unreadable_file_gives_empty_set() {
    let c = converter(ConverterConfig::new("tms_rad", "1").with_threshold(0.5));
    let outcome = c.convert(Path::new("/nonexistent/tms_swath.nc")).unwrap();

    assert!(matches!(outcome, ConversionOutcome::Skipped { .. }));
    let obs = outcome.into_observations();
    assert_eq!(obs.n_locs(), 0);
    assert!(obs.validate().is_ok());
}

#[test]
fn test_missing_variable_is_fatal() {
    let mut store = SwathFixture::new(2, 2, 1).to_store();
    store.remove("Year");
    let result = converter(ConverterConfig::new("tms_tbr", "1")).convert_store(&store);
    assert!(matches!(result, Err(IngestionError::MissingVariable(_))));

    let store = SwathFixture::new(2, 2, 1).without_geometry().to_store();
    let result = converter(ConverterConfig::new("tms_rad", "1").with_threshold(0.0)).convert_store(&store);
    assert!(matches!(result, Err(IngestionError::MissingVariable(_))));
}

#[test]
fn test_shape_mismatch_is_fatal() {
    let mut store = SwathFixture::new(2, 2, 1).to_store();
    store.insert_f32(names::LATITUDE, vec![0.0; 3]);
    let result = converter(ConverterConfig::new("tms_tbr", "1")).convert_store(&store);
    assert!(matches!(result, Err(IngestionError::ShapeMismatch(_))));
}

#[test]
fn test_channel_beyond_file_is_rejected() {
    let store = SwathFixture::new(2, 2, 3).to_store();
    let result = converter(ConverterConfig::new("tms_tbr", "1,4")).convert_store(&store);
    assert!(matches!(result, Err(IngestionError::ConfigParse(_))));
}

// ============================================================================
// Observation error read from the file
// ============================================================================

static ERROR_PRODUCT: InstrumentDescriptor = InstrumentDescriptor {
    key: "tms_with_errors",
    description: "test product carrying per-element errors",
    longitude: names::LONGITUDE,
    latitude: names::LATITUDE,
    measurement: names::MEASUREMENT,
    quality_flag: names::QUALITY_FLAG,
    secondary_flag: None,
    float_metadata: &[],
    int_metadata: &[],
    qc_policy: QcPolicy::Passthrough,
    time_convention: TimeConvention::Civil,
    obs_error: ObsErrorSource::FromVariable(names::OBS_ERROR),
    thinned: false,
    raster_order: RasterOrder::SpotMajor,
};

fn error_product_converter() -> Converter {
    Converter::from_resolved(ResolvedConfig {
        descriptor: &ERROR_PRODUCT,
        channels: ChannelSelection::parse("2").unwrap(),
        threshold: None,
        binning: false,
        qc_policy: ERROR_PRODUCT.qc_policy,
        time_convention: ERROR_PRODUCT.time_convention,
        obs_error: ERROR_PRODUCT.obs_error,
    })
}

#[test]
fn test_obs_error_from_variable() {
    let fixture = SwathFixture::new(2, 2, 2);
    let errors: Vec<f32> = (0..fixture.n_elements()).map(|i| 0.5 + i as f32).collect();
    let fixture = fixture.with_obs_error(errors.clone());

    let obs = error_product_converter()
        .convert_store(&fixture.to_store())
        .unwrap();
    // Channel 2 is every odd element
    assert_eq!(obs.obs_error, vec![1.5, 3.5, 5.5, 7.5]);
}

#[test]
fn test_obs_error_variable_missing() {
    let store: MemoryStore = SwathFixture::new(2, 2, 2).to_store();
    let result = error_product_converter().convert_store(&store);
    assert!(matches!(result, Err(IngestionError::MissingVariable(_))));
}

// ============================================================================
// Real NetCDF file
// ============================================================================

#[test]
fn test_netcdf_file_matches_memory_store() {
    let dir = temp_test_dir();
    let path = dir.path().join("tms_swath.nc");
    let mut flags = vec![0; 4 * 6 * 3];
    flags[5] = 1 << 6;
    let fixture = SwathFixture::new(4, 6, 3).with_quality_flag(flags);
    fixture.write_netcdf(&path).unwrap();

    let c = converter(ConverterConfig::new("tms_rad", "3,1").with_threshold(0.2));
    let from_file = c.convert(&path).unwrap();
    let from_memory = c.convert_store(&fixture.to_store()).unwrap();

    assert!(!from_file.is_skipped());
    assert_eq!(from_file.observations(), Some(&from_memory));
}
