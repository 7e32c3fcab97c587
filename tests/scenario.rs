//! End-to-end runs of the emergence engine through the public API.

use std::f64::consts::PI;

use starspots::analysis::{fit_spot_amplitude, monthly_spot_counts};
use starspots::emergence::{EmergenceConfig, LatitudeMode, Simulation};
use starspots::export::{export_butterfly_png, export_catalog_csv, ButterflyOptions, CSV_HEADER};
use starspots::{simulate, ConfigError};

#[test]
fn test_reference_scenario_produces_regions_within_the_run() {
    let config = EmergenceConfig::default();
    let ndays = config.ndays;
    let catalog = simulate(config).unwrap();

    assert!(!catalog.is_empty(), "reference scenario should emit regions");
    for region in &catalog {
        assert!(region.day < ndays, "day {} past the run", region.day);
        assert!((0.0..=PI).contains(&region.theta), "theta {}", region.theta);
        assert!((0.0..2.0 * PI).contains(&region.phi), "phi {}", region.phi);
        assert!(region.bmax > 0.0);
    }
    assert!(catalog
        .as_slice()
        .windows(2)
        .all(|pair| pair[0].day <= pair[1].day));
}

#[test]
fn test_previous_cycle_emits_regions_at_the_start_of_a_run() {
    // Cycle 0 is still near its quiet edge; cycle -1 is at phase 0.75-0.84.
    let catalog = simulate(EmergenceConfig::default()).unwrap();
    let early = catalog.in_days(0, 100);
    assert!(!early.is_empty(), "no regions in the first 100 days");
    // The declining cycle sits near the equatorward end of the band.
    let mean_lat = early.iter().map(|r| r.latitude_deg().abs()).sum::<f64>() / early.len() as f64;
    assert!(mean_lat < 15.0, "mean early latitude {}", mean_lat);
}

#[test]
fn test_same_seed_gives_identical_catalogs() {
    let a = simulate(EmergenceConfig::with_seed(7)).unwrap();
    let b = simulate(EmergenceConfig::with_seed(7)).unwrap();
    assert_eq!(a, b);

    let c = simulate(EmergenceConfig::with_seed(8)).unwrap();
    assert_ne!(a, c, "different seeds should diverge");
}

#[test]
fn test_zero_days_leaves_recency_untouched() {
    let config = EmergenceConfig {
        ndays: 0,
        ..Default::default()
    };
    let mut simulation = Simulation::new(config).unwrap();
    simulation.run();

    assert!(simulation.catalog().is_empty());
    let tau2 = simulation.recency().tau2();
    assert!(simulation.recency().values().iter().all(|&tau| tau == tau2));
}

#[test]
fn test_regions_stay_inside_the_active_band() {
    for mode in [LatitudeMode::Drifting, LatitudeMode::Uniform] {
        let config = EmergenceConfig {
            latitude_mode: mode,
            ndays: 1500,
            ..Default::default()
        };
        let (min_lat, max_lat) = (config.min_lat_deg, config.max_lat_deg);
        let catalog = simulate(config).unwrap();
        for region in &catalog {
            let lat = region.latitude_deg().abs();
            assert!(
                lat >= min_lat - 1e-9 && lat <= max_lat + 1e-9,
                "{:?} latitude {} outside band",
                mode,
                lat
            );
        }
    }
}

#[test]
fn test_invalid_configuration_is_rejected_before_sampling() {
    let config = EmergenceConfig {
        activity_rate: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        Simulation::new(config),
        Err(ConfigError::NonPositiveActivityRate(_))
    ));
}

#[test]
fn test_monthly_counts_and_fit_follow_the_cycle() {
    let config = EmergenceConfig {
        ndays: 365 * 12,
        ..Default::default()
    };
    let ndays = config.ndays;
    let period = config.cycle_length_years;
    let catalog = simulate(config).unwrap();

    let counts = monthly_spot_counts(&catalog, ndays);
    assert_eq!(counts.len(), 144);
    assert_eq!(counts.total() as usize, catalog.len());

    let fit = fit_spot_amplitude(&counts, period).unwrap();
    assert!(fit.amplitude > 0.0, "amplitude {}", fit.amplitude);
    assert!(fit.period_years >= 0.5 * period && fit.period_years <= 1.5 * period);
    assert!(fit.phase >= 0.0 && fit.phase < PI);
}

#[test]
fn test_exports_write_files() {
    let config = EmergenceConfig {
        ndays: 400,
        ..Default::default()
    };
    let ndays = config.ndays;
    let catalog = simulate(config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("regions.csv");
    export_catalog_csv(&catalog, &csv).unwrap();
    let text = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
    assert_eq!(text.lines().count(), catalog.len() + 1);

    let png = dir.path().join("butterfly.png");
    export_butterfly_png(&catalog, ndays, &png, &ButterflyOptions::default()).unwrap();
    assert!(std::fs::metadata(&png).unwrap().len() > 0);
}
