//! Starspots CLI - Stochastic starspot emergence simulator.
//!
//! Generate catalogs of emerging active regions and render butterfly
//! diagrams and recency maps from them.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use starspots::analysis::{fit_spot_amplitude, monthly_spot_counts, SpotCycleFit};
use starspots::emergence::{
    BinGeometry, ConfigError, CycleTiming, EmergenceConfig, LatitudeMode, RecencyTracker, Simulation,
    SizeLadder, DAYS_PER_YEAR,
};
use starspots::geometry::FLUX_PER_SEPARATION_SQ;
use starspots::export::{
    export_butterfly_png, export_catalog_csv, export_catalog_json, export_recency_png,
    export_run_summary_json, ButterflyOptions, RecencyMapOptions, RecentRegions, RunSummary,
};

/// Stochastic starspot emergence simulator.
#[derive(Parser)]
#[command(name = "starspots")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate region emergence and export the catalog.
    Generate {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "regions")]
        name: String,

        /// Export a butterfly diagram PNG.
        #[arg(long)]
        butterfly: bool,

        /// Export the final recency map PNG with the last month of regions on top.
        #[arg(long)]
        recency_map: bool,

        /// Also export a recency map every N days.
        #[arg(long, value_name = "DAYS", value_parser = clap::value_parser!(u32).range(1..))]
        recency_every: Option<u32>,

        /// Also export the catalog as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Run the solar-like preset and fit the cycle amplitude of the monthly counts.
    Solar {
        /// Random seed for reproducible generation.
        #[arg(short, long, default_value = "88")]
        seed: u64,

        /// Activity rate relative to the Sun.
        #[arg(long, default_value = "1.0")]
        activity_rate: f64,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "solar")]
        name: String,

        /// Export a butterfly diagram PNG.
        #[arg(long)]
        butterfly: bool,
    },
    /// Show the derived bins, size ladder and cycle timing for a configuration.
    Info {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Configuration flags shared by `generate` and `info`.
///
/// Flags override values loaded from `--config` or `--solar-like`, which in turn
/// override the defaults. The result is validated once, after all overrides.
#[derive(Args)]
struct ConfigArgs {
    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from the solar-like preset (11-year cycles, 100 years).
    #[arg(long, conflicts_with = "config")]
    solar_like: bool,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Activity rate relative to the Sun (1.0 = solar).
    #[arg(long)]
    activity_rate: Option<f64>,

    /// Lowest active latitude in degrees.
    #[arg(long)]
    min_lat: Option<f64>,

    /// Highest active latitude in degrees.
    #[arg(long)]
    max_lat: Option<f64>,

    /// Years between consecutive cycle starts.
    #[arg(long)]
    cycle_length: Option<f64>,

    /// Years each cycle overlaps the next.
    #[arg(long)]
    cycle_overlap: Option<f64>,

    /// Number of simulated days.
    #[arg(long)]
    ndays: Option<u32>,

    /// Active-latitude policy.
    #[arg(long)]
    latitude_mode: Option<LatitudeModeArg>,

    /// Number of longitude bins.
    #[arg(long)]
    nlon: Option<usize>,

    /// Number of latitude bins per hemisphere.
    #[arg(long)]
    nlat: Option<usize>,

    /// Number of size classes.
    #[arg(long)]
    nbin: Option<usize>,

    /// Log spacing of the size classes.
    #[arg(long)]
    delt: Option<f64>,

    /// Area of the largest regions in square degrees.
    #[arg(long)]
    amax: Option<f64>,

    /// Start of the correlation window in days.
    #[arg(long)]
    tau1: Option<u32>,

    /// End of the correlation window in days.
    #[arg(long)]
    tau2: Option<u32>,

    /// Total probability of a correlated emergence over the window.
    #[arg(long)]
    correlation_probability: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LatitudeModeArg {
    /// Belt drifts equatorward over the cycle.
    Drifting,
    /// Fixed broad band.
    Uniform,
}

impl From<LatitudeModeArg> for LatitudeMode {
    fn from(arg: LatitudeModeArg) -> Self {
        match arg {
            LatitudeModeArg::Drifting => LatitudeMode::Drifting,
            LatitudeModeArg::Uniform => LatitudeMode::Uniform,
        }
    }
}

impl ConfigArgs {
    /// Resolves the configuration, exiting on an unreadable config file.
    fn resolve(&self) -> EmergenceConfig {
        self.load().unwrap_or_else(|e| {
            if let Some(path) = &self.config {
                eprintln!("Error loading config {}: {}", path.display(), e);
            } else {
                eprintln!("Error: {}", e);
            }
            std::process::exit(1);
        })
    }

    /// Loads the base configuration and applies the flag overrides, without validating.
    fn load(&self) -> Result<EmergenceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => EmergenceConfig::read_json_file(path)?,
            None if self.solar_like => EmergenceConfig::solar_like(self.seed.unwrap_or(88)),
            None => EmergenceConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rate) = self.activity_rate {
            config.activity_rate = rate;
        }
        if let Some(min_lat) = self.min_lat {
            config.min_lat_deg = min_lat;
        }
        if let Some(max_lat) = self.max_lat {
            config.max_lat_deg = max_lat;
        }
        if let Some(length) = self.cycle_length {
            config.cycle_length_years = length;
        }
        if let Some(overlap) = self.cycle_overlap {
            config.cycle_overlap_years = overlap;
        }
        if let Some(ndays) = self.ndays {
            config.ndays = ndays;
        }
        if let Some(mode) = self.latitude_mode {
            config.latitude_mode = mode.into();
        }
        if let Some(nlon) = self.nlon {
            config.bins.nlon = nlon;
        }
        if let Some(nlat) = self.nlat {
            config.bins.nlat = nlat;
        }
        if let Some(nbin) = self.nbin {
            config.sizes.nbin = nbin;
        }
        if let Some(delt) = self.delt {
            config.sizes.delt = delt;
        }
        if let Some(amax) = self.amax {
            config.sizes.amax = amax;
        }
        if let Some(tau1) = self.tau1 {
            config.correlation.tau1 = tau1;
        }
        if let Some(tau2) = self.tau2 {
            config.correlation.tau2 = tau2;
        }
        if let Some(probability) = self.correlation_probability {
            config.correlation.probability = probability;
        }

        Ok(config)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            name,
            butterfly,
            recency_map,
            recency_every,
            json,
        } => {
            let outputs = GenerateOutputs {
                butterfly,
                recency_map,
                recency_every,
                json,
            };
            run_generate(config.resolve(), &output, &name, &outputs);
        }
        Commands::Solar {
            seed,
            activity_rate,
            output,
            name,
            butterfly,
        } => {
            let mut config = EmergenceConfig::solar_like(seed);
            config.activity_rate = activity_rate;
            run_solar(config, &output, &name, butterfly);
        }
        Commands::Info { config } => {
            run_info(&config.resolve());
        }
    }
}

/// Builds a simulation, exiting with a message if the configuration is invalid.
fn build_simulation(config: EmergenceConfig) -> Simulation {
    Simulation::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    })
}

fn create_output_dir(output: &Path) {
    std::fs::create_dir_all(output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });
}

/// Runs the simulation, printing the number of regions per simulated year.
fn run_with_progress(simulation: &mut Simulation) {
    let year_length = DAYS_PER_YEAR as u32;
    let regions_this_year = Cell::new(0usize);

    simulation.run_with_callbacks(
        |nday, _| {
            if (nday + 1) % year_length == 0 {
                println!(
                    "  Year {:>3}: {:>5} regions",
                    (nday + 1) / year_length,
                    regions_this_year.replace(0)
                );
            }
        },
        |_| regions_this_year.set(regions_this_year.get() + 1),
    );
}

/// Runs the simulation one day at a time, writing a recency map every `every` days.
fn run_with_recency_frames(simulation: &mut Simulation, output: &Path, name: &str, every: u32) {
    let options = RecencyMapOptions::default();
    let mut frames = 0usize;

    while let Some(nday) = simulation.step_day(|_| {}) {
        if (nday + 1) % every != 0 {
            continue;
        }
        let path = output.join(format!("{}_recency_{:05}.png", name, nday));
        let recent = RecentRegions {
            catalog: simulation.catalog(),
            day: nday,
        };
        export_recency_png(simulation.recency(), simulation.geometry(), Some(recent), &path, &options)
            .unwrap_or_else(|e| {
                eprintln!("Error exporting recency map: {}", e);
                std::process::exit(1);
            });
        frames += 1;
    }
    println!("  Wrote {} recency frames to {}", frames, output.display());
}

fn export_butterfly(simulation: &Simulation, output: &Path, name: &str) {
    let path = output.join(format!("{}_butterfly.png", name));
    let options = ButterflyOptions {
        lat_limit_deg: (simulation.config().max_lat_deg + 10.0).min(90.0),
        ..Default::default()
    };
    export_butterfly_png(simulation.catalog(), simulation.config().ndays, &path, &options).unwrap_or_else(|e| {
        eprintln!("Error exporting butterfly diagram: {}", e);
        std::process::exit(1);
    });
    println!("  Exported butterfly diagram: {}", path.display());
}

fn export_summary(simulation: &Simulation, fit: Option<SpotCycleFit>, output: &Path, name: &str) {
    let path = output.join(format!("{}_summary.json", name));
    let summary = RunSummary {
        config: simulation.config(),
        summary: simulation.summary(),
        fit,
    };
    export_run_summary_json(&summary, &path).unwrap_or_else(|e| {
        eprintln!("Error exporting run summary: {}", e);
        std::process::exit(1);
    });
    println!("  Exported run summary: {}", path.display());
}

/// Optional outputs of the `generate` command.
struct GenerateOutputs {
    butterfly: bool,
    recency_map: bool,
    recency_every: Option<u32>,
    json: bool,
}

fn run_generate(config: EmergenceConfig, output: &Path, name: &str, outputs: &GenerateOutputs) {
    let mut simulation = build_simulation(config);
    let config = simulation.config().clone();

    println!("Starspots - Stochastic Emergence Simulator");
    println!("==========================================");
    println!("Seed: {}", config.seed);
    println!("Days: {}", config.ndays);
    println!("Activity rate: {}", config.activity_rate);
    println!(
        "Latitude band: {}°-{}° ({})",
        config.min_lat_deg,
        config.max_lat_deg,
        config.latitude_mode.name()
    );
    println!(
        "Cycles: {} yr, overlap {} yr",
        config.cycle_length_years, config.cycle_overlap_years
    );
    println!("Output: {}", output.display());

    let start = Instant::now();

    println!("\nSimulating...");
    match outputs.recency_every {
        Some(every) => {
            create_output_dir(output);
            run_with_recency_frames(&mut simulation, output, name, every);
        }
        None => run_with_progress(&mut simulation),
    }

    let summary = simulation.summary();
    println!("Simulation completed in {:.2?}", start.elapsed());
    println!(
        "Regions: {} ({} large)",
        summary.regions, summary.large_regions
    );

    println!("\nExporting...");
    let export_start = Instant::now();
    create_output_dir(output);

    let csv_path = output.join(format!("{}.csv", name));
    export_catalog_csv(simulation.catalog(), &csv_path).unwrap_or_else(|e| {
        eprintln!("Error exporting CSV: {}", e);
        std::process::exit(1);
    });
    println!("  Exported catalog: {}", csv_path.display());
    export_summary(&simulation, None, output, name);

    if outputs.json {
        let json_path = output.join(format!("{}.json", name));
        export_catalog_json(simulation.catalog(), &json_path).unwrap_or_else(|e| {
            eprintln!("Error exporting JSON: {}", e);
            std::process::exit(1);
        });
        println!("  Exported catalog: {}", json_path.display());
    }

    if outputs.butterfly {
        export_butterfly(&simulation, output, name);
    }

    if outputs.recency_map {
        let path = output.join(format!("{}_recency.png", name));
        let recent = config.ndays.checked_sub(1).map(|day| RecentRegions {
            catalog: simulation.catalog(),
            day,
        });
        export_recency_png(
            simulation.recency(),
            simulation.geometry(),
            recent,
            &path,
            &RecencyMapOptions::default(),
        )
        .unwrap_or_else(|e| {
            eprintln!("Error exporting recency map: {}", e);
            std::process::exit(1);
        });
        println!("  Exported recency map: {}", path.display());
    }

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_solar(config: EmergenceConfig, output: &Path, name: &str, butterfly: bool) {
    let mut simulation = build_simulation(config);
    let config = simulation.config().clone();

    println!("Starspots - Solar Normalization");
    println!("===============================");
    println!("Seed: {}", config.seed);
    println!("Activity rate: {}", config.activity_rate);
    println!("Years: {:.1}", f64::from(config.ndays) / DAYS_PER_YEAR);

    let start = Instant::now();
    println!("\nSimulating...");
    run_with_progress(&mut simulation);
    println!("Simulation completed in {:.2?}", start.elapsed());

    let counts = monthly_spot_counts(simulation.catalog(), config.ndays);
    println!("\nMonthly counts: {} months, peak {}", counts.len(), counts.peak());

    let fit = fit_spot_amplitude(&counts, config.cycle_length_years).unwrap_or_else(|e| {
        eprintln!("Error fitting monthly counts: {}", e);
        std::process::exit(1);
    });
    println!("Fit N(t) = A·sin²(πt/P + φ):");
    println!("  Amplitude: {:.3} regions/month", fit.amplitude);
    println!("  Period:    {:.3} yr", fit.period_years);
    println!("  Phase:     {:.3} rad", fit.phase);
    println!("  RSS:       {:.3}", fit.rss);

    create_output_dir(output);
    let csv_path = output.join(format!("{}.csv", name));
    export_catalog_csv(simulation.catalog(), &csv_path).unwrap_or_else(|e| {
        eprintln!("Error exporting CSV: {}", e);
        std::process::exit(1);
    });
    println!("\n  Exported catalog: {}", csv_path.display());
    export_summary(&simulation, Some(fit), output, name);

    if butterfly {
        export_butterfly(&simulation, output, name);
    }

    println!("Done!");
}

fn run_info(config: &EmergenceConfig) {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let geometry = BinGeometry::from_config(config.min_lat_deg, config.max_lat_deg, &config.bins);
    let ladder = SizeLadder::from_config(&config.sizes);
    let timing = CycleTiming::from_config(config);
    let tracker = RecencyTracker::for_geometry(&geometry, &config.correlation);

    println!("Starspots - Configuration Info");
    println!("==============================");
    println!();
    println!("Bins:");
    println!("  Longitude: {:>4} bins of {:.2}°", geometry.nlon, geometry.dlon);
    println!(
        "  Latitude:  {:>4} bins of {:.2}° per hemisphere ({}°-{}°)",
        geometry.nlat, geometry.dlat, geometry.min_lat, geometry.max_lat
    );
    println!("  Cells:     {:>4}", geometry.num_cells());
    println!();
    println!("Size ladder (class 0 largest):");
    for (class, (bsiz, fact)) in ladder.bsiz.iter().zip(&ladder.fact).enumerate() {
        println!(
            "  Class {}: separation {:>6.3}°  bmax {:>8.3}  relative frequency {:>8.3}",
            class,
            bsiz,
            FLUX_PER_SEPARATION_SQ * bsiz * bsiz,
            fact
        );
    }
    println!("  Total frequency: {:.3}", ladder.ftot);
    println!("  Area conversion: {:.3}", ladder.dcon);
    println!();
    println!("Cycle timing:");
    println!("  Cycle length:  {:>8.0} days", timing.cycle_length_days);
    println!("  Active window: {:>8.0} days", timing.active_window_days);
    println!("  Latitude mode: {}", config.latitude_mode.name());
    println!();
    println!("Correlation window:");
    println!("  τ ∈ [{}, {}) days", tracker.tau1(), tracker.tau2());
    println!(
        "  Boost per cell-day: {:.3e}",
        config.correlation.probability / f64::from(tracker.tau2() - tracker.tau1())
    );
}
