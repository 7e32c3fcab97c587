//! Run summary export: the configuration, counters and optional cycle fit.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::analysis::SpotCycleFit;
use crate::emergence::{EmergenceConfig, SimulationSummary};

use super::ExportError;

/// Everything needed to reproduce and characterize a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub config: &'a EmergenceConfig,
    pub summary: SimulationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<SpotCycleFit>,
}

/// Writes the run summary as pretty-printed JSON.
pub fn export_run_summary_json(summary: &RunSummary<'_>, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_summary_json_embeds_config_and_counters() {
        let config = EmergenceConfig::default();
        let summary = RunSummary {
            config: &config,
            summary: SimulationSummary {
                days: 10,
                regions: 4,
                large_regions: 1,
                active_cycle_days: 20,
            },
            fit: None,
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.json");
        export_run_summary_json(&summary, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["regions"], 4);
        assert_eq!(value["summary"]["large_regions"], 1);
        assert_eq!(value["config"]["seed"], 88);
        assert_eq!(value["config"]["latitude_mode"], "drifting");
        assert!(value.get("fit").is_none());

        // The embedded config reloads as a configuration file.
        let reloaded = EmergenceConfig::from_json_str(&value["config"].to_string()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_summary_json_includes_fit_when_present() {
        let config = EmergenceConfig::solar_like(3);
        let summary = RunSummary {
            config: &config,
            summary: SimulationSummary::default(),
            fit: Some(SpotCycleFit {
                amplitude: 42.0,
                period_years: 11.0,
                phase: 0.5,
                rss: 1.0,
            }),
        };
        let dir = tempdir().unwrap();
        let path = dir.path().join("solar.json");
        export_run_summary_json(&summary, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["fit"]["amplitude"], 42.0);
        assert_eq!(value["fit"]["period_years"], 11.0);
    }
}
