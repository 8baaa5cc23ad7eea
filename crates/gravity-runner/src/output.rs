//! Rendering of sync results.

use std::fmt::Write;

use clap::ValueEnum;
use gravity_agent::{DispatchSummary, SettingsModel};
use serde::Serialize;

use crate::error::RunnerResult;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Outcome of one completed sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Device name.
    pub device: String,
    /// Bridge address or capture path.
    pub source: String,
    /// Requests written, including retries.
    pub attempts: u32,
    /// Dispatch counts.
    pub summary: DispatchSummary,
    /// The mirrored settings after the sync.
    pub settings: SettingsModel,
}

impl SyncReport {
    /// Render in the requested format.
    pub fn render(&self, format: OutputFormat) -> RunnerResult<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }

    fn to_text(&self) -> String {
        let s = &self.settings;
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "Device:        {} ({})", self.device, self.source);
        let _ = writeln!(
            out,
            "Sync:          {} applied, {} unknown, {} malformed, {} rejected, {} attempt(s)",
            self.summary.applied,
            self.summary.unknown_tags,
            self.summary.malformed,
            self.summary.rejected,
            self.attempts
        );
        let _ = writeln!(out, "Channel:       {}", s.channel);
        let _ = writeln!(out, "Hopping:       {:?} ({:?})", s.hop_status, s.hop_mode);
        let _ = writeln!(out, "MAC:           {}", s.mac);
        let _ = writeln!(out, "MAC randomise: {}", s.mac_randomise);
        let _ = writeln!(out, "SSID length:   {}..{}", s.ssid_len_min, s.ssid_len_max);
        let _ = writeln!(out, "SSID count:    {}", s.ssid_default_count);
        let _ = writeln!(out, "SSID source:   {:?}", s.ssid_source);
        let _ = writeln!(
            out,
            "Attack:        {} packets / {} ms",
            s.attack_packets, s.attack_millis
        );
        let _ = writeln!(out, "Expiry:        {}", s.packet_expiry);
        let _ = writeln!(
            out,
            "Purge:         age={} rssi={} unselected={} unnamed={}",
            s.purge.age, s.purge.rssi, s.purge.unselected, s.purge.unnamed
        );
        let _ = writeln!(
            out,
            "Purge limits:  rssi <= {} dBm, age >= {} s",
            s.purge_rssi_max(),
            s.purge_age_min()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> SyncReport {
        SyncReport {
            device: "bench".to_string(),
            source: "capture.txt".to_string(),
            attempts: 1,
            summary: DispatchSummary {
                applied: 2,
                ..Default::default()
            },
            settings: SettingsModel::new(),
        }
    }

    #[test]
    fn test_text_output() {
        let text = report().render(OutputFormat::Text).unwrap();
        assert!(text.contains("bench (capture.txt)"));
        assert!(text.contains("2 applied"));
        assert!(text.contains("Get..Get"));
    }

    #[test]
    fn test_json_output() {
        let json = report().render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["device"], "bench");
        assert_eq!(value["summary"]["applied"], 2);
        assert_eq!(value["settings"]["ssid_len_min"], "Get");
        assert_eq!(value["settings"]["channel"], 1);
    }

    #[test]
    fn test_yaml_output() {
        let yaml = report().render(OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("device: bench"));
    }
}
