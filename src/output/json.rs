//! JSON manifest describing one report run.
//!
//! The manifest lists every artifact that was written or skipped, so that
//! downstream tooling does not have to probe the output directory.

use super::{ensure_parent_dir, validate_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level manifest structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportManifest {
    /// Schema version for compatibility checking
    pub version: String,

    /// Input log the report was generated from
    pub input: String,

    /// Number of measurements in the log
    pub row_count: usize,

    /// Number of positionally paired gate operations
    pub gate_operations: usize,

    /// Mean fragmentation index over rows with a defined index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_fragmentation: Option<f64>,

    /// File names written, in generation order
    pub artifacts: Vec<String>,

    /// Artifacts not produced, with the reason
    pub skipped: Vec<SkippedArtifact>,

    /// When the report was generated (RFC 3339 in JSON)
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedArtifact {
    pub name: String,
    pub reason: String,
}

/// Write a manifest to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_manifest(manifest: &ReportManifest, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path)?;
    let writer = BufWriter::new(file);

    // Serialize to JSON with pretty printing
    serde_json::to_writer_pretty(writer, manifest)?;

    info!("Manifest written: {}", output_path.display());
    Ok(())
}

/// Read a manifest from a JSON file
///
/// **Public** - useful for validation and testing
pub fn read_manifest(input_path: impl AsRef<Path>) -> Result<ReportManifest, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading manifest from: {}", input_path.display());

    let file = File::open(input_path)?;
    let manifest: ReportManifest = serde_json::from_reader(file)?;

    debug!(
        "Manifest loaded: version {}, {} artifacts",
        manifest.version,
        manifest.artifacts.len()
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::NamedTempFile;

    fn create_test_manifest() -> ReportManifest {
        ReportManifest {
            version: "1.0.0".to_string(),
            input: "memory_gate_system.csv".to_string(),
            row_count: 42,
            gate_operations: 5,
            average_fragmentation: Some(12.5),
            artifacts: vec!["memory_timeline_gate_system.png".to_string()],
            skipped: vec![SkippedArtifact {
                name: "memory_distribution_pie_gate_system.png".to_string(),
                reason: "no \"After MQTT init\" event".to_string(),
            }],
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_write_and_read_manifest() {
        let manifest = create_test_manifest();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_manifest(&manifest, path).unwrap();
        let loaded = read_manifest(path).unwrap();

        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_generated_at_is_rfc3339() {
        let json = serde_json::to_string(&create_test_manifest()).unwrap();
        assert!(json.contains(r#""generated_at":"2024-01-01T00:00:00Z""#));
    }

    #[test]
    fn test_manifest_omits_missing_fragmentation() {
        let mut manifest = create_test_manifest();
        manifest.average_fragmentation = None;

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("average_fragmentation"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/manifest.json");

        write_manifest(&create_test_manifest(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
