//! Report artifact rendering.
//!
//! Renderers are pure consumers of the computed [`crate::models::Summary`]:
//! they read every field and mutate nothing. Each renderer produces
//! in-memory strings; writing them to disk happens here so the render
//! functions stay trivially testable.

pub mod html;
pub mod spreadsheet;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Write named artifacts into `dir`, creating it if needed.
///
/// Returns the paths written, in input order.
pub fn write_artifacts(dir: &Path, artifacts: &[(String, String)]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("run-1");

        let artifacts = vec![
            ("report.html".to_string(), "<html></html>".to_string()),
            ("summary.csv".to_string(), "a,b\n1,2\n".to_string()),
        ];

        let written = write_artifacts(&target, &artifacts).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&written[0]).unwrap(),
            "<html></html>"
        );
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "a,b\n1,2\n");
    }
}
