use crate::model::RunReport;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Directory for the interactive mode's log file.
pub fn log_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("no cache directory on this platform")?;
    let dir = base.join("jobscout");
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn export_json(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let data = serde_json::to_vec_pretty(report).context("serialize run report")?;
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Default export file name for the interactive mode.
pub fn default_export_name(report: &RunReport) -> String {
    format!(
        "jobscout-{}-{}.json",
        report.finished_at.replace(':', "-").replace('T', "_"),
        &report.run_id[..8.min(report.run_id.len())]
    )
}
