use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

use super::entry::UsageEntry;
use super::options::SizeUnit;

/// Regex for paths handed to a subprocess argv: no leading dash or
/// whitespace, no control characters. Arguments are never shell-interpreted,
/// so this only has to block option injection and unprintable garbage.
static SAFE_PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s-][^\x00-\x1f]*$").expect("Invalid SAFE_PATH_PATTERN regex"));

/// Validate a path before it reaches a subprocess argv
fn validate_path(path: &str) -> Result<()> {
    if !SAFE_PATH_PATTERN.is_match(path) {
        bail!("Invalid target path: {:?}", path);
    }
    Ok(())
}

/// Supplies (size, path) measurements for a subtree or a single entry
pub trait UsageSource {
    /// Measure every entry under `root` up to `max_depth` levels (0 = unlimited)
    fn subtree_usage(&self, root: &str, max_depth: u32, unit: SizeUnit) -> Result<Vec<UsageEntry>>;

    /// Measure a single file or directory.
    /// Returns None when the entry cannot be measured (vanished, unreadable) -
    /// that is a skip for the caller, not a failure.
    fn entry_usage(&self, path: &str, unit: SizeUnit) -> Result<Option<UsageEntry>>;
}

/// Lists files by modification recency
pub trait FileFinder {
    /// List regular files under `root` (bounded by `max_depth` when > 0)
    /// modified within the last `days` days
    fn files_modified_within(&self, root: &str, max_depth: u32, days: u32) -> Result<Vec<String>>;
}

/// du-backed usage source
pub struct DiskUsage {
    /// Directories excluded from every scan
    excluded_dirs: Vec<String>,
}

impl DiskUsage {
    /// Creates a new du adapter with the given exclusion list
    pub fn new(excluded_dirs: Vec<String>) -> Self {
        Self { excluded_dirs }
    }

    /// Collect entries from a finished du invocation.
    /// du exits non-zero when parts of the tree are unreadable but still
    /// reports what it could measure; only a run that produced nothing is
    /// treated as fatal.
    fn collect_output(root: &str, output: std::process::Output) -> Result<Vec<UsageEntry>> {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let entries: Vec<UsageEntry> = stdout.lines().filter_map(UsageEntry::parse).collect();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if entries.is_empty() {
                bail!("du failed for {}: {}", root, stderr.trim());
            }
            tracing::warn!("du reported errors under {}: {}", root, stderr.trim());
        }

        Ok(entries)
    }
}

impl UsageSource for DiskUsage {
    fn subtree_usage(&self, root: &str, max_depth: u32, unit: SizeUnit) -> Result<Vec<UsageEntry>> {
        validate_path(root)?;

        let mut cmd = Command::new("du");
        cmd.arg(format!("--block-size={}", unit.du_block_size()))
            .args(["--time", "--time-style=long-iso"]);
        if max_depth > 0 {
            cmd.arg(format!("--max-depth={}", max_depth));
        }
        for dir in &self.excluded_dirs {
            cmd.arg(format!("--exclude={}", dir));
        }
        cmd.arg("--").arg(root);

        let output = cmd.output().context("Failed to execute du")?;
        Self::collect_output(root, output)
    }

    fn entry_usage(&self, path: &str, unit: SizeUnit) -> Result<Option<UsageEntry>> {
        validate_path(path)?;

        let output = Command::new("du")
            .arg(format!("--block-size={}", unit.du_block_size()))
            .args(["--time", "--time-style=long-iso", "-s", "--"])
            .arg(path)
            .output()
            .context("Failed to execute du")?;

        if !output.status.success() {
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().and_then(UsageEntry::parse))
    }
}

/// find-backed file lister
pub struct Find;

impl Find {
    /// Creates a new find adapter
    pub fn new() -> Self {
        Self
    }
}

impl Default for Find {
    fn default() -> Self {
        Self::new()
    }
}

impl FileFinder for Find {
    fn files_modified_within(&self, root: &str, max_depth: u32, days: u32) -> Result<Vec<String>> {
        validate_path(root)?;

        let mut cmd = Command::new("find");
        cmd.arg(root);
        if max_depth > 0 {
            cmd.arg("-maxdepth").arg(max_depth.to_string());
        }
        cmd.args(["-type", "f", "-mtime"]).arg(format!("-{}", days));

        let output = cmd.output().context("Failed to execute find")?;

        // Same policy as du: partial results with errors on stderr are kept
        let stdout = String::from_utf8_lossy(&output.stdout);
        let files: Vec<String> = stdout.lines().map(|s| s.to_string()).collect();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if files.is_empty() {
                bail!("find failed for {}: {}", root, stderr.trim());
            }
            tracing::warn!("find reported errors under {}: {}", root, stderr.trim());
        }

        Ok(files)
    }
}
