//! Read-only system information passthroughs.
//!
//! Each call captures the formatted output of one OS command and hands it
//! back as a text blob for the viewer. Only the disk usage check adds any
//! interpretation of its own.

use anyhow::{bail, Context, Result};
use std::process::Command;

/// Client for read-only system information commands
pub struct SystemInfo;

impl SystemInfo {
    /// Creates a new client
    pub fn new() -> Self {
        Self
    }

    /// Run a command and capture its stdout
    fn capture(program: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute {}", program))?;

        if !output.status.success() {
            bail!(
                "{} failed: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Block device listing
    pub fn block_devices(&self) -> Result<String> {
        Self::capture("lsblk", &["-o", "NAME,SIZE,TYPE,FSTYPE,MOUNTPOINT"])
    }

    /// Mounted filesystem table.
    /// findmnt draws the tree; raw mount output is the fallback when it is absent.
    pub fn mount_table(&self) -> Result<String> {
        Self::capture("findmnt", &["--real"]).or_else(|_| Self::capture("mount", &[]))
    }

    /// Extended I/O statistics, plain iostat when -x is unsupported
    pub fn io_stats(&self) -> Result<String> {
        Self::capture("iostat", &["-x"]).or_else(|_| Self::capture("iostat", &[]))
    }

    /// df table with filesystems at or above the threshold called out first
    pub fn usage_check(&self, threshold_pct: u8) -> Result<String> {
        let table = Self::capture("df", &["-hP"])?;
        Ok(annotate_usage(&table, threshold_pct))
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Prefix the raw df table with a summary of filesystems at/over the threshold.
/// df -P rows are: Filesystem Size Used Avail Use% Mounted-on.
fn annotate_usage(table: &str, threshold_pct: u8) -> String {
    let mut over = Vec::new();
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        if let Some(pct) = fields[4]
            .strip_suffix('%')
            .and_then(|p| p.parse::<u8>().ok())
        {
            if pct >= threshold_pct {
                // Mount points with spaces span the remaining fields
                over.push(format!("  {} at {}% ({})", fields[0], pct, fields[5..].join(" ")));
            }
        }
    }

    let mut out = String::new();
    if over.is_empty() {
        out.push_str(&format!("All filesystems below {}% usage.\n\n", threshold_pct));
    } else {
        out.push_str(&format!(
            "Filesystems at or above {}% usage:\n",
            threshold_pct
        ));
        for line in &over {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(table);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DF_TABLE: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1        50G   45G    5G  90% /
/dev/sdb1       100G   20G   80G  20% /data
tmpfs           7.8G     0  7.8G   0% /dev/shm
/dev/sdc1        10G  9.5G  0.5G  95% /mnt/backup disk
";

    #[test]
    fn test_annotate_flags_filesystems_over_threshold() {
        let out = annotate_usage(DF_TABLE, 80);
        assert!(out.starts_with("Filesystems at or above 80% usage:"));
        assert!(out.contains("  /dev/sda1 at 90% (/)"));
        assert!(out.contains("  /dev/sdc1 at 95% (/mnt/backup disk)"));
        assert!(!out.contains("/dev/sdb1 at"));
        // Raw table is preserved below the summary
        assert!(out.contains("Filesystem      Size  Used Avail Use% Mounted on"));
    }

    #[test]
    fn test_annotate_all_clear() {
        let out = annotate_usage(DF_TABLE, 99);
        assert!(out.starts_with("All filesystems below 99% usage."));
    }

    #[test]
    fn test_annotate_threshold_is_inclusive() {
        let out = annotate_usage(DF_TABLE, 90);
        assert!(out.contains("/dev/sda1 at 90%"));
    }

    #[test]
    fn test_annotate_skips_malformed_lines() {
        let out = annotate_usage("Filesystem\ngarbage line\n", 50);
        assert!(out.starts_with("All filesystems below 50% usage."));
    }
}
