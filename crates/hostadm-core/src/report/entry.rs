use chrono::NaiveDateTime;

/// One (size, path) measurement from the disk-usage scan
#[derive(Debug, Clone, PartialEq)]
pub struct UsageEntry {
    /// Size in the report's unit scale
    pub size: u64,
    /// Path of the measured file or directory
    pub path: String,
    /// Modification time, when the scan requested one
    pub mtime: Option<NaiveDateTime>,
}

impl UsageEntry {
    /// Parse one line of du output.
    /// Format with `--time --time-style=long-iso`: `size\tYYYY-MM-DD HH:MM\tpath`;
    /// without a timestamp column: `size\tpath`. A tab inside the path only
    /// splits once, so trailing tabs stay part of the path.
    pub fn parse(line: &str) -> Option<Self> {
        let (size_str, rest) = line.split_once('\t')?;
        let size = size_str.trim().parse().ok()?;

        let (mtime, path) = match rest.split_once('\t') {
            Some((ts, path)) => match NaiveDateTime::parse_from_str(ts.trim(), "%Y-%m-%d %H:%M") {
                Ok(ts) => (Some(ts), path),
                // Second column is not a timestamp: the whole rest is the path
                Err(_) => (None, rest),
            },
            None => (None, rest),
        };

        if path.is_empty() {
            return None;
        }

        Some(Self {
            size,
            path: path.to_string(),
            mtime,
        })
    }
}
