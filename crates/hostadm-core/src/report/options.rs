use std::fmt;

/// The full set of user-chosen parameters for one report generation.
///
/// Unit, format and sort key stay raw strings at this boundary: an invalid
/// value degrades to the default with a warning instead of rejecting the
/// request, so validation happens inside the generator rather than here.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Directory to scan
    pub target_dir: String,
    /// Depth limit for the scan (0 = unlimited)
    pub max_depth: u32,
    /// Size unit: K, M or G (case-insensitive)
    pub unit: String,
    /// Output format: text, csv, html or json
    pub format: String,
    /// Sort key: name, size_asc, size_desc or mtime
    pub sort: String,
    /// Minimum entry size to include, in the chosen unit
    pub size_threshold: u64,
    /// Only count files modified within the last N days
    pub modified_within_days: Option<u32>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            target_dir: ".".to_string(),
            max_depth: 0,
            unit: "M".to_string(),
            format: "text".to_string(),
            sort: "name".to_string(),
            size_threshold: 0,
            modified_within_days: None,
        }
    }
}

/// Block-size unit for measurements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    K,
    M,
    G,
}

impl SizeUnit {
    /// Parse a unit name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "K" => Some(SizeUnit::K),
            "M" => Some(SizeUnit::M),
            "G" => Some(SizeUnit::G),
            _ => None,
        }
    }

    /// Block-size argument for du.
    /// The numeric prefix keeps du's size column unsuffixed.
    pub fn du_block_size(&self) -> &'static str {
        match self {
            SizeUnit::K => "1K",
            SizeUnit::M => "1M",
            SizeUnit::G => "1G",
        }
    }

    /// Unit label as shown in report output
    pub fn label(&self) -> &'static str {
        match self {
            SizeUnit::K => "K",
            SizeUnit::M => "M",
            SizeUnit::G => "G",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output format for the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Csv,
    Html,
    Json,
}

impl ReportFormat {
    /// Parse a format name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "csv" => Some(ReportFormat::Csv),
            "html" => Some(ReportFormat::Html),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    /// Get display name for the format
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

/// Sort key for report entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic order on path
    Name,
    /// Smallest entries first
    SizeAsc,
    /// Largest entries first
    SizeDesc,
    /// Most recently modified first
    Mtime,
}

impl SortKey {
    /// Parse a sort key name; accepts both `size_asc` and `size-asc` spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "name" => Some(SortKey::Name),
            "size_asc" => Some(SortKey::SizeAsc),
            "size_desc" => Some(SortKey::SizeDesc),
            "mtime" => Some(SortKey::Mtime),
            _ => None,
        }
    }

    /// Get display name for the sort key
    pub fn display_name(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::SizeAsc => "size_asc",
            SortKey::SizeDesc => "size_desc",
            SortKey::Mtime => "mtime",
        }
    }
}
