//! Disk-usage report pipeline: collect, filter, sort, render.
//!
//! Collection delegates to the `du` and `find` adapters behind the
//! [`UsageSource`] / [`FileFinder`] traits; everything after collection is a
//! pure in-memory transformation over the captured entries.

mod entry;
mod options;
mod render;
mod source;

pub use entry::UsageEntry;
pub use options::{ReportFormat, ReportOptions, SizeUnit, SortKey};
pub use render::render;
pub use source::{DiskUsage, FileFinder, Find, UsageSource};

use chrono::{DateTime, Local, NaiveDateTime};
use std::cmp::Ordering;
use thiserror::Error;

/// Pseudo-filesystem mounts that never belong in a usage report,
/// excluded regardless of the scan target
pub const EXCLUDED_DIRS: &[&str] = &["/proc", "/dev", "/sys", "/run"];

/// Error type for report generation
#[derive(Debug, Error)]
pub enum ReportError {
    /// The scan produced nothing to report
    #[error("no usage data collected under {target}")]
    NoData { target: String },

    /// A renderer failed to serialize the report
    #[error("failed to render report: {0}")]
    Render(String),
}

/// Immutable scan configuration, fixed at generator construction
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directories excluded from every scan
    pub excluded_dirs: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReportConfig {
    /// Built-in exclusions plus extra directories from settings
    pub fn with_additional_excludes(extra: &[String]) -> Self {
        let mut config = Self::default();
        for dir in extra {
            if !config.excluded_dirs.contains(dir) {
                config.excluded_dirs.push(dir.clone());
            }
        }
        config
    }
}

/// One retained entry with its share of the report total
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    /// Size in the report's unit scale
    pub size: u64,
    /// Path of the measured file or directory
    pub path: String,
    /// Share of the report total, rounded to two decimals
    pub percentage: f64,
    /// Modification time, when the scan captured one
    pub mtime: Option<NaiveDateTime>,
}

/// A fully assembled report, recomputed per invocation and never persisted
#[derive(Debug, Clone)]
pub struct Report {
    /// Scanned directory
    pub target: String,
    /// Unit every size is scaled to
    pub unit: SizeUnit,
    /// Sort key the entries are ordered by
    pub sort: SortKey,
    /// Depth limit the scan ran with (0 = unlimited)
    pub max_depth: u32,
    /// Threshold the entries were filtered by
    pub size_threshold: u64,
    /// Recency filter, when one was requested
    pub modified_within_days: Option<u32>,
    /// Retained entries in display order
    pub entries: Vec<ReportEntry>,
    /// Sum of the sizes of exactly the retained entries
    pub total_size: u64,
    /// Generation timestamp
    pub generated_at: DateTime<Local>,
    /// Degradation notices accumulated during validation and collection
    pub warnings: Vec<String>,
}

/// Disk-usage report generator
pub struct ReportGenerator {
    usage: Box<dyn UsageSource>,
    finder: Box<dyn FileFinder>,
}

impl ReportGenerator {
    /// Creates a generator backed by the system du and find tools
    pub fn new(config: ReportConfig) -> Self {
        Self {
            usage: Box::new(DiskUsage::new(config.excluded_dirs)),
            finder: Box::new(Find::new()),
        }
    }

    /// Creates a generator with injected collection sources
    pub fn with_sources(usage: Box<dyn UsageSource>, finder: Box<dyn FileFinder>) -> Self {
        Self { usage, finder }
    }

    /// Generate a fully rendered report for the given options
    pub fn generate(&self, opts: &ReportOptions) -> Result<String, ReportError> {
        let (report, format) = self.collect(opts)?;
        render(&report, format).map_err(|e| ReportError::Render(format!("{:#}", e)))
    }

    /// Collect and assemble the structured report plus the validated format.
    ///
    /// Invalid unit/format/sort values degrade to their defaults with a
    /// warning; an empty collection (including a collection that failed
    /// outright) is the one terminal error.
    pub fn collect(&self, opts: &ReportOptions) -> Result<(Report, ReportFormat), ReportError> {
        let mut warnings = Vec::new();

        let unit = SizeUnit::parse(&opts.unit).unwrap_or_else(|| {
            let message = format!("unknown unit {:?}, using M", opts.unit);
            tracing::warn!("{}", message);
            warnings.push(message);
            SizeUnit::M
        });
        let format = ReportFormat::parse(&opts.format).unwrap_or_else(|| {
            let message = format!("unknown format {:?}, using text", opts.format);
            tracing::warn!("{}", message);
            warnings.push(message);
            ReportFormat::Text
        });
        let sort = SortKey::parse(&opts.sort).unwrap_or_else(|| {
            let message = format!("unknown sort key {:?}, sorting by name", opts.sort);
            tracing::warn!("{}", message);
            warnings.push(message);
            SortKey::Name
        });

        let raw = self.collect_entries(opts, unit, &mut warnings);

        let mut entries: Vec<UsageEntry> = raw
            .into_iter()
            .filter(|e| e.size >= opts.size_threshold)
            .collect();
        if entries.is_empty() {
            return Err(ReportError::NoData {
                target: opts.target_dir.clone(),
            });
        }

        let total_size: u64 = entries.iter().map(|e| e.size).sum();
        sort_entries(&mut entries, sort);

        let entries = entries
            .into_iter()
            .map(|e| ReportEntry {
                percentage: percentage_of(e.size, total_size),
                size: e.size,
                path: e.path,
                mtime: e.mtime,
            })
            .collect();

        let report = Report {
            target: opts.target_dir.clone(),
            unit,
            sort,
            max_depth: opts.max_depth,
            size_threshold: opts.size_threshold,
            modified_within_days: opts.modified_within_days,
            entries,
            total_size,
            generated_at: Local::now(),
            warnings,
        };

        Ok((report, format))
    }

    /// Run the collection strategy selected by the recency filter.
    /// An adapter failure degrades to an empty collection with a warning,
    /// which the caller turns into [`ReportError::NoData`].
    fn collect_entries(
        &self,
        opts: &ReportOptions,
        unit: SizeUnit,
        warnings: &mut Vec<String>,
    ) -> Vec<UsageEntry> {
        match opts.modified_within_days {
            None => match self
                .usage
                .subtree_usage(&opts.target_dir, opts.max_depth, unit)
            {
                Ok(entries) => entries,
                Err(e) => {
                    let message = format!("usage scan failed: {:#}", e);
                    tracing::warn!("{}", message);
                    warnings.push(message);
                    Vec::new()
                }
            },
            Some(days) => {
                let files = match self
                    .finder
                    .files_modified_within(&opts.target_dir, opts.max_depth, days)
                {
                    Ok(files) => files,
                    Err(e) => {
                        let message = format!("file search failed: {:#}", e);
                        tracing::warn!("{}", message);
                        warnings.push(message);
                        Vec::new()
                    }
                };

                let mut entries = Vec::with_capacity(files.len());
                for file in files {
                    match self.usage.entry_usage(&file, unit) {
                        Ok(Some(entry)) => entries.push(entry),
                        // Vanished or unreadable between find and du
                        Ok(None) => tracing::debug!("could not measure {}", file),
                        Err(e) => tracing::debug!("could not measure {}: {:#}", file, e),
                    }
                }
                entries
            }
        }
    }
}

/// Stable sort of entries by the requested key
fn sort_entries(entries: &mut [UsageEntry], sort: SortKey) {
    match sort {
        SortKey::Name => entries.sort_by(|a, b| a.path.cmp(&b.path)),
        SortKey::SizeAsc => entries.sort_by_key(|e| e.size),
        SortKey::SizeDesc => entries.sort_by(|a, b| b.size.cmp(&a.size)),
        SortKey::Mtime => entries.sort_by(|a, b| match (&b.mtime, &a.mtime) {
            // Most recently modified first; untimestamped entries last, by path
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => a.path.cmp(&b.path),
        }),
    }
}

/// Share of the total, rounded to two decimals; 0 when the total is 0
fn percentage_of(size: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (size as f64 * 10_000.0 / total as f64).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    /// Usage source serving a fixed entry list
    struct FakeUsage {
        entries: Vec<UsageEntry>,
    }

    impl FakeUsage {
        fn new(entries: Vec<(u64, &str)>) -> Self {
            Self {
                entries: entries
                    .into_iter()
                    .map(|(size, path)| UsageEntry {
                        size,
                        path: path.to_string(),
                        mtime: None,
                    })
                    .collect(),
            }
        }
    }

    impl UsageSource for FakeUsage {
        fn subtree_usage(&self, _: &str, _: u32, _: SizeUnit) -> Result<Vec<UsageEntry>> {
            Ok(self.entries.clone())
        }

        fn entry_usage(&self, path: &str, _: SizeUnit) -> Result<Option<UsageEntry>> {
            Ok(self.entries.iter().find(|e| e.path == path).cloned())
        }
    }

    /// Finder serving a fixed file list
    struct FakeFinder {
        files: Vec<String>,
    }

    impl FileFinder for FakeFinder {
        fn files_modified_within(&self, _: &str, _: u32, _: u32) -> Result<Vec<String>> {
            Ok(self.files.clone())
        }
    }

    struct FailingUsage;

    impl UsageSource for FailingUsage {
        fn subtree_usage(&self, _: &str, _: u32, _: SizeUnit) -> Result<Vec<UsageEntry>> {
            anyhow::bail!("du exploded")
        }

        fn entry_usage(&self, _: &str, _: SizeUnit) -> Result<Option<UsageEntry>> {
            anyhow::bail!("du exploded")
        }
    }

    fn generator(entries: Vec<(u64, &str)>) -> ReportGenerator {
        ReportGenerator::with_sources(
            Box::new(FakeUsage::new(entries)),
            Box::new(FakeFinder { files: Vec::new() }),
        )
    }

    #[test]
    fn test_total_is_sum_of_retained_entries() {
        let gen = generator(vec![(10, "a"), (30, "b"), (5, "c")]);
        let (report, _) = gen.collect(&ReportOptions::default()).unwrap();
        assert_eq!(report.total_size, 45);
        assert_eq!(
            report.entries.iter().map(|e| e.size).sum::<u64>(),
            report.total_size
        );
    }

    #[test]
    fn test_percentages_bounded_and_computed() {
        let gen = generator(vec![(10, "a"), (30, "b")]);
        let (report, _) = gen.collect(&ReportOptions::default()).unwrap();
        assert_eq!(report.total_size, 40);
        assert_eq!(report.entries[0].percentage, 25.0);
        assert_eq!(report.entries[1].percentage, 75.0);
        for entry in &report.entries {
            assert!(entry.percentage >= 0.0 && entry.percentage <= 100.0);
        }
    }

    #[test]
    fn test_zero_total_gives_zero_percentages() {
        // Entries of size 0 pass a zero threshold but sum to nothing
        let gen = generator(vec![(0, "a"), (0, "b")]);
        let (report, _) = gen.collect(&ReportOptions::default()).unwrap();
        assert_eq!(report.total_size, 0);
        for entry in &report.entries {
            assert_eq!(entry.percentage, 0.0);
        }
    }

    #[test]
    fn test_threshold_filters_and_shrinks_total() {
        let gen = generator(vec![(10, "a"), (30, "b"), (5, "c")]);

        let low = ReportOptions {
            size_threshold: 6,
            ..Default::default()
        };
        let (report, _) = gen.collect(&low).unwrap();
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.total_size, 40);

        // Raising the threshold never increases count or total
        let high = ReportOptions {
            size_threshold: 20,
            ..Default::default()
        };
        let (report_high, _) = gen.collect(&high).unwrap();
        assert!(report_high.entries.len() <= report.entries.len());
        assert!(report_high.total_size <= report.total_size);
        assert_eq!(report_high.total_size, 30);
    }

    #[test]
    fn test_sort_orders() {
        let entries = vec![(30, "b"), (10, "c"), (20, "a")];

        let opts = |sort: &str| ReportOptions {
            sort: sort.to_string(),
            ..Default::default()
        };

        let (by_name, _) = generator(entries.clone()).collect(&opts("name")).unwrap();
        let names: Vec<&str> = by_name.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let (asc, _) = generator(entries.clone()).collect(&opts("size_asc")).unwrap();
        let sizes: Vec<u64> = asc.entries.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![10, 20, 30]);

        let (desc, _) = generator(entries).collect(&opts("size_desc")).unwrap();
        let sizes: Vec<u64> = desc.entries.iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![30, 20, 10]);
    }

    #[test]
    fn test_size_sort_is_stable() {
        let gen = generator(vec![(10, "z"), (10, "a"), (10, "m")]);
        let opts = ReportOptions {
            sort: "size_asc".to_string(),
            ..Default::default()
        };
        let (report, _) = gen.collect(&opts).unwrap();
        // Equal sizes keep collection order
        let names: Vec<&str> = report.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_mtime_sort_most_recent_first() {
        let mtime = |d: u32| {
            chrono::NaiveDate::from_ymd_opt(2026, 8, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        };
        let entries = vec![
            UsageEntry {
                size: 1,
                path: "old".to_string(),
                mtime: mtime(1),
            },
            UsageEntry {
                size: 2,
                path: "untimed".to_string(),
                mtime: None,
            },
            UsageEntry {
                size: 3,
                path: "new".to_string(),
                mtime: mtime(7),
            },
        ];
        let gen = ReportGenerator::with_sources(
            Box::new(FakeUsage { entries }),
            Box::new(FakeFinder { files: Vec::new() }),
        );
        let opts = ReportOptions {
            sort: "mtime".to_string(),
            ..Default::default()
        };
        let (report, _) = gen.collect(&opts).unwrap();
        let names: Vec<&str> = report.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "untimed"]);
    }

    #[test]
    fn test_unknown_format_degrades_to_text_with_warning() {
        let gen = generator(vec![(10, "a")]);
        let opts = ReportOptions {
            format: "xml".to_string(),
            ..Default::default()
        };
        let (report, format) = gen.collect(&opts).unwrap();
        assert_eq!(format, ReportFormat::Text);
        assert!(report.warnings.iter().any(|w| w.contains("xml")));
    }

    #[test]
    fn test_unknown_unit_and_sort_degrade_with_warning() {
        let gen = generator(vec![(10, "a")]);
        let opts = ReportOptions {
            unit: "T".to_string(),
            sort: "inode".to_string(),
            ..Default::default()
        };
        let (report, _) = gen.collect(&opts).unwrap();
        assert_eq!(report.unit, SizeUnit::M);
        assert_eq!(report.sort, SortKey::Name);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_empty_collection_is_no_data() {
        let gen = generator(Vec::new());
        let err = gen.collect(&ReportOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::NoData { .. }));
    }

    #[test]
    fn test_all_filtered_out_is_no_data() {
        let gen = generator(vec![(10, "a"), (30, "b")]);
        let opts = ReportOptions {
            size_threshold: 100,
            ..Default::default()
        };
        let err = gen.collect(&opts).unwrap_err();
        assert!(matches!(err, ReportError::NoData { .. }));
    }

    #[test]
    fn test_collection_failure_collapses_to_no_data() {
        let gen = ReportGenerator::with_sources(
            Box::new(FailingUsage),
            Box::new(FakeFinder { files: Vec::new() }),
        );
        let err = gen.collect(&ReportOptions::default()).unwrap_err();
        assert!(matches!(err, ReportError::NoData { .. }));
    }

    #[test]
    fn test_recency_filter_measures_found_files() {
        let usage = FakeUsage::new(vec![(10, "a"), (30, "b"), (99, "ignored")]);
        let finder = FakeFinder {
            files: vec!["a".to_string(), "b".to_string(), "gone".to_string()],
        };
        let gen = ReportGenerator::with_sources(Box::new(usage), Box::new(finder));
        let opts = ReportOptions {
            modified_within_days: Some(7),
            ..Default::default()
        };
        let (report, _) = gen.collect(&opts).unwrap();
        // Only found files are measured; unmeasurable ones are skipped
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.total_size, 40);
    }

    #[test]
    fn test_idempotent_given_same_collection() {
        let gen = generator(vec![(10, "a"), (30, "b")]);
        let opts = ReportOptions {
            sort: "size_desc".to_string(),
            ..Default::default()
        };
        let (first, _) = gen.collect(&opts).unwrap();
        let (second, _) = gen.collect(&opts).unwrap();
        assert_eq!(first.entries, second.entries);
        assert_eq!(first.total_size, second.total_size);
    }

    #[test]
    fn test_config_excludes() {
        let config = ReportConfig::default();
        assert_eq!(config.excluded_dirs, vec!["/proc", "/dev", "/sys", "/run"]);

        let extra = ReportConfig::with_additional_excludes(&[
            "/mnt/nfs".to_string(),
            "/proc".to_string(),
        ]);
        assert_eq!(
            extra.excluded_dirs,
            vec!["/proc", "/dev", "/sys", "/run", "/mnt/nfs"]
        );
    }
}
