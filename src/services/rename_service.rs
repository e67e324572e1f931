//! Dataset renaming.
//!
//! Normalizes a folder of labeled images into `<category>.<index>.jpg` names.
//! Plain files are copied as-is and seed the per-category index; files carrying
//! the reserved prefix are then renumbered to continue each sequence.

use crate::error::AppError;
use crate::models::fs_types::{EntryKind, FileEntry};
use crate::models::rename_types::{CopyFailure, RenameOutcome, RenameSummary};
use crate::services::fs_service;
use std::num::IntErrorKind;
use std::path::Path;
use tracing::{debug, error, info, warn};

pub const CATEGORIES: [&str; 4] = ["cocci", "healthy", "ncd", "salmo"];

/// Checked in order; the first matching prefix decides the category.
const PREFIXED_CATEGORIES: [(&str, usize); 4] = [
    ("pcrcocci", 0),
    ("pcrhealthy", 1),
    ("pcrncd", 2),
    ("pcrsalmo", 3),
];

/// Last index used per category, aligned with `CATEGORIES`. Starts at -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounters {
    last: [i128; 4],
}

impl Default for CategoryCounters {
    fn default() -> Self {
        Self { last: [-1; 4] }
    }
}

impl CategoryCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<i128> {
        CATEGORIES
            .iter()
            .position(|c| *c == category)
            .map(|idx| self.last[idx])
    }

    /// Raise the counter from a plain `<category>.<number>.<ext>` name.
    /// Returns false when the name is not of that shape.
    pub fn seed(&mut self, file_name: &str) -> bool {
        for (idx, category) in CATEGORIES.iter().enumerate() {
            let Some(rest) = file_name.strip_prefix(category) else {
                continue;
            };
            if !rest.starts_with('.') {
                continue;
            }

            let Some(segment) = file_name.split('.').nth(1) else {
                return false;
            };

            return match segment.parse::<i128>() {
                Ok(n) => {
                    self.last[idx] = self.last[idx].max(n);
                    true
                }
                Err(e) => {
                    if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) {
                        warn!("Ignoring out-of-range index in {}", file_name);
                    }
                    false
                }
            };
        }
        false
    }

    /// Claim the next index for a prefixed file name. `Ok(None)` when no
    /// category prefix matches.
    pub fn next_for(
        &mut self,
        file_name: &str,
    ) -> Result<Option<(&'static str, i128)>, AppError> {
        let Some((_, idx)) = PREFIXED_CATEGORIES
            .iter()
            .find(|(prefix, _)| file_name.starts_with(prefix))
        else {
            return Ok(None);
        };

        let category = CATEGORIES[*idx];
        let next = self.last[*idx].checked_add(1).ok_or_else(|| {
            AppError::new(format!("No index left for category {}", category))
        })?;
        self.last[*idx] = next;
        Ok(Some((category, next)))
    }
}

pub fn renamed_file_name(category: &str, index: i128) -> String {
    format!("{}.{}.jpg", category, index)
}

pub fn rename_dataset(source: &Path, target: &Path) -> Result<RenameOutcome, AppError> {
    if !source.is_dir() {
        warn!("Source folder '{}' not found", source.display());
        return Ok(RenameOutcome::SourceMissing);
    }

    if !target.exists() {
        std::fs::create_dir_all(target).map_err(|e| {
            AppError::new(format!("Failed to create target folder {}: {}", target.display(), e))
        })?;
        info!("Created target folder '{}'", target.display());
    }

    let files = fs_service::list_files(source)?;
    let mut counters = CategoryCounters::new();
    let mut summary = RenameSummary::default();

    copy_plain_files(&files, target, &mut counters, &mut summary);
    debug!("Counters after seeding: {:?}", counters);
    copy_prefixed_files(&files, target, &mut counters, &mut summary);

    summary.target_file_count = fs_service::count_files(target)?;
    Ok(RenameOutcome::Completed(summary))
}

fn copy_plain_files(
    files: &[FileEntry],
    target: &Path,
    counters: &mut CategoryCounters,
    summary: &mut RenameSummary,
) {
    for file in files.iter().filter(|f| f.kind == EntryKind::Plain) {
        // Join with the raw name so non-UTF-8 bytes survive the copy.
        match std::fs::copy(&file.path, target.join(&file.file_name)) {
            Ok(_) => {
                summary.copied += 1;
                info!("Copied: {}", file.name);
            }
            Err(e) => record_failure(summary, &file.name, e.to_string()),
        }

        // Seed even when the copy failed: the index is taken in the source set.
        counters.seed(&file.name);
    }
}

fn copy_prefixed_files(
    files: &[FileEntry],
    target: &Path,
    counters: &mut CategoryCounters,
    summary: &mut RenameSummary,
) {
    for file in files.iter().filter(|f| f.kind == EntryKind::Prefixed) {
        let (category, index) = match counters.next_for(&file.name) {
            Ok(Some(claim)) => claim,
            Ok(None) => {
                warn!("Skipping {}: no known category after prefix", file.name);
                summary.skipped.push(file.name.clone());
                continue;
            }
            Err(e) => {
                record_failure(summary, &file.name, e.message);
                continue;
            }
        };

        let new_name = renamed_file_name(category, index);
        match std::fs::copy(&file.path, target.join(&new_name)) {
            Ok(_) => {
                summary.renamed += 1;
                info!("Renamed and copied: {} -> {}", file.name, new_name);
            }
            Err(e) => record_failure(summary, &file.name, e.to_string()),
        }
    }
}

fn record_failure(summary: &mut RenameSummary, file_name: &str, error: String) {
    error!("Error processing {}: {}", file_name, error);
    summary.failures.push(CopyFailure {
        file_name: file_name.to_string(),
        error,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }

    fn completed(outcome: RenameOutcome) -> RenameSummary {
        match outcome {
            RenameOutcome::Completed(summary) => summary,
            RenameOutcome::SourceMissing => panic!("expected a completed run"),
        }
    }

    #[test]
    fn test_counters_start_at_minus_one() {
        let counters = CategoryCounters::new();
        for category in CATEGORIES {
            assert_eq!(counters.get(category), Some(-1));
        }
        assert_eq!(counters.get("duck"), None);
    }

    #[test]
    fn test_seed_takes_maximum() {
        let mut counters = CategoryCounters::new();
        assert!(counters.seed("healthy.2.jpg"));
        assert!(counters.seed("healthy.0.jpg"));
        assert_eq!(counters.get("healthy"), Some(2));
        assert_eq!(counters.get("cocci"), Some(-1));
    }

    #[test]
    fn test_seed_ignores_malformed_suffix() {
        let mut counters = CategoryCounters::new();
        assert!(!counters.seed("cocci.abc.jpg"));
        assert!(!counters.seed("coccidiosis_1.jpg"));
        assert!(!counters.seed("readme.txt"));
        assert_eq!(counters, CategoryCounters::new());
    }

    #[test]
    fn test_next_for_increments_before_use() {
        let mut counters = CategoryCounters::new();
        counters.seed("ncd.4.jpg");
        assert_eq!(counters.next_for("pcrncd_a.png").unwrap(), Some(("ncd", 5)));
        assert_eq!(counters.next_for("pcrncd_b.png").unwrap(), Some(("ncd", 6)));
        assert_eq!(counters.next_for("pcrsalmo.jpg").unwrap(), Some(("salmo", 0)));
        assert_eq!(counters.next_for("pcrduck.jpg").unwrap(), None);
    }

    #[test]
    fn test_seeded_counter_continues_sequence() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "healthy.0.jpg");
        touch(source.path(), "healthy.2.jpg");
        touch(source.path(), "pcrhealthy_x.png");

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.copied, 2);
        assert_eq!(summary.renamed, 1);
        assert_eq!(
            fs::read(target.path().join("healthy.3.jpg")).unwrap(),
            b"pcrhealthy_x.png"
        );
        assert!(!target.path().join("pcrhealthy_x.png").exists());
    }

    #[test]
    fn test_prefixed_files_get_consecutive_indices_in_sorted_order() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "pcrsalmo_b.jpg");
        touch(source.path(), "pcrsalmo_a.jpg");

        completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(fs::read(target.path().join("salmo.0.jpg")).unwrap(), b"pcrsalmo_a.jpg");
        assert_eq!(fs::read(target.path().join("salmo.1.jpg")).unwrap(), b"pcrsalmo_b.jpg");
    }

    #[test]
    fn test_missing_source_leaves_target_untouched() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("all_new");

        let outcome = rename_dataset(&root.path().join("all"), &target).unwrap();

        assert_eq!(outcome, RenameOutcome::SourceMissing);
        assert!(!target.exists());
    }

    #[test]
    fn test_creates_target_folder() {
        let source = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let target = root.path().join("nested").join("all_new");
        touch(source.path(), "cocci.0.jpg");

        let summary = completed(rename_dataset(source.path(), &target).unwrap());
        assert_eq!(summary.target_file_count, 1);
        assert!(target.join("cocci.0.jpg").exists());
    }

    #[test]
    fn test_end_to_end_one_file_per_category() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        for category in CATEGORIES {
            touch(source.path(), &format!("{}.0.jpg", category));
            touch(source.path(), &format!("pcr{}_sample.png", category));
        }

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.target_file_count, 8);
        assert_eq!(summary.copied, 4);
        assert_eq!(summary.renamed, 4);
        assert!(summary.failures.is_empty());
        for category in CATEGORIES {
            assert!(target.path().join(format!("{}.0.jpg", category)).exists());
            assert!(target.path().join(format!("{}.1.jpg", category)).exists());
        }
    }

    #[test]
    fn test_unknown_prefixed_category_is_skipped() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "pcrduck_1.jpg");

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.skipped, vec!["pcrduck_1.jpg".to_string()]);
        assert_eq!(summary.target_file_count, 0);
    }

    #[test]
    fn test_seed_accepts_indices_past_i64() {
        let mut counters = CategoryCounters::new();
        assert!(counters.seed("healthy.9223372036854775807.jpg"));
        assert_eq!(
            counters.next_for("pcrhealthy_x.png").unwrap(),
            Some(("healthy", 9_223_372_036_854_775_808))
        );
    }

    #[test]
    fn test_seed_ignores_out_of_range_index() {
        let mut counters = CategoryCounters::new();
        assert!(!counters.seed("healthy.999999999999999999999999999999999999999999.jpg"));
        assert_eq!(counters.get("healthy"), Some(-1));
    }

    #[test]
    fn test_exhausted_counter_is_an_error() {
        let mut counters = CategoryCounters::new();
        assert!(counters.seed(&format!("salmo.{}.jpg", i128::MAX)));
        assert!(counters.next_for("pcrsalmo_a.jpg").is_err());
        assert_eq!(counters.get("salmo"), Some(i128::MAX));
    }

    #[test]
    fn test_large_plain_index_continues_sequence() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "healthy.9223372036854775807.jpg");
        touch(source.path(), "pcrhealthy_x.png");

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.renamed, 1);
        assert!(target
            .path()
            .join("healthy.9223372036854775808.jpg")
            .exists());
    }

    #[test]
    fn test_exhausted_category_records_failure_and_continues() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), &format!("cocci.{}.jpg", i128::MAX));
        touch(source.path(), "pcrcocci_a.jpg");
        touch(source.path(), "pcrncd_a.jpg");

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].file_name, "pcrcocci_a.jpg");
        assert_eq!(summary.renamed, 1);
        assert!(target.path().join("ncd.0.jpg").exists());
    }

    #[test]
    fn test_copy_failures_do_not_abort_run() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        touch(source.path(), "cocci.0.jpg");
        touch(source.path(), "healthy.2.jpg");
        touch(source.path(), "pcrcocci_a.jpg");
        touch(source.path(), "pcrhealthy_a.jpg");
        touch(source.path(), "pcrhealthy_b.jpg");
        // A directory at the destination path makes the copy fail.
        fs::create_dir(target.path().join("cocci.0.jpg")).unwrap();
        fs::create_dir(target.path().join("healthy.3.jpg")).unwrap();

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        let failed: Vec<&str> = summary
            .failures
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(failed, vec!["cocci.0.jpg", "pcrhealthy_a.jpg"]);
        assert_eq!(summary.copied, 1);
        assert_eq!(summary.renamed, 2);

        // cocci.0.jpg failed to copy but still seeded its category.
        assert_eq!(
            fs::read(target.path().join("cocci.1.jpg")).unwrap(),
            b"pcrcocci_a.jpg"
        );
        assert_eq!(
            fs::read(target.path().join("healthy.4.jpg")).unwrap(),
            b"pcrhealthy_b.jpg"
        );
        assert_eq!(summary.target_file_count, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_copied_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let first = OsStr::from_bytes(b"img_\xff.jpg");
        let second = OsStr::from_bytes(b"img_\xfe.jpg");
        fs::write(source.path().join(first), b"one").unwrap();
        fs::write(source.path().join(second), b"two").unwrap();

        let summary = completed(rename_dataset(source.path(), target.path()).unwrap());

        assert_eq!(summary.copied, 2);
        assert_eq!(summary.target_file_count, 2);
        assert_eq!(fs::read(target.path().join(first)).unwrap(), b"one");
        assert_eq!(fs::read(target.path().join(second)).unwrap(), b"two");
    }
}
