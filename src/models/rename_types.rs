#[derive(Debug, Clone, PartialEq)]
pub struct CopyFailure {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenameSummary {
    /// Plain files copied under their original name.
    pub copied: usize,
    /// Prefixed files copied under a renumbered name.
    pub renamed: usize,
    /// Prefixed files matching no known category.
    pub skipped: Vec<String>,
    pub failures: Vec<CopyFailure>,
    /// Regular files present in the target once the run is over.
    pub target_file_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenameOutcome {
    SourceMissing,
    Completed(RenameSummary),
}
