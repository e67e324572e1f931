use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Already follows `<category>.<index>.<ext>` or is unrelated; copied verbatim.
    Plain,
    /// Starts with the reserved prefix and needs a new index before copying.
    Prefixed,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Name as stored on disk, used to build destination paths.
    pub file_name: OsString,
    /// Lossy UTF-8 form for matching and logging.
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}
