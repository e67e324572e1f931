pub mod classify_types;
pub mod fs_types;
pub mod rename_types;
