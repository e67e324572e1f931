pub mod classifier;
pub mod fs_service;
pub mod rename_service;
