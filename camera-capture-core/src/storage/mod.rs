pub mod asset_saver;
pub mod file_library;
pub mod metadata;
