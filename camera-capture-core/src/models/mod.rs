pub mod asset;
pub mod capture;
pub mod config;
pub mod device;
pub mod error;
pub mod preset;
pub mod settings;
pub mod state;
