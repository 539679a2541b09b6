pub mod device_provider;
pub mod movie_output;
pub mod observer;
pub mod permission;
pub mod persistence;
pub mod photo_output;
pub mod session_backend;
