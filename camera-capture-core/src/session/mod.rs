pub mod device_lock;
pub mod store;
