pub mod capture_coordinator;
