pub mod batch_loader;
pub mod import_runner;
pub mod ports;
