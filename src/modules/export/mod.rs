pub mod application;

pub use application::backup::BackupService;
pub use application::service::ExportService;
