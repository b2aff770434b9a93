pub mod console_confirmation;
pub mod mysql_store;

pub use console_confirmation::ConsoleConfirmation;
pub use mysql_store::MysqlUnitStore;
