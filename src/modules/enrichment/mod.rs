pub mod application;
pub mod infrastructure;

pub use application::ports::text_generator::TextGenerator;
pub use application::service::EnrichmentService;
pub use infrastructure::completion_client::CompletionClient;
