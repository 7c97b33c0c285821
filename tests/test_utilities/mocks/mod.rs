/// Mock implementations for testing
mod mock_bulletin_store;
mod mock_intelligence_client;
mod mock_progress_reporter;

pub use mock_bulletin_store::MockBulletinStore;
pub use mock_intelligence_client::MockIntelligenceClient;
pub use mock_progress_reporter::MockProgressReporter;
