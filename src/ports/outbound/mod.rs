/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (intelligence source, cache, console).
pub mod bulletin_store;
pub mod intelligence_client;
pub mod progress_reporter;

pub use bulletin_store::{BulletinStore, PutSummary};
pub use intelligence_client::{IntelligenceClient, SearchResult};
pub use progress_reporter::{ProgressCallback, ProgressReporter};
