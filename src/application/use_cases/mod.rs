/// Use cases module containing application business logic orchestration
mod enrich_findings;
mod match_components;
mod resolve_offline;
mod scan_components;
mod sync_collections;

pub use enrich_findings::EnrichFindingsUseCase;
pub use match_components::{MatchComponentsUseCase, SEARCH_LIMIT};
pub use resolve_offline::{ResolveOfflineUseCase, OFFLINE_SEARCH_LIMIT};
pub use scan_components::ScanComponentsUseCase;
pub use sync_collections::{SyncCollectionsUseCase, SyncOutcome};
