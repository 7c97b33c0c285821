//! vulngate - vulnerability resolution pipeline
//!
//! Resolves an inventory of software components to known vulnerabilities,
//! enriches findings from other scanners, applies an ignore/VEX policy and
//! decides a CI exit code. An offline SQLite cache can stand in for the
//! remote intelligence source.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`resolution`): Findings, bulletins, policies and pure services
//! - **Application Layer** (`application`): Use cases and application services
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use vulngate::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<()> {
//! let client = VulnersClient::new("my-api-key", env!("CARGO_PKG_VERSION"))?;
//! let use_case = ScanComponentsUseCase::<_, NopBulletinStore, _>::new(
//!     Some(client),
//!     None,
//!     StderrProgressReporter::new(),
//!     Policy::new(Some(Severity::High), Vec::new()),
//! );
//!
//! let components = vec![Component::new("library", "log4j-core", "2.14.1")];
//! let request = ScanRequest::new(components, ResolutionMode::Online);
//! let response = use_case.scan(request, &CancellationToken::new()).await?;
//! println!("{}", serde_json::to_string_pretty(&response.findings)?);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod logging;
pub mod ports;
pub mod resolution;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::FileSystemReader;
    pub use crate::adapters::outbound::network::VulnersClient;
    pub use crate::adapters::outbound::storage::{NopBulletinStore, SqliteBulletinStore};
    pub use crate::application::dto::{ResolutionMode, ScanRequest, ScanResponse, ScanSummary};
    pub use crate::application::factories::StoreFactory;
    pub use crate::application::use_cases::{
        EnrichFindingsUseCase, MatchComponentsUseCase, ResolveOfflineUseCase,
        ScanComponentsUseCase, SyncCollectionsUseCase, SyncOutcome,
    };
    pub use crate::ports::inbound::VulnerabilityResolutionPort;
    pub use crate::ports::outbound::{
        BulletinStore, IntelligenceClient, ProgressReporter, SearchResult,
    };
    pub use crate::resolution::domain::{
        Bulletin, CollectionMeta, CollectionName, Component, Finding, Severity,
    };
    pub use crate::resolution::policies::{Policy, SuppressionMap, SuppressionStatus};
    pub use crate::resolution::services::{LuceneQueryBuilder, QueryBuilder};
    pub use crate::shared::error::{ExitCode, ResolveError};
    pub use crate::shared::{ResolveResult, Result};
}
