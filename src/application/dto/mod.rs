/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod scan_request;
mod scan_response;

pub use scan_request::{ResolutionMode, ScanRequest};
pub use scan_response::{ScanResponse, ScanSummary, HIGH_EPSS_THRESHOLD};
