/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (e.g., CLI)
/// use to interact with the application core.
pub mod vulnerability_resolution_port;

pub use vulnerability_resolution_port::VulnerabilityResolutionPort;
