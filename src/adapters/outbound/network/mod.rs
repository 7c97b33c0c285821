/// Network adapters for external API calls
mod vulners_client;

pub use vulners_client::VulnersClient;
