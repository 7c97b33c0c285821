pub mod bulletin;
pub mod collection;
pub mod component;
pub mod finding;
pub mod severity;

pub use bulletin::Bulletin;
pub use collection::{CollectionMeta, CollectionName};
pub use component::Component;
pub use finding::Finding;
pub use severity::Severity;
