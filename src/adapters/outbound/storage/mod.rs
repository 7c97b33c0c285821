/// Storage adapters for the offline bulletin cache
mod nop_store;
mod sqlite_store;

pub use nop_store::NopBulletinStore;
pub use sqlite_store::SqliteBulletinStore;
