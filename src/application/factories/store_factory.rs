use crate::adapters::outbound::storage::{NopBulletinStore, SqliteBulletinStore};
use crate::ports::outbound::BulletinStore;
use std::path::Path;
use tracing::warn;

/// Factory for the offline bulletin cache
///
/// Selects the SQLite adapter, or the degraded no-op adapter when the
/// database cannot be opened, so callers always receive a usable store.
pub struct StoreFactory;

impl StoreFactory {
    /// Opens the cache at `path`
    ///
    /// # Returns
    /// A boxed BulletinStore. On open failure a single warning is logged and
    /// a `NopBulletinStore` is returned: reads then report missing offline
    /// data and writes report the cache as unavailable.
    ///
    /// # Examples
    /// ```no_run
    /// use vulngate::application::factories::StoreFactory;
    ///
    /// let store = StoreFactory::open(std::path::Path::new("/tmp/vulngate/cache.db"));
    /// let collections = store.collection_meta();
    /// ```
    pub fn open(path: &Path) -> Box<dyn BulletinStore> {
        match SqliteBulletinStore::open(path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %format!("{:#}", e),
                    "Offline cache unavailable, continuing without it"
                );
                Box::new(NopBulletinStore::new())
            }
        }
    }
}
