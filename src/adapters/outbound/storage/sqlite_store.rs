use crate::ports::outbound::{BulletinStore, PutSummary, SearchResult};
use crate::resolution::domain::{Bulletin, CollectionMeta, CollectionName};
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS bulletins (
        id         TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        data       TEXT NOT NULL,
        title      TEXT NOT NULL DEFAULT '',
        synced_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_bulletins_collection ON bulletins(collection);
    CREATE INDEX IF NOT EXISTS idx_bulletins_title ON bulletins(title);

    CREATE TABLE IF NOT EXISTS collection_meta (
        collection TEXT PRIMARY KEY,
        count      INTEGER NOT NULL DEFAULT 0,
        synced_at  TEXT NOT NULL
    );
"#;

/// SqliteBulletinStore - offline bulletin cache backed by a SQLite file
///
/// One connection guarded by a mutex serializes every reader and writer.
/// The slot becomes `None` after `close`, which turns later calls into
/// `ResolveError::Unavailable`.
pub struct SqliteBulletinStore {
    conn: Mutex<Option<Connection>>,
    path: PathBuf,
}

impl SqliteBulletinStore {
    /// Opens or creates the cache database at `path`
    ///
    /// Creates the parent directory when missing, enables WAL journaling
    /// and a busy timeout, applies the schema, and restricts the file to
    /// its owner on Unix.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened, or the schema cannot be applied.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                info!(directory = %parent.display(), "Creating cache directory");
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create cache directory: {}", parent.display())
                })?;
            }
        }

        debug!(path = %path.display(), "Opening SQLite cache");
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open cache database: {}", path.display()))?;
        let journal_mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .context("Failed to enable WAL journal mode")?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize cache schema")?;

        restrict_permissions(path);

        debug!(path = %path.display(), journal_mode = %journal_mode, "Cache database ready");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> ResolveResult<T>,
    ) -> ResolveResult<T> {
        let mut guard = self.conn.lock().map_err(|_| ResolveError::Unavailable)?;
        let conn = guard.as_mut().ok_or(ResolveError::Unavailable)?;
        f(conn)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "Could not set cache file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_synced_at(collection: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(_) => {
            warn!(collection = %collection, raw = %raw, "Corrupt synced_at timestamp");
            None
        }
    }
}

/// Escapes LIKE metacharacters so the query matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn decode(data: &str) -> Result<Bulletin, serde_json::Error> {
    serde_json::from_str(data)
}

impl BulletinStore for SqliteBulletinStore {
    fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
        self.with_conn(|conn| {
            let data: Option<String> = conn
                .query_row("SELECT data FROM bulletins WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(|e| ResolveError::storage(format!("querying bulletin {}", id), e))?;
            let data = data.ok_or_else(|| ResolveError::NotFound { id: id.to_string() })?;
            decode(&data).map_err(|e| {
                ResolveError::upstream(format!("decoding cached bulletin {}", id), e)
            })
        })
    }

    fn put_bulletins(
        &self,
        collection: &CollectionName,
        bulletins: &[Bulletin],
        cancel: &CancellationToken,
    ) -> ResolveResult<PutSummary> {
        self.with_conn(|conn| {
            let tx = conn
                .transaction()
                .map_err(|e| ResolveError::storage("beginning transaction", e))?;
            let now = now_rfc3339();
            let mut summary = PutSummary::default();
            // Collections that lose rows when an id moves into this one.
            let mut vacated: BTreeSet<String> = BTreeSet::new();

            {
                let mut previous = tx
                    .prepare("SELECT collection FROM bulletins WHERE id = ?1")
                    .map_err(|e| ResolveError::storage("preparing previous collection lookup", e))?;
                let mut stmt = tx
                    .prepare(
                        "INSERT OR REPLACE INTO bulletins (id, collection, data, title, synced_at) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )
                    .map_err(|e| ResolveError::storage("preparing insert", e))?;

                for bulletin in bulletins {
                    // Dropping the transaction on return rolls it back.
                    if cancel.is_cancelled() {
                        return Err(ResolveError::Canceled);
                    }
                    if let Err(reason) = bulletin.validate() {
                        warn!(id = %bulletin.id, reason = %reason, "Skipping malformed bulletin");
                        summary.skipped += 1;
                        continue;
                    }
                    let data = match serde_json::to_string(bulletin) {
                        Ok(data) => data,
                        Err(e) => {
                            warn!(id = %bulletin.id, error = %e, "Skipping bulletin, serialization failed");
                            summary.skipped += 1;
                            continue;
                        }
                    };
                    let owner: Option<String> = previous
                        .query_row([&bulletin.id], |row| row.get(0))
                        .optional()
                        .map_err(|e| {
                            ResolveError::storage(
                                format!("looking up previous collection of {}", bulletin.id),
                                e,
                            )
                        })?;
                    if let Some(owner) = owner.filter(|owner| owner != collection.as_str()) {
                        vacated.insert(owner);
                    }
                    stmt.execute(params![
                        bulletin.id,
                        collection.as_str(),
                        data,
                        bulletin.title,
                        now
                    ])
                    .map_err(|e| {
                        ResolveError::storage(format!("inserting bulletin {}", bulletin.id), e)
                    })?;
                    summary.stored += 1;
                }
            }

            if cancel.is_cancelled() {
                return Err(ResolveError::Canceled);
            }

            let count: i64 = tx
                .query_row(
                    "SELECT COUNT(*) FROM bulletins WHERE collection = ?1",
                    [collection.as_str()],
                    |row| row.get(0),
                )
                .map_err(|e| ResolveError::storage("counting bulletins", e))?;
            tx.execute(
                "INSERT INTO collection_meta (collection, count, synced_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(collection) DO UPDATE SET \
                     count = excluded.count, \
                     synced_at = excluded.synced_at",
                params![collection.as_str(), count, now],
            )
            .map_err(|e| ResolveError::storage("updating collection meta", e))?;

            for owner in &vacated {
                let remaining: i64 = tx
                    .query_row(
                        "SELECT COUNT(*) FROM bulletins WHERE collection = ?1",
                        [owner],
                        |row| row.get(0),
                    )
                    .map_err(|e| ResolveError::storage("counting bulletins", e))?;
                if remaining == 0 {
                    tx.execute("DELETE FROM collection_meta WHERE collection = ?1", [owner])
                        .map_err(|e| ResolveError::storage("removing collection meta", e))?;
                } else {
                    tx.execute(
                        "UPDATE collection_meta SET count = ?2 WHERE collection = ?1",
                        params![owner, remaining],
                    )
                    .map_err(|e| ResolveError::storage("updating collection meta", e))?;
                }
                debug!(collection = %owner, total = remaining, "Collection lost moved bulletins");
            }

            tx.commit()
                .map_err(|e| ResolveError::storage("committing bulletins", e))?;

            debug!(
                collection = %collection,
                stored = summary.stored,
                skipped = summary.skipped,
                total = count,
                "Bulletins stored"
            );
            Ok(summary)
        })
    }

    fn search_bulletins(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> ResolveResult<SearchResult> {
        let pattern = like_pattern(query);
        self.with_conn(|conn| {
            let total: i64 = conn
                .query_row(
                    r"SELECT COUNT(*) FROM bulletins WHERE id LIKE ?1 ESCAPE '\' OR title LIKE ?1 ESCAPE '\'",
                    [&pattern],
                    |row| row.get(0),
                )
                .map_err(|e| ResolveError::storage("counting search results", e))?;

            let mut stmt = conn
                .prepare(
                    r"SELECT data FROM bulletins WHERE id LIKE ?1 ESCAPE '\' OR title LIKE ?1 ESCAPE '\' ORDER BY id LIMIT ?2 OFFSET ?3",
                )
                .map_err(|e| ResolveError::storage("preparing search", e))?;
            let rows = stmt
                .query_map(params![pattern, limit as i64, offset as i64], |row| {
                    row.get::<_, String>(0)
                })
                .map_err(|e| ResolveError::storage("searching bulletins", e))?;

            let mut bulletins = Vec::new();
            for row in rows {
                let data = row.map_err(|e| ResolveError::storage("reading search result", e))?;
                match decode(&data) {
                    Ok(bulletin) => bulletins.push(bulletin),
                    Err(e) => warn!(error = %e, "Skipping corrupted cached bulletin"),
                }
            }

            Ok(SearchResult {
                total: total.max(0) as u64,
                bulletins,
            })
        })
    }

    fn collection_meta(&self) -> ResolveResult<Vec<CollectionMeta>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT collection, count, synced_at FROM collection_meta ORDER BY collection",
                )
                .map_err(|e| ResolveError::storage("preparing collection meta query", e))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })
                .map_err(|e| ResolveError::storage("querying collection meta", e))?;

            let mut metas = Vec::new();
            for row in rows {
                let (collection, count, synced_at) =
                    row.map_err(|e| ResolveError::storage("reading collection meta", e))?;
                let synced_at = parse_synced_at(&collection, &synced_at);
                metas.push(CollectionMeta {
                    collection,
                    count: count.max(0) as u64,
                    synced_at,
                });
            }
            Ok(metas)
        })
    }

    fn last_sync_time(&self, collection: &CollectionName) -> ResolveResult<Option<DateTime<Utc>>> {
        self.with_conn(|conn| {
            let raw: Option<String> = conn
                .query_row(
                    "SELECT synced_at FROM collection_meta WHERE collection = ?1",
                    [collection.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| {
                    ResolveError::storage(format!("querying last sync time for {}", collection), e)
                })?;
            Ok(raw.and_then(|raw| parse_synced_at(collection.as_str(), &raw)))
        })
    }

    fn purge(&self) -> ResolveResult<()> {
        self.with_conn(|conn| {
            let tx = conn
                .transaction()
                .map_err(|e| ResolveError::storage("beginning purge transaction", e))?;
            tx.execute("DELETE FROM bulletins", [])
                .map_err(|e| ResolveError::storage("purging bulletins", e))?;
            tx.execute("DELETE FROM collection_meta", [])
                .map_err(|e| ResolveError::storage("purging collection meta", e))?;
            tx.commit()
                .map_err(|e| ResolveError::storage("committing purge", e))?;
            info!("Offline cache purged");
            Ok(())
        })
    }

    fn close(&self) -> ResolveResult<()> {
        let mut guard = self.conn.lock().map_err(|_| ResolveError::Unavailable)?;
        match guard.take() {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| ResolveError::storage("closing cache database", e)),
            None => Ok(()),
        }
    }
}
