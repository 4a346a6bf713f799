use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Edge categories in the host graph. `Navigation` is reserved for
/// downstream consumers that filter by kind; the crawler itself only
/// ever writes `Resource` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Navigation,
    Resource,
}

impl EdgeKind {
    pub fn as_i64(&self) -> i64 {
        match self {
            EdgeKind::Navigation => 1,
            EdgeKind::Resource => 2,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(EdgeKind::Navigation),
            2 => Some(EdgeKind::Resource),
            _ => None,
        }
    }
}

/// A directed, typed, timestamped "source page embeds a resource hosted at
/// target" relation. Duplicates across crawl passes are expected; there is
/// no uniqueness constraint.
#[derive(Debug, Clone)]
pub struct HostEdge {
    pub source_id: i64,
    pub target_id: i64,
    pub kind: EdgeKind,
    pub timestamp: i64,
}

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Persistent host graph backed by SQLite. Hosts get one stable id each;
/// edges are append-only. Writes are buffered in memory and made durable
/// by [`HostGraph::commit`].
pub struct HostGraph {
    conn: Connection,
    pending: Vec<HostEdge>,
}

impl HostGraph {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let graph = HostGraph {
            conn,
            pending: Vec::new(),
        };
        graph.init_schema()?;
        Ok(graph)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS hosts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                hostname TEXT UNIQUE NOT NULL
            );

            CREATE TABLE IF NOT EXISTS edges (
                source_id INTEGER NOT NULL,
                target_id INTEGER NOT NULL,
                kind INTEGER NOT NULL,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY(source_id) REFERENCES hosts(id),
                FOREIGN KEY(target_id) REFERENCES hosts(id)
            );

            CREATE INDEX IF NOT EXISTS idx_hosts_hostname ON hosts(hostname);
            CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source_id);
            CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_id);
            ",
        )?;
        Ok(())
    }

    /// Idempotent hostname registration: returns the existing id if the
    /// hostname is already known, otherwise assigns a new one.
    pub fn get_or_create_host(&self, hostname: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO hosts (hostname) VALUES (?1)",
            params![hostname],
        )?;

        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM hosts WHERE hostname = ?1")?;
        stmt.query_row(params![hostname], |row| row.get(0))
    }

    pub fn host_id(&self, hostname: &str) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id FROM hosts WHERE hostname = ?1")?;
        stmt.query_row(params![hostname], |row| row.get(0)).optional()
    }

    /// Buffer a batch of edges. Nothing hits the database until the next
    /// [`HostGraph::commit`].
    pub fn append_edges(&mut self, edges: Vec<HostEdge>) {
        self.pending.extend(edges);
    }

    pub fn pending_edges(&self) -> usize {
        self.pending.len()
    }

    /// Flush all buffered edges inside one transaction. Returns how many
    /// rows were written.
    pub fn commit(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO edges (source_id, target_id, kind, timestamp) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for edge in &self.pending {
                stmt.execute(params![
                    edge.source_id,
                    edge.target_id,
                    edge.kind.as_i64(),
                    edge.timestamp,
                ])?;
            }
        }
        tx.commit()?;

        let written = self.pending.len();
        self.pending.clear();
        Ok(written)
    }

    pub fn host_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM hosts", [], |row| row.get(0))
    }

    pub fn edge_count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
    }

    /// Committed edges originating from the given hostname, for inspection
    /// and tests.
    pub fn edges_from(&self, hostname: &str) -> Result<Vec<HostEdge>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.source_id, e.target_id, e.kind, e.timestamp
             FROM edges e
             JOIN hosts h ON e.source_id = h.id
             WHERE h.hostname = ?1
             ORDER BY e.rowid",
        )?;

        let edges = stmt
            .query_map(params![hostname], |row| {
                Ok(HostEdge {
                    source_id: row.get(0)?,
                    target_id: row.get(1)?,
                    kind: EdgeKind::from_i64(row.get(2)?).unwrap_or(EdgeKind::Resource),
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(edges)
    }

    /// Most-referenced target hosts with their inbound resource edge counts.
    pub fn top_targets(&self, limit: usize) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT h.hostname, COUNT(*) AS refs
             FROM edges e
             JOIN hosts h ON e.target_id = h.id
             WHERE e.kind = ?1
             GROUP BY h.hostname
             ORDER BY refs DESC, h.hostname
             LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![EdgeKind::Resource.as_i64(), limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(rows)
    }
}
