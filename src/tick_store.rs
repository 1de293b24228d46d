use std::path::Path;

use anyhow::{Context, Result};
use chrono::TimeZone;
use rusqlite::{params, Connection};

use crate::model::market::MarketInfo;
use crate::model::record::TickRecord;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tick_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    market_id TEXT NOT NULL,
    event_id TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    timestamp_ms INTEGER NOT NULL,
    price REAL NOT NULL,
    last_price REAL NOT NULL,
    yes_bid REAL,
    yes_ask REAL,
    no_bid REAL,
    no_ask REAL,
    total_average REAL,
    margin_of_error REAL,
    std_dev REAL,
    sma REAL,
    anchor REAL,
    rsi REAL,
    bollinger_upper REAL,
    bollinger_mid REAL,
    bollinger_lower REAL,
    pattern TEXT NOT NULL,
    trade_sent INTEGER NOT NULL,
    crossed TEXT NOT NULL,
    trade_side TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tick_log_market_ts
    ON tick_log(market_id, timestamp_ms);
"#;

/// Row read back from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTick {
    pub market_id: String,
    pub event_id: String,
    pub timestamp: String,
    pub price: f64,
    pub sma: Option<f64>,
    pub total_average: Option<f64>,
    pub rsi: Option<f64>,
    pub pattern: String,
    pub trade_sent: bool,
    pub crossed: String,
    pub trade_side: String,
}

/// Append-only SQLite log of processed ticks.
pub struct TickStore {
    conn: Connection,
}

impl TickStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open tick log {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("failed to initialise tick_log schema")?;
        Ok(Self { conn })
    }

    pub fn append(&self, market: &MarketInfo, record: &TickRecord) -> Result<()> {
        let timestamp = chrono::Utc
            .timestamp_millis_opt(record.timestamp_ms as i64)
            .single()
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();
        let quote = record.quote;
        let bands = record.bollinger;
        self.conn.execute(
            r#"
            INSERT INTO tick_log (
                market_id, event_id, timestamp, timestamp_ms, price, last_price,
                yes_bid, yes_ask, no_bid, no_ask,
                total_average, margin_of_error, std_dev, sma, anchor, rsi,
                bollinger_upper, bollinger_mid, bollinger_lower,
                pattern, trade_sent, crossed, trade_side
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20, ?21, ?22, ?23)
            "#,
            params![
                record.market_id,
                market.event_id,
                timestamp,
                record.timestamp_ms as i64,
                record.price,
                record.last_price,
                quote.map(|q| q.yes_bid),
                quote.map(|q| q.yes_ask),
                quote.map(|q| q.no_bid),
                quote.map(|q| q.no_ask),
                record.total_average,
                record.margin_of_error,
                record.std_dev,
                record.sma,
                record.anchor,
                record.rsi,
                bands.map(|b| b.upper),
                bands.map(|b| b.mid),
                bands.map(|b| b.lower),
                record.pattern.map(|d| d.as_str()).unwrap_or("none"),
                record.trade_sent,
                record.crossed.map(|d| d.as_str()).unwrap_or("none"),
                record
                    .trade_side
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tick_log", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Rows for one market, oldest first.
    pub fn load_market(&self, market_id: &str) -> Result<Vec<StoredTick>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT market_id, event_id, timestamp, price, sma, total_average, rsi,
                   pattern, trade_sent, crossed, trade_side
            FROM tick_log
            WHERE market_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![market_id], |row| {
            Ok(StoredTick {
                market_id: row.get(0)?,
                event_id: row.get(1)?,
                timestamp: row.get(2)?,
                price: row.get(3)?,
                sma: row.get(4)?,
                total_average: row.get(5)?,
                rsi: row.get(6)?,
                pattern: row.get(7)?,
                trade_sent: row.get(8)?,
                crossed: row.get(9)?,
                trade_side: row.get(10)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
