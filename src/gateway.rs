//! Persistence gateway: owns the pool, hands out scoped connections and transactions,
//! executes statements and normalizes rows into column-name records.

use crate::error::AppError;
use crate::settings::DatabaseSettings;
use crate::sql::Statement;
use crate::time::ClockTime;
use serde_json::{Map, Value};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Transaction};

/// One row: column name to JSON value.
pub type Record = Map<String, Value>;

/// Result shape of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Record>),
    Inserted { id: i32 },
    Affected { rows: u64 },
}

impl Outcome {
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Outcome::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }

    pub fn affected(&self) -> u64 {
        match self {
            Outcome::Rows(rows) => rows.len() as u64,
            Outcome::Inserted { .. } => 1,
            Outcome::Affected { rows } => *rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Query,
    Insert,
    Mutation,
}

impl StatementKind {
    /// Classify by leading keyword. `None` for empty statements.
    pub fn classify(sql: &str) -> Option<Self> {
        let keyword = sql.split_whitespace().next()?.to_ascii_uppercase();
        Some(match keyword.as_str() {
            "SELECT" | "WITH" | "VALUES" => StatementKind::Query,
            "INSERT" => StatementKind::Insert,
            _ => StatementKind::Mutation,
        })
    }
}

#[derive(Clone)]
pub struct Gateway {
    pool: PgPool,
}

impl Gateway {
    /// Pool connects on first use, so startup succeeds with the database down.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect_lazy_with(settings.options.clone());
        Gateway { pool }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Gateway { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Scoped connection; returned to the pool when dropped.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, AppError> {
        self.pool.acquire().await.map_err(AppError::Connection)
    }

    /// Scoped transaction; rolled back when dropped without `commit`.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        self.pool.begin().await.map_err(AppError::Connection)
    }

    /// True when a connection can be acquired and answers `SELECT 1`.
    pub async fn ping(&self) -> bool {
        let mut conn = match self.acquire().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "database unreachable");
                return false;
            }
        };
        match sqlx::query("SELECT 1").execute(&mut *conn).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "database ping failed");
                false
            }
        }
    }
}

/// Execute one statement on a connection or transaction.
pub async fn execute(conn: &mut sqlx::PgConnection, stmt: &Statement) -> Result<Outcome, AppError> {
    let kind = StatementKind::classify(&stmt.sql).ok_or(AppError::InvalidStatement("empty statement"))?;
    tracing::debug!(sql = %stmt.sql, params = stmt.params.len(), ?kind, "execute");
    let mut query = sqlx::query(&stmt.sql);
    for p in &stmt.params {
        query = query.bind(p.clone());
    }
    match (kind, stmt.returning) {
        (StatementKind::Query, _) => {
            let rows = query.fetch_all(&mut *conn).await?;
            Ok(Outcome::Rows(rows.iter().map(row_to_record).collect()))
        }
        (StatementKind::Insert, Some(col)) => {
            use sqlx::Row;
            let row = query.fetch_one(&mut *conn).await?;
            let id: i32 = row.try_get(col)?;
            Ok(Outcome::Inserted { id })
        }
        _ => {
            let done = query.execute(&mut *conn).await?;
            Ok(Outcome::Affected { rows: done.rows_affected() })
        }
    }
}

/// Execute a query and return its first row, if any.
pub async fn fetch_one(conn: &mut sqlx::PgConnection, stmt: &Statement) -> Result<Option<Record>, AppError> {
    Ok(execute(conn, stmt).await?.into_rows().into_iter().next())
}

fn row_to_record(row: &PgRow) -> Record {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    map
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(v) = row.try_get::<Option<i16>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(name) {
        return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(name) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(name) {
        return v
            .map(|t| Value::String(ClockTime::from(t).to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(name) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<i32>>, _>(name) {
        // an absent aggregate is an empty id list
        let ids = v.unwrap_or_default();
        return Value::Array(ids.into_iter().map(|n| Value::Number(n.into())).collect());
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(name) {
        return v.unwrap_or(Value::Null);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_leading_keyword() {
        assert_eq!(StatementKind::classify("SELECT 1"), Some(StatementKind::Query));
        assert_eq!(StatementKind::classify("  select * from x"), Some(StatementKind::Query));
        assert_eq!(StatementKind::classify("WITH a AS (SELECT 1) SELECT * FROM a"), Some(StatementKind::Query));
        assert_eq!(StatementKind::classify("INSERT INTO x VALUES (1)"), Some(StatementKind::Insert));
        assert_eq!(StatementKind::classify("UPDATE x SET a = 1"), Some(StatementKind::Mutation));
        assert_eq!(StatementKind::classify("DELETE FROM x"), Some(StatementKind::Mutation));
    }

    #[test]
    fn keyword_inside_text_does_not_matter() {
        assert_eq!(
            StatementKind::classify("UPDATE \"EVENT\" SET \"Subject\" = 'SELECT'"),
            Some(StatementKind::Mutation)
        );
    }

    #[test]
    fn empty_statements_are_unclassified() {
        assert_eq!(StatementKind::classify(""), None);
        assert_eq!(StatementKind::classify(" \n\t"), None);
    }

    #[test]
    fn outcome_accessors() {
        assert_eq!(Outcome::Affected { rows: 3 }.affected(), 3);
        assert_eq!(Outcome::Inserted { id: 5 }.affected(), 1);
        assert!(Outcome::Inserted { id: 5 }.into_rows().is_empty());
    }

    #[tokio::test]
    async fn unreachable_database_reports_connection_errors() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let gateway = Gateway::from_pool(pool);
        assert!(!gateway.ping().await);
        assert!(matches!(gateway.acquire().await, Err(AppError::Connection(_))));
    }
}
