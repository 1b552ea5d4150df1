//! Schema bootstrap: idempotent DDL for the schedule tables and the optional first user.
//! No versions and no alterations; existing tables are left as they are.

use crate::auth::CredentialService;
use crate::error::AppError;
use crate::gateway::{self, Gateway};
use crate::settings::AuthSettings;
use crate::sql::Statement;
use serde_json::Value;

/// (table, DDL) in dependency order.
const TABLES: &[(&str, &str)] = &[
    (
        "LECTURER",
        r#"CREATE TABLE IF NOT EXISTS "LECTURER" (
            "Id" SERIAL PRIMARY KEY,
            "Name" TEXT NOT NULL,
            "NameAbbr" TEXT NOT NULL,
            "Office" TEXT NOT NULL DEFAULT '',
            "Hide" SMALLINT NOT NULL DEFAULT 0 CHECK ("Hide" IN (0, 1))
        )"#,
    ),
    (
        "ROOM",
        r#"CREATE TABLE IF NOT EXISTS "ROOM" (
            "Id" SERIAL PRIMARY KEY,
            "Name" TEXT NOT NULL,
            "NameAbbr" TEXT NOT NULL,
            "Number" TEXT NOT NULL DEFAULT '',
            "Capacity" INTEGER NOT NULL DEFAULT 0,
            "Hide" SMALLINT NOT NULL DEFAULT 0 CHECK ("Hide" IN (0, 1))
        )"#,
    ),
    (
        "EVENT",
        r#"CREATE TABLE IF NOT EXISTS "EVENT" (
            "Id" SERIAL PRIMARY KEY,
            "Subject" TEXT NOT NULL,
            "SubjectAbbr" TEXT NOT NULL,
            "StartTime" TIME,
            "EndTime" TIME,
            "WeekDay" INTEGER,
            "RoomId" INTEGER REFERENCES "ROOM" ("Id"),
            "LecturerId" INTEGER REFERENCES "LECTURER" ("Id"),
            "Hide" SMALLINT NOT NULL DEFAULT 0 CHECK ("Hide" IN (0, 1)),
            CHECK ("StartTime" IS NULL OR "EndTime" IS NULL OR "StartTime" < "EndTime")
        )"#,
    ),
    (
        "BLOCK",
        r#"CREATE TABLE IF NOT EXISTS "BLOCK" (
            "Id" SERIAL PRIMARY KEY,
            "Name" TEXT NOT NULL,
            "NameAbbr" TEXT NOT NULL,
            "Hide" SMALLINT NOT NULL DEFAULT 0 CHECK ("Hide" IN (0, 1))
        )"#,
    ),
    (
        "BLOCK_TO_EVENT",
        r#"CREATE TABLE IF NOT EXISTS "BLOCK_TO_EVENT" (
            "BlockId" INTEGER NOT NULL REFERENCES "BLOCK" ("Id"),
            "EventId" INTEGER NOT NULL REFERENCES "EVENT" ("Id"),
            PRIMARY KEY ("BlockId", "EventId")
        )"#,
    ),
    (
        "RESTRICTION",
        r#"CREATE TABLE IF NOT EXISTS "RESTRICTION" (
            "Id" SERIAL PRIMARY KEY,
            "LecturerId" INTEGER NOT NULL REFERENCES "LECTURER" ("Id"),
            "Type" TEXT NOT NULL,
            "Weekday" INTEGER NOT NULL,
            "StartTime" TIME,
            "EndTime" TIME
        )"#,
    ),
    (
        "OCUPATION",
        r#"CREATE TABLE IF NOT EXISTS "OCUPATION" (
            "Id" SERIAL PRIMARY KEY,
            "RoomId" INTEGER NOT NULL REFERENCES "ROOM" ("Id"),
            "WeekDay" INTEGER NOT NULL,
            "StartTime" TIME,
            "EndTime" TIME
        )"#,
    ),
    (
        "USER",
        r#"CREATE TABLE IF NOT EXISTS "USER" (
            "Id" SERIAL PRIMARY KEY,
            "Username" TEXT NOT NULL UNIQUE,
            "PasswordHash" TEXT NOT NULL,
            "Salt" TEXT NOT NULL,
            "HashAlgorithm" TEXT NOT NULL
        )"#,
    ),
];

/// Create every table that does not exist yet, in one transaction.
pub async fn ensure_schema(gateway: &Gateway) -> Result<(), AppError> {
    let mut tx = gateway.begin().await?;
    for (table, ddl) in TABLES {
        gateway::execute(&mut tx, &Statement::new(*ddl)).await?;
        tracing::debug!(table, "table ensured");
    }
    tx.commit().await?;
    tracing::info!(tables = TABLES.len(), "schema ready");
    Ok(())
}

/// Register the configured first user when the USER table is empty.
/// Returns the new user's id, or `None` when nothing was created.
pub async fn ensure_bootstrap_user(
    gateway: &Gateway,
    credentials: &CredentialService,
    settings: &AuthSettings,
) -> Result<Option<i32>, AppError> {
    let Some((username, password)) = &settings.bootstrap_user else {
        return Ok(None);
    };
    let count = {
        let mut conn = gateway.acquire().await?;
        gateway::fetch_one(&mut conn, &Statement::new(r#"SELECT COUNT(*)::int4 AS "Users" FROM "USER""#))
            .await?
            .and_then(|rec| rec.get("Users").and_then(Value::as_i64))
            .unwrap_or(0)
    };
    if count > 0 {
        tracing::debug!(count, "users exist, bootstrap user skipped");
        return Ok(None);
    }
    let id = credentials.register(gateway, username, password).await?;
    tracing::info!(username = %username, id, "bootstrap user created");
    Ok(Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RESOURCES;

    fn ddl_for(table: &str) -> &'static str {
        TABLES.iter().find(|(t, _)| *t == table).map(|(_, d)| *d).unwrap()
    }

    #[test]
    fn every_catalog_column_has_ddl() {
        for r in RESOURCES {
            let ddl = ddl_for(r.table);
            assert!(ddl.contains(&format!("\"{}\" SERIAL PRIMARY KEY", r.pk)), "{}", r.table);
            for c in r.columns {
                assert!(ddl.contains(&format!("\"{}\" ", c.name)), "{}.{}", r.table, c.name);
                let nullable = !ddl.contains(&format!("\"{}\" {} NOT NULL", c.name, sql_type(c.kind)));
                assert_eq!(nullable, c.nullable, "{}.{}", r.table, c.name);
                if c.has_default {
                    assert!(ddl.contains(&format!("\"{}\" {} NOT NULL DEFAULT", c.name, sql_type(c.kind))));
                }
            }
        }
    }

    fn sql_type(kind: crate::catalog::ColumnKind) -> &'static str {
        use crate::catalog::ColumnKind::*;
        match kind {
            Text => "TEXT",
            Int => "INTEGER",
            Flag => "SMALLINT",
            Time => "TIME",
        }
    }

    #[test]
    fn join_table_follows_its_owners() {
        let pos = |t: &str| TABLES.iter().position(|(n, _)| *n == t).unwrap();
        assert!(pos("BLOCK_TO_EVENT") > pos("BLOCK"));
        assert!(pos("BLOCK_TO_EVENT") > pos("EVENT"));
        assert!(ddl_for("BLOCK_TO_EVENT").contains(r#"PRIMARY KEY ("BlockId", "EventId")"#));
    }

    #[test]
    fn usernames_are_unique() {
        assert!(ddl_for("USER").contains(r#""Username" TEXT NOT NULL UNIQUE"#));
    }
}
