//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from resource descriptors.

use super::params::SqlValue;
use crate::catalog::{Association, Resource};

/// Quote identifier for PostgreSQL (safe: only from the catalog).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

const MAIN_ALIAS: &str = "main";

/// SQL text plus its positional parameters.
#[derive(Clone, Debug, Default)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
    /// Column returned by an INSERT ... RETURNING, read back as the generated id.
    pub returning: Option<&'static str>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn bind(mut self, v: impl Into<SqlValue>) -> Self {
        self.params.push(v.into());
        self
    }

    pub fn returning(mut self, column: &'static str) -> Self {
        self.returning = Some(column);
        self
    }

    /// Push a parameter and return its `$n::type` placeholder.
    fn push_param(&mut self, v: SqlValue, pg_type: &str) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), pg_type)
    }
}

/// Columns for every read: pk, stored columns, then the association id array if any.
fn select_column_list(resource: &Resource) -> String {
    let mut parts = vec![format!("{}.{}", MAIN_ALIAS, quoted(resource.pk))];
    parts.extend(
        resource
            .columns
            .iter()
            .map(|c| format!("{}.{}", MAIN_ALIAS, quoted(c.name))),
    );
    if let Some(assoc) = &resource.association {
        parts.push(format!(
            "ARRAY(SELECT a.{member} FROM {table} a WHERE a.{owner} = {main}.{pk} ORDER BY a.{member}) AS {field}",
            member = quoted(assoc.member_column),
            table = quoted(assoc.table),
            owner = quoted(assoc.owner_column),
            main = MAIN_ALIAS,
            pk = quoted(resource.pk),
            field = quoted(assoc.field),
        ));
    }
    parts.join(", ")
}

/// SELECT every row ordered by primary key.
pub fn select_list(resource: &Resource) -> Statement {
    Statement::new(format!(
        "SELECT {} FROM {} {} ORDER BY {}.{}",
        select_column_list(resource),
        quoted(resource.table),
        MAIN_ALIAS,
        MAIN_ALIAS,
        quoted(resource.pk)
    ))
}

/// SELECT one row by primary key.
pub fn select_by_id(resource: &Resource, id: i32) -> Statement {
    let mut q = Statement::default();
    let ph = q.push_param(SqlValue::Int(id), "int4");
    q.sql = format!(
        "SELECT {} FROM {} {} WHERE {}.{} = {}",
        select_column_list(resource),
        quoted(resource.table),
        MAIN_ALIAS,
        MAIN_ALIAS,
        quoted(resource.pk),
        ph
    );
    q
}

/// INSERT the given (column, value) pairs, returning the generated primary key.
/// Pairs naming unknown columns are skipped.
pub fn insert(resource: &Resource, values: &[(&'static str, SqlValue)]) -> Statement {
    let mut q = Statement::default();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (name, v) in values {
        let Some(c) = resource.column(name) else { continue };
        placeholders.push(q.push_param(v.clone(), c.kind.pg_type()));
        cols.push(quoted(c.name));
    }
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(resource.table),
            quoted(resource.pk)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(resource.table),
            cols.join(", "),
            placeholders.join(", "),
            quoted(resource.pk)
        )
    };
    q.returning = Some(resource.pk);
    q
}

/// UPDATE by id, setting exactly the given columns. Returns `None` when nothing would be set.
pub fn update(resource: &Resource, id: i32, values: &[(&'static str, SqlValue)]) -> Option<Statement> {
    let mut q = Statement::default();
    let mut sets = Vec::new();
    for (name, v) in values {
        let Some(c) = resource.column(name) else { continue };
        let ph = q.push_param(v.clone(), c.kind.pg_type());
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    if sets.is_empty() {
        return None;
    }
    let id_ph = q.push_param(SqlValue::Int(id), "int4");
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(resource.table),
        sets.join(", "),
        quoted(resource.pk),
        id_ph
    );
    Some(q)
}

/// DELETE by id.
pub fn delete(resource: &Resource, id: i32) -> Statement {
    let mut q = Statement::default();
    let ph = q.push_param(SqlValue::Int(id), "int4");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(resource.table),
        quoted(resource.pk),
        ph
    );
    q
}

/// DELETE every join row owned by `owner`.
pub fn delete_members(assoc: &Association, owner: i32) -> Statement {
    let mut q = Statement::default();
    let ph = q.push_param(SqlValue::Int(owner), "int4");
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(assoc.table),
        quoted(assoc.owner_column),
        ph
    );
    q
}

/// INSERT one join row.
pub fn insert_member(assoc: &Association, owner: i32, member: i32) -> Statement {
    let mut q = Statement::default();
    let owner_ph = q.push_param(SqlValue::Int(owner), "int4");
    let member_ph = q.push_param(SqlValue::Int(member), "int4");
    q.sql = format!(
        "INSERT INTO {} ({}, {}) VALUES ({}, {})",
        quoted(assoc.table),
        quoted(assoc.owner_column),
        quoted(assoc.member_column),
        owner_ph,
        member_ph
    );
    q
}
