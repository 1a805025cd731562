//! Minimal CQL query builder
//!
//! Builders render CQL text with named bind markers (`:column`) and report the
//! marker names in bind order. Named markers let values derived with
//! `#[derive(SerializeRow)]` bind by column name, while tuples bind by
//! position, so a tuple must follow the reported order. The names are
//! informational: [`crate::SessionX`] passes values to the driver unchanged.
//!
//! ```
//! use scylladbh::qb::{self, QueryBuilder, Order};
//!
//! let (cql, names) = qb::select("users")
//!     .columns(["id", "name"])
//!     .where_(qb::eq("id"))
//!     .order_by("created_at", Order::Desc)
//!     .limit(10)
//!     .to_cql()
//!     .unwrap();
//!
//! assert_eq!(cql, "SELECT id, name FROM users WHERE id = :id ORDER BY created_at DESC LIMIT 10");
//! assert_eq!(names, vec!["id"]);
//! ```

use std::fmt;

use crate::error::{ScyllaError, ScyllaResult};

/// Bind marker name used for `USING TTL`
pub const TTL_MARKER: &str = "_ttl";

/// Anything that renders to CQL plus bind-marker names
pub trait QueryBuilder {
    fn to_cql(&self) -> ScyllaResult<(String, Vec<String>)>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Eq,
    Lt,
    LtOrEq,
    Gt,
    GtOrEq,
    In,
    Contains,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::LtOrEq => "<=",
            Op::Gt => ">",
            Op::GtOrEq => ">=",
            Op::In => "IN",
            Op::Contains => "CONTAINS",
        }
    }
}

/// A `column <op> :marker` restriction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cmp {
    column: String,
    op: Op,
    marker: String,
}

impl Cmp {
    fn new(column: &str, op: Op) -> Self {
        Self {
            column: column.to_string(),
            op,
            marker: column.to_string(),
        }
    }

    /// Bind to a marker other than the column name (e.g. for range bounds on one column)
    pub fn named(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} :{}", self.column, self.op.as_str(), self.marker)
    }
}

pub fn eq(column: &str) -> Cmp {
    Cmp::new(column, Op::Eq)
}

pub fn lt(column: &str) -> Cmp {
    Cmp::new(column, Op::Lt)
}

pub fn lt_or_eq(column: &str) -> Cmp {
    Cmp::new(column, Op::LtOrEq)
}

pub fn gt(column: &str) -> Cmp {
    Cmp::new(column, Op::Gt)
}

pub fn gt_or_eq(column: &str) -> Cmp {
    Cmp::new(column, Op::GtOrEq)
}

pub fn in_(column: &str) -> Cmp {
    Cmp::new(column, Op::In)
}

pub fn contains(column: &str) -> Cmp {
    Cmp::new(column, Op::Contains)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

fn check_table(table: &str) -> ScyllaResult<()> {
    if table.trim().is_empty() {
        return Err(ScyllaError::Query("table name is empty".to_string()));
    }
    Ok(())
}

fn where_clause(cql: &mut String, names: &mut Vec<String>, restrictions: &[Cmp]) {
    if restrictions.is_empty() {
        return;
    }

    let rendered: Vec<String> = restrictions.iter().map(Cmp::to_string).collect();
    cql.push_str(" WHERE ");
    cql.push_str(&rendered.join(" AND "));
    names.extend(restrictions.iter().map(|c| c.marker.clone()));
}

fn collect(columns: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    columns.into_iter().map(Into::into).collect()
}

#[derive(Clone, Debug, Default)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    restrictions: Vec<Cmp>,
    order_by: Vec<(String, Order)>,
    limit: Option<u32>,
    allow_filtering: bool,
}

/// `SELECT ... FROM table`
pub fn select(table: impl Into<String>) -> Select {
    Select {
        table: table.into(),
        ..Select::default()
    }
}

impl Select {
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(collect(columns));
        self
    }

    pub fn where_(mut self, cmp: Cmp) -> Self {
        self.restrictions.push(cmp);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn allow_filtering(mut self) -> Self {
        self.allow_filtering = true;
        self
    }
}

impl QueryBuilder for Select {
    fn to_cql(&self) -> ScyllaResult<(String, Vec<String>)> {
        check_table(&self.table)?;

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };

        let mut cql = format!("SELECT {} FROM {}", columns, self.table);
        let mut names = Vec::new();
        where_clause(&mut cql, &mut names, &self.restrictions);

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|(col, ord)| format!("{} {}", col, ord.as_str()))
                .collect();
            cql.push_str(" ORDER BY ");
            cql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            cql.push_str(&format!(" LIMIT {}", limit));
        }

        if self.allow_filtering {
            cql.push_str(" ALLOW FILTERING");
        }

        Ok((cql, names))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    if_not_exists: bool,
    ttl: bool,
}

/// `INSERT INTO table (...) VALUES (...)`
pub fn insert(table: impl Into<String>) -> Insert {
    Insert {
        table: table.into(),
        ..Insert::default()
    }
}

impl Insert {
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(collect(columns));
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add `USING TTL :_ttl`, bound last
    pub fn ttl_named(mut self) -> Self {
        self.ttl = true;
        self
    }
}

impl QueryBuilder for Insert {
    fn to_cql(&self) -> ScyllaResult<(String, Vec<String>)> {
        check_table(&self.table)?;
        if self.columns.is_empty() {
            return Err(ScyllaError::Query(format!(
                "insert into {} has no columns",
                self.table
            )));
        }

        let markers: Vec<String> = self.columns.iter().map(|c| format!(":{}", c)).collect();
        let mut cql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            markers.join(", ")
        );
        let mut names = self.columns.clone();

        if self.if_not_exists {
            cql.push_str(" IF NOT EXISTS");
        }

        if self.ttl {
            cql.push_str(&format!(" USING TTL :{}", TTL_MARKER));
            names.push(TTL_MARKER.to_string());
        }

        Ok((cql, names))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Update {
    table: String,
    set: Vec<String>,
    restrictions: Vec<Cmp>,
    if_exists: bool,
    ttl: bool,
}

/// `UPDATE table SET ... WHERE ...`
pub fn update(table: impl Into<String>) -> Update {
    Update {
        table: table.into(),
        ..Update::default()
    }
}

impl Update {
    pub fn set(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.set.extend(collect(columns));
        self
    }

    pub fn where_(mut self, cmp: Cmp) -> Self {
        self.restrictions.push(cmp);
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Add `USING TTL :_ttl`, bound first
    pub fn ttl_named(mut self) -> Self {
        self.ttl = true;
        self
    }
}

impl QueryBuilder for Update {
    fn to_cql(&self) -> ScyllaResult<(String, Vec<String>)> {
        check_table(&self.table)?;
        if self.set.is_empty() {
            return Err(ScyllaError::Query(format!(
                "update of {} sets no columns",
                self.table
            )));
        }
        if self.restrictions.is_empty() {
            return Err(ScyllaError::Query(format!(
                "update of {} has no WHERE clause",
                self.table
            )));
        }

        let mut cql = format!("UPDATE {}", self.table);
        let mut names = Vec::new();

        if self.ttl {
            cql.push_str(&format!(" USING TTL :{}", TTL_MARKER));
            names.push(TTL_MARKER.to_string());
        }

        let assignments: Vec<String> = self.set.iter().map(|c| format!("{} = :{}", c, c)).collect();
        cql.push_str(" SET ");
        cql.push_str(&assignments.join(", "));
        names.extend(self.set.iter().cloned());

        where_clause(&mut cql, &mut names, &self.restrictions);

        if self.if_exists {
            cql.push_str(" IF EXISTS");
        }

        Ok((cql, names))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Delete {
    table: String,
    columns: Vec<String>,
    restrictions: Vec<Cmp>,
    if_exists: bool,
}

/// `DELETE FROM table WHERE ...`
pub fn delete(table: impl Into<String>) -> Delete {
    Delete {
        table: table.into(),
        ..Delete::default()
    }
}

impl Delete {
    /// Delete only these columns instead of the whole row
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(collect(columns));
        self
    }

    pub fn where_(mut self, cmp: Cmp) -> Self {
        self.restrictions.push(cmp);
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl QueryBuilder for Delete {
    fn to_cql(&self) -> ScyllaResult<(String, Vec<String>)> {
        check_table(&self.table)?;
        if self.restrictions.is_empty() {
            return Err(ScyllaError::Query(format!(
                "delete from {} has no WHERE clause",
                self.table
            )));
        }

        let mut cql = if self.columns.is_empty() {
            format!("DELETE FROM {}", self.table)
        } else {
            format!("DELETE {} FROM {}", self.columns.join(", "), self.table)
        };
        let mut names = Vec::new();
        where_clause(&mut cql, &mut names, &self.restrictions);

        if self.if_exists {
            cql.push_str(" IF EXISTS");
        }

        Ok((cql, names))
    }
}
