//! Pure SQL construction for the four relational operations.
//!
//! Identifiers are emitted verbatim; values always travel as `?` params.

use crate::error::{StorageError, StorageResult};
use crate::models::{DeleteOp, Fields, InsertOp, SelectOp, UpdateOp, WhereClause};
use crate::value::TypedValue;

/// A statement ready to be sent to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<TypedValue>,
}

/// `database.table`, after checking neither part is blank.
pub fn qualified_table(database: &str, table: &str) -> StorageResult<String> {
    if database.trim().is_empty() {
        return Err(StorageError::validation("database is empty"));
    }
    if table.trim().is_empty() {
        return Err(StorageError::validation("table is empty"));
    }
    Ok(format!("{}.{}", database, table))
}

/// Renders ` WHERE ...` (leading space included) and its params. Returns an
/// empty string when the clause selects nothing.
pub fn where_sql(clause: Option<&WhereClause>) -> (String, Vec<TypedValue>) {
    let Some(clause) = clause else {
        return (String::new(), Vec::new());
    };

    if !clause.raw_clause.trim().is_empty() {
        return (
            format!(" WHERE {}", clause.raw_clause),
            clause.raw_params.clone(),
        );
    }

    if clause.conditions.is_empty() {
        return (String::new(), Vec::new());
    }

    let (columns, params) = assignments(&clause.conditions);
    (format!(" WHERE {}", columns.join(" AND ")), params)
}

fn assignments(fields: &Fields) -> (Vec<String>, Vec<TypedValue>) {
    fields
        .iter()
        .map(|(col, value)| (format!("{} = ?", col), value.clone()))
        .unzip()
}

/// One multi-row INSERT. Columns come from the first row; later rows missing
/// a column bind NULL for it and extra columns are ignored.
pub fn build_insert(database: &str, table: &str, op: &InsertOp) -> StorageResult<SqlStatement> {
    let target = qualified_table(database, table)?;
    let first = op
        .rows
        .first()
        .ok_or_else(|| StorageError::validation("insert rows is empty"))?;
    if first.is_empty() {
        return Err(StorageError::validation("first row has no fields"));
    }

    let columns: Vec<&String> = first.keys().collect();
    let group = format!("({})", vec!["?"; columns.len()].join(", "));

    let mut params = Vec::with_capacity(op.rows.len() * columns.len());
    for row in &op.rows {
        params.extend(
            columns
                .iter()
                .map(|col| row.get(*col).cloned().unwrap_or(TypedValue::Null)),
        );
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        target,
        columns
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        vec![group.as_str(); op.rows.len()].join(", ")
    );

    Ok(SqlStatement { sql, params })
}

/// UPDATE with either the raw SET expression or generated `col = ?` pairs.
/// Raw SET params come before WHERE params.
pub fn build_update(database: &str, table: &str, op: &UpdateOp) -> StorageResult<SqlStatement> {
    let target = qualified_table(database, table)?;

    let (set_clause, mut params) = if !op.raw_set.trim().is_empty() {
        (op.raw_set.clone(), op.raw_set_params.clone())
    } else if !op.set_fields.is_empty() {
        let (columns, params) = assignments(&op.set_fields);
        (columns.join(", "), params)
    } else {
        return Err(StorageError::validation(
            "update fields is empty (neither set_fields nor raw_set provided)",
        ));
    };

    let (where_clause, where_params) = where_sql(op.where_clause.as_ref());
    params.extend(where_params);

    Ok(SqlStatement {
        sql: format!("UPDATE {} SET {}{}", target, set_clause, where_clause),
        params,
    })
}

/// DELETE refuses to run without a WHERE clause.
pub fn build_delete(database: &str, table: &str, op: &DeleteOp) -> StorageResult<SqlStatement> {
    let target = qualified_table(database, table)?;

    let (where_clause, params) = where_sql(op.where_clause.as_ref());
    if where_clause.is_empty() {
        return Err(StorageError::validation(
            "where clause is required for delete (to prevent accidental full table deletion)",
        ));
    }

    Ok(SqlStatement {
        sql: format!("DELETE FROM {}{}", target, where_clause),
        params,
    })
}

pub fn build_select(database: &str, table: &str, op: &SelectOp) -> StorageResult<SqlStatement> {
    let target = qualified_table(database, table)?;

    let fields = if op.fields.is_empty() {
        "*".to_string()
    } else {
        op.fields.join(", ")
    };

    let (where_clause, params) = where_sql(op.where_clause.as_ref());

    let order_clause = match &op.order_by {
        Some(order) if !order.field.trim().is_empty() => format!(
            " ORDER BY {} {}",
            order.field,
            if order.descending { "DESC" } else { "ASC" }
        ),
        _ => String::new(),
    };

    let limit_clause = match op.pagination {
        Some(page) if page.limit > 0 && page.offset > 0 => {
            format!(" LIMIT {} OFFSET {}", page.limit, page.offset)
        }
        Some(page) if page.limit > 0 => format!(" LIMIT {}", page.limit),
        _ => String::new(),
    };

    Ok(SqlStatement {
        sql: format!(
            "SELECT {} FROM {}{}{}{}",
            fields, target, where_clause, order_clause, limit_clause
        ),
        params,
    })
}
