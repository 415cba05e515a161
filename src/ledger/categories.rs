// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection};

use super::{begin, ensure_category, find_transaction};
use crate::error::{LedgerError, Result};
use crate::models::Category;

pub fn create_category(conn: &mut Connection, user_id: i64, name: &str) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    let tx = begin(conn)?;
    let clash: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE user_id=?1 AND name=?2)",
        params![user_id, name],
        |r| r.get(0),
    )?;
    if clash {
        return Err(LedgerError::Conflict(format!("category '{}' already exists", name)));
    }
    tx.execute(
        "INSERT INTO categories(user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )?;
    let category = Category {
        id: tx.last_insert_rowid(),
        user_id,
        name: name.to_string(),
    };
    tx.commit()?;
    Ok(category)
}

pub fn list_categories(conn: &Connection, user_id: i64) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, user_id, name FROM categories WHERE user_id=?1 ORDER BY name")?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(Category {
            id: r.get(0)?,
            user_id: r.get(1)?,
            name: r.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Moves transactions into a category and marks them reviewed.
///
/// Balance-neutral. Every id must belong to the user or nothing changes.
pub fn recategorize(
    conn: &mut Connection,
    user_id: i64,
    transaction_ids: &[i64],
    category_id: i64,
) -> Result<usize> {
    if transaction_ids.is_empty() {
        return Err(LedgerError::validation(
            "transaction_ids",
            "at least one transaction is required",
        ));
    }
    let mut ids = transaction_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let tx = begin(conn)?;
    ensure_category(&tx, user_id, category_id)?;
    for id in &ids {
        find_transaction(&tx, user_id, *id)?;
    }
    let mut changed = 0;
    for id in &ids {
        changed += tx.execute(
            "UPDATE transactions SET category_id=?1, is_reviewed=1 WHERE id=?2",
            params![category_id, id],
        )?;
    }
    tx.commit()?;
    tracing::info!(category = category_id, changed, "transactions recategorized");
    Ok(changed)
}
