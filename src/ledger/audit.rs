// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Recomputes every aggregate from its opening value plus its active
//! records and reports where the stored value has drifted.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::decimal_at;
use crate::error::Result;
use crate::models::TransactionType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Drift {
    pub aggregate: &'static str,
    pub id: i64,
    pub name: String,
    pub stored: Decimal,
    pub expected: Decimal,
}

/// Sums `(id, amount, sign)` rows into per-aggregate totals keyed by id.
fn collect(
    conn: &Connection,
    aggregate: &'static str,
    sql_aggregates: &str,
    sql_events: &str,
    user_id: i64,
) -> Result<Vec<Drift>> {
    let mut events = conn.prepare(sql_events)?;
    let rows = events.query_map(params![user_id], |r| {
        Ok((r.get::<_, i64>(0)?, decimal_at(r, 1)?, r.get::<_, TransactionType>(2)?))
    })?;
    let mut totals = std::collections::HashMap::<i64, Decimal>::new();
    for row in rows {
        let (id, amount, kind) = row?;
        *totals.entry(id).or_insert(Decimal::ZERO) += kind.signed(amount);
    }

    let mut stmt = conn.prepare(sql_aggregates)?;
    let aggregates = stmt.query_map(params![user_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, decimal_at(r, 2)?, decimal_at(r, 3)?))
    })?;
    let mut drift = Vec::new();
    for row in aggregates {
        let (id, name, opening, stored) = row?;
        let expected = opening + totals.get(&id).copied().unwrap_or(Decimal::ZERO);
        if expected != stored {
            tracing::warn!(aggregate, id, %stored, %expected, "aggregate drift");
            drift.push(Drift {
                aggregate,
                id,
                name,
                stored,
                expected,
            });
        }
    }
    Ok(drift)
}

pub fn reconcile(conn: &Connection, user_id: i64) -> Result<Vec<Drift>> {
    let mut out = collect(
        conn,
        "account",
        "SELECT id, name, opening_balance, current_balance FROM accounts WHERE user_id=?1",
        "SELECT t.account_id, t.amount, t.transaction_type FROM transactions t
         JOIN accounts a ON t.account_id=a.id WHERE a.user_id=?1",
        user_id,
    )?;
    out.extend(collect(
        conn,
        "debt",
        "SELECT id, name, opening_balance, current_balance FROM debts WHERE user_id=?1",
        "SELECT p.debt_id, p.amount, 'debit' FROM debt_payments p
         JOIN debts d ON p.debt_id=d.id WHERE d.user_id=?1",
        user_id,
    )?);
    out.extend(collect(
        conn,
        "savings goal",
        "SELECT id, name, opening_amount, current_amount FROM savings_goals WHERE user_id=?1",
        "SELECT c.goal_id, c.amount, 'credit' FROM savings_contributions c
         JOIN savings_goals g ON c.goal_id=g.id WHERE g.user_id=?1",
        user_id,
    )?);
    Ok(out)
}
