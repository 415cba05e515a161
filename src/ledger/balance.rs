// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};
use crate::utils::{cents, money};

/// The stored running total a ledger event moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateRef {
    Account(i64),
    Debt(i64),
    Goal(i64),
}

impl AggregateRef {
    fn table(&self) -> &'static str {
        match self {
            AggregateRef::Account(_) => "accounts",
            AggregateRef::Debt(_) => "debts",
            AggregateRef::Goal(_) => "savings_goals",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            AggregateRef::Account(_) | AggregateRef::Debt(_) => "current_balance",
            AggregateRef::Goal(_) => "current_amount",
        }
    }

    fn entity(&self) -> &'static str {
        match self {
            AggregateRef::Account(_) => "account",
            AggregateRef::Debt(_) => "debt",
            AggregateRef::Goal(_) => "savings goal",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            AggregateRef::Account(id) | AggregateRef::Debt(id) | AggregateRef::Goal(id) => id,
        }
    }
}

/// Adds `delta` to the aggregate's stored value and returns the new value.
///
/// This is the only writer of `current_balance` / `current_amount`. It is not
/// idempotent: each call is one logical event, so callers apply exactly once
/// per change and must already hold the write transaction.
pub fn apply(conn: &Connection, target: AggregateRef, delta: Decimal) -> Result<Decimal> {
    let (table, column) = (target.table(), target.column());
    let raw: Option<String> = conn
        .query_row(
            &format!("SELECT {column} FROM {table} WHERE id=?1"),
            params![target.id()],
            |r| r.get(0),
        )
        .optional()?;
    let raw = raw.ok_or(LedgerError::not_found(target.entity(), target.id()))?;
    let current = raw
        .parse::<Decimal>()
        .map_err(|_| LedgerError::CorruptAmount { value: raw.clone() })?;
    let next = current.checked_add(delta).map(cents).ok_or_else(|| {
        LedgerError::validation("amount", format!("{} would overflow", target.entity()))
    })?;
    conn.execute(
        &format!("UPDATE {table} SET {column}=?1 WHERE id=?2"),
        params![money(next), target.id()],
    )?;
    tracing::info!(
        aggregate = target.entity(),
        id = target.id(),
        delta = %delta,
        value = %next,
        "balance applied"
    );
    Ok(next)
}
