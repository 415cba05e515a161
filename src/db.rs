// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Runway", "runway"));

/// Environment override for the database file.
pub const DB_ENV: &str = "RUNWAY_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        let path = PathBuf::from(p);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return Ok(path);
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("runway.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        classification TEXT NOT NULL CHECK(classification IN ('spending','non_spending')),
        account_type TEXT NOT NULL,
        opening_balance TEXT NOT NULL,
        current_balance TEXT NOT NULL,
        credit_limit TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(user_id, name)
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(user_id, name)
    );

    CREATE TABLE IF NOT EXISTS recurring_transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        account_id INTEGER NOT NULL,
        category_id INTEGER,
        name TEXT NOT NULL,
        transaction_type TEXT NOT NULL CHECK(transaction_type IN ('debit','credit')),
        amount_type TEXT NOT NULL CHECK(amount_type IN ('fixed','variable')),
        amount TEXT,
        amount_max TEXT,
        frequency TEXT NOT NULL CHECK(frequency IN ('weekly','monthly','yearly')),
        day_of_month INTEGER,
        day_of_week INTEGER,
        next_occurrence TEXT,
        last_occurrence TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL,
        category_id INTEGER,
        date TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        amount TEXT NOT NULL, -- positive; sign comes from transaction_type
        transaction_type TEXT NOT NULL CHECK(transaction_type IN ('debit','credit')),
        transfer_pair_id TEXT,
        is_reviewed INTEGER NOT NULL DEFAULT 0,
        is_recurring_instance INTEGER NOT NULL DEFAULT 0,
        recurring_transaction_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(account_id) REFERENCES accounts(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(recurring_transaction_id) REFERENCES recurring_transactions(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_pair ON transactions(transfer_pair_id);

    CREATE TABLE IF NOT EXISTS debts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        original_amount TEXT NOT NULL,
        opening_balance TEXT NOT NULL,
        current_balance TEXT NOT NULL,
        minimum_payment TEXT NOT NULL DEFAULT '0.00',
        fixed_payment TEXT,
        interest_rate TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS debt_payments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        debt_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        principal TEXT,
        interest TEXT,
        note TEXT,
        FOREIGN KEY(debt_id) REFERENCES debts(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS savings_goals(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        opening_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL,
        target_amount TEXT,
        target_date TEXT,
        is_completed INTEGER NOT NULL DEFAULT 0,
        completed_at TEXT
    );

    CREATE TABLE IF NOT EXISTS savings_contributions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        goal_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        note TEXT,
        FOREIGN KEY(goal_id) REFERENCES savings_goals(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        month TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'draft' CHECK(status IN ('draft','active','closed')),
        total_planned_expenses TEXT NOT NULL DEFAULT '0.00',
        total_income TEXT NOT NULL DEFAULT '0.00',
        unallocated TEXT NOT NULL DEFAULT '0.00',
        UNIQUE(user_id, month)
    );

    CREATE TABLE IF NOT EXISTS budget_lines(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        budget_id INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('item','income','one_off')),
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        category_id INTEGER,
        date TEXT,
        FOREIGN KEY(budget_id) REFERENCES budgets(id) ON DELETE CASCADE,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );

    -- Forecast cache: rows are only ever replaced wholesale per date range
    CREATE TABLE IF NOT EXISTS daily_tracker_entries(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        expected_income TEXT NOT NULL,
        expected_debt_payments TEXT NOT NULL,
        expected_expenses TEXT NOT NULL,
        predicted_spend TEXT NOT NULL,
        running_balance TEXT NOT NULL,
        has_alerts INTEGER NOT NULL,
        alerts TEXT,
        is_payday INTEGER NOT NULL,
        income_details TEXT NOT NULL,
        debt_details TEXT NOT NULL,
        expense_details TEXT,
        UNIQUE(user_id, date)
    );
    "#,
    )?;
    Ok(())
}

/// Reads a two-digit fixed-point TEXT column as a `Decimal`.
pub fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    parse_stored(idx, &s)
}

pub fn opt_decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| parse_stored(idx, &s)).transpose()
}

fn parse_stored(idx: usize, s: &str) -> rusqlite::Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
