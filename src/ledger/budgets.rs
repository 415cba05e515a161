// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly budgets. Nothing here moves a balance; the summary totals are a
//! plain aggregation over the budget's lines.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use super::{
    begin, ensure_category, find_budget, map_budget, map_budget_line, BUDGET_COLS,
    BUDGET_LINE_COLS,
};
use crate::error::{LedgerError, Result};
use crate::models::{Budget, BudgetLine, BudgetLineKind, BudgetStatus};
use crate::utils::{check_amount, money};

#[derive(Debug, Clone)]
pub struct NewBudgetLine {
    pub kind: BudgetLineKind,
    pub name: String,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

fn check_month(month: &str) -> Result<()> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| LedgerError::validation("month", format!("'{}' is not YYYY-MM", month)))
}

pub fn create_budget(conn: &mut Connection, user_id: i64, month: &str) -> Result<Budget> {
    let month = month.trim();
    check_month(month)?;
    let tx = begin(conn)?;
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM budgets WHERE user_id=?1 AND month=?2",
            params![user_id, month],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Err(LedgerError::Conflict(format!(
            "budget {} already exists for {}",
            id, month
        )));
    }
    tx.execute(
        "INSERT INTO budgets(user_id, month) VALUES (?1, ?2)",
        params![user_id, month],
    )?;
    let budget = find_budget(&tx, user_id, tx.last_insert_rowid())?;
    tx.commit()?;
    tracing::info!(id = budget.id, month, "budget created");
    Ok(budget)
}

pub fn get_budget(conn: &Connection, user_id: i64, id: i64) -> Result<Budget> {
    find_budget(conn, user_id, id)
}

pub fn list_budgets(conn: &Connection, user_id: i64) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLS} FROM budgets WHERE user_id=?1 ORDER BY month DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], map_budget)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// The user's single active budget, if any.
pub fn active_budget(conn: &Connection, user_id: i64) -> Result<Option<Budget>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {BUDGET_COLS} FROM budgets WHERE user_id=?1 AND status='active'
                 ORDER BY month DESC LIMIT 1"
            ),
            params![user_id],
            map_budget,
        )
        .optional()?)
}

/// Sets a budget's status. Activation demotes any other active budget to draft.
/// A closed budget cannot change status again.
pub fn set_status(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    status: BudgetStatus,
) -> Result<Budget> {
    let tx = begin(conn)?;
    let current = find_budget(&tx, user_id, id)?;
    ensure_editable(&current)?;
    if status == BudgetStatus::Active {
        tx.execute(
            "UPDATE budgets SET status='draft' WHERE user_id=?1 AND status='active' AND id<>?2",
            params![user_id, id],
        )?;
    }
    tx.execute(
        "UPDATE budgets SET status=?1 WHERE id=?2",
        params![status, id],
    )?;
    let budget = find_budget(&tx, user_id, id)?;
    tx.commit()?;
    tracing::info!(id, status = %status, "budget status changed");
    Ok(budget)
}

fn ensure_editable(budget: &Budget) -> Result<()> {
    if budget.status == BudgetStatus::Closed {
        return Err(LedgerError::validation(
            "budget_id",
            format!("budget {} is closed", budget.id),
        ));
    }
    Ok(())
}

pub fn add_line(
    conn: &mut Connection,
    user_id: i64,
    budget_id: i64,
    input: NewBudgetLine,
) -> Result<(BudgetLine, Budget)> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    let amount = check_amount("amount", input.amount)?;
    let tx = begin(conn)?;
    let budget = find_budget(&tx, user_id, budget_id)?;
    ensure_editable(&budget)?;
    if let Some(cat) = input.category_id {
        ensure_category(&tx, user_id, cat)?;
    }
    tx.execute(
        "INSERT INTO budget_lines(budget_id, kind, name, amount, category_id, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            budget_id,
            input.kind,
            input.name.trim(),
            money(amount),
            input.category_id,
            input.date
        ],
    )?;
    let line_id = tx.last_insert_rowid();
    let line = tx.query_row(
        &format!("SELECT {BUDGET_LINE_COLS} FROM budget_lines WHERE id=?1"),
        params![line_id],
        map_budget_line,
    )?;
    let budget = recalculate(&tx, user_id, budget_id)?;
    tx.commit()?;
    Ok((line, budget))
}

pub fn remove_line(conn: &mut Connection, user_id: i64, line_id: i64) -> Result<Budget> {
    let tx = begin(conn)?;
    let budget_id: i64 = tx
        .query_row(
            "SELECT l.budget_id FROM budget_lines l JOIN budgets b ON l.budget_id=b.id
             WHERE l.id=?1 AND b.user_id=?2",
            params![line_id, user_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or(LedgerError::not_found("budget line", line_id))?;
    ensure_editable(&find_budget(&tx, user_id, budget_id)?)?;
    tx.execute("DELETE FROM budget_lines WHERE id=?1", params![line_id])?;
    let budget = recalculate(&tx, user_id, budget_id)?;
    tx.commit()?;
    Ok(budget)
}

pub fn list_lines(conn: &Connection, user_id: i64, budget_id: i64) -> Result<Vec<BudgetLine>> {
    find_budget(conn, user_id, budget_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_LINE_COLS} FROM budget_lines WHERE budget_id=?1 ORDER BY kind, id"
    ))?;
    let rows = stmt.query_map(params![budget_id], map_budget_line)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Recomputes the summary: planned expenses are items plus one-offs,
/// unallocated is income minus planned expenses.
pub fn recalculate(conn: &Connection, user_id: i64, budget_id: i64) -> Result<Budget> {
    let lines = list_lines(conn, user_id, budget_id)?;
    let total = |kinds: &[BudgetLineKind]| -> Decimal {
        lines
            .iter()
            .filter(|l| kinds.contains(&l.kind))
            .map(|l| l.amount)
            .sum()
    };
    let expenses = total(&[BudgetLineKind::Item, BudgetLineKind::OneOff]);
    let income = total(&[BudgetLineKind::Income]);
    conn.execute(
        "UPDATE budgets SET total_planned_expenses=?1, total_income=?2, unallocated=?3
         WHERE id=?4",
        params![money(expenses), money(income), money(income - expenses), budget_id],
    )?;
    tracing::debug!(budget = budget_id, %expenses, %income, "budget summary recalculated");
    find_budget(conn, user_id, budget_id)
}
