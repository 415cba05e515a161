// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Forward balance projection.
//!
//! Simulates a user's spending balance one calendar day at a time from
//! recurring templates, the active budget, and a trailing 90-day spending
//! baseline. Each run replaces whatever forecast rows already exist in the
//! requested range; the ledger's aggregates are only read, never written.

use chrono::{Duration, NaiveDate};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::db::decimal_at;
use crate::error::{LedgerError, Result};
use crate::ledger::accounts::list_accounts;
use crate::ledger::budgets::active_budget;
use crate::ledger::begin;
use crate::ledger::recurring::list_recurring;
use crate::models::{
    Alert, Budget, Classification, DailyTrackerEntry, ExpenseBasis, RecurringTransaction,
    ScheduledFlow, TransactionType,
};
use crate::recurrence::matches_day;
use crate::utils::{cents, days_in_month_of, money};

/// Fixed divisor of the historical baseline, however much history exists.
pub const HISTORY_WINDOW_DAYS: i64 = 90;

pub const NEGATIVE_BALANCE_ALERT: &str = "negative_balance";

/// Everything the simulation reads, gathered up front.
#[derive(Debug, Clone)]
pub struct ProjectionInputs {
    pub templates: Vec<RecurringTransaction>,
    pub active_budget: Option<Budget>,
    pub starting_balance: Decimal,
    pub recent_debits: Decimal,
}

impl ProjectionInputs {
    pub fn gather(conn: &Connection, user_id: i64, start: NaiveDate) -> Result<Self> {
        let templates = list_recurring(conn, user_id)?
            .into_iter()
            .filter(|t| t.is_active)
            .collect();
        let starting_balance = list_accounts(conn, user_id)?
            .iter()
            .filter(|a| a.classification == Classification::Spending)
            .map(|a| a.current_balance)
            .sum();

        let since = start - Duration::days(HISTORY_WINDOW_DAYS);
        let mut stmt = conn.prepare(
            "SELECT t.amount FROM transactions t JOIN accounts a ON t.account_id=a.id
             WHERE a.user_id=?1 AND t.transaction_type='debit' AND t.date>=?2 AND t.date<?3",
        )?;
        let rows = stmt.query_map(params![user_id, since, start], |r| decimal_at(r, 0))?;
        let mut recent_debits = Decimal::ZERO;
        for amount in rows {
            recent_debits += amount?;
        }

        Ok(ProjectionInputs {
            templates,
            active_budget: active_budget(conn, user_id)?,
            starting_balance,
            recent_debits,
        })
    }

    /// Average daily spend over the trailing window.
    pub fn baseline(&self) -> Decimal {
        cents(self.recent_debits / Decimal::from(HISTORY_WINDOW_DAYS))
    }
}

fn scheduled(
    templates: &[RecurringTransaction],
    kind: TransactionType,
    date: NaiveDate,
) -> Vec<ScheduledFlow> {
    templates
        .iter()
        .filter(|t| t.transaction_type == kind && matches_day(t, date))
        .map(|t| ScheduledFlow {
            recurring_id: t.id,
            name: t.name.clone(),
            amount: t.projected_amount(),
        })
        .collect()
}

/// Runs the day-by-day fold over `[start, end]`. Pure: no storage access.
pub fn simulate(
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    inputs: &ProjectionInputs,
) -> Vec<DailyTrackerEntry> {
    let predicted_spend = inputs.baseline();
    let mut running = cents(inputs.starting_balance);
    let mut out = Vec::new();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let income_details = scheduled(&inputs.templates, TransactionType::Credit, date);
        let debt_details = scheduled(&inputs.templates, TransactionType::Debit, date);
        let expected_income = cents(income_details.iter().map(|f| f.amount).sum());
        let expected_debt_payments = cents(debt_details.iter().map(|f| f.amount).sum());

        let expense_details = inputs.active_budget.as_ref().map(|b| {
            let days = days_in_month_of(date);
            ExpenseBasis {
                budget_id: b.id,
                monthly_planned: b.total_planned_expenses,
                days_in_month: days,
                daily_amount: cents(b.total_planned_expenses / Decimal::from(days)),
            }
        });
        let expected_expenses = expense_details
            .as_ref()
            .map(|e| e.daily_amount)
            .unwrap_or(Decimal::ZERO);

        running = running + expected_income - expected_expenses - expected_debt_payments
            - predicted_spend;

        let alerts = (running < Decimal::ZERO).then(|| {
            vec![Alert {
                kind: NEGATIVE_BALANCE_ALERT.to_string(),
                message: format!("Projected balance falls to {} on {}", money(running), date),
                balance: running,
            }]
        });
        tracing::debug!(%date, income = %expected_income, balance = %running, "projected day");

        out.push(DailyTrackerEntry {
            user_id,
            date,
            expected_income,
            expected_debt_payments,
            expected_expenses,
            predicted_spend,
            running_balance: running,
            has_alerts: alerts.is_some(),
            alerts,
            is_payday: expected_income > Decimal::ZERO,
            income_details,
            debt_details,
            expense_details,
        });
    }
    out
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if end < start {
        return Err(LedgerError::validation(
            "end_date",
            format!("{} is before start date {}", end, start),
        ));
    }
    Ok(())
}

/// Regenerates the forecast for `[start, end]`, replacing any rows already there.
pub fn generate(
    conn: &mut Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyTrackerEntry>> {
    check_range(start, end)?;
    let tx = begin(conn)?;
    let removed = delete_range(&tx, user_id, start, end)?;
    let inputs = ProjectionInputs::gather(&tx, user_id, start)?;
    let entries = simulate(user_id, start, end, &inputs);

    {
        let mut insert = tx.prepare(
            "INSERT INTO daily_tracker_entries(user_id, date, expected_income,
                 expected_debt_payments, expected_expenses, predicted_spend, running_balance,
                 has_alerts, alerts, is_payday, income_details, debt_details, expense_details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;
        for e in &entries {
            insert.execute(params![
                user_id,
                e.date,
                money(e.expected_income),
                money(e.expected_debt_payments),
                money(e.expected_expenses),
                money(e.predicted_spend),
                money(e.running_balance),
                e.has_alerts,
                e.alerts.as_ref().map(serde_json::to_string).transpose()?,
                e.is_payday,
                serde_json::to_string(&e.income_details)?,
                serde_json::to_string(&e.debt_details)?,
                e.expense_details
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
            ])?;
        }
    }
    tx.commit()?;

    let alert_days = entries.iter().filter(|e| e.has_alerts).count();
    tracing::info!(
        user_id,
        %start,
        %end,
        replaced = removed,
        entries = entries.len(),
        alert_days,
        "forecast generated"
    );
    Ok(entries)
}

fn delete_range(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM daily_tracker_entries WHERE user_id=?1 AND date>=?2 AND date<=?3",
        params![user_id, start, end],
    )?)
}

/// Deletes forecast rows in `[start, end]` without regenerating them.
pub fn clear_range(
    conn: &mut Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize> {
    check_range(start, end)?;
    let tx = begin(conn)?;
    let removed = delete_range(&tx, user_id, start, end)?;
    tx.commit()?;
    tracing::info!(user_id, %start, %end, removed, "forecast cleared");
    Ok(removed)
}

fn json_at<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn opt_json_at<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

const ENTRY_COLS: &str = "user_id, date, expected_income, expected_debt_payments, \
     expected_expenses, predicted_spend, running_balance, has_alerts, alerts, is_payday, \
     income_details, debt_details, expense_details";

fn map_entry(r: &Row<'_>) -> rusqlite::Result<DailyTrackerEntry> {
    Ok(DailyTrackerEntry {
        user_id: r.get(0)?,
        date: r.get(1)?,
        expected_income: decimal_at(r, 2)?,
        expected_debt_payments: decimal_at(r, 3)?,
        expected_expenses: decimal_at(r, 4)?,
        predicted_spend: decimal_at(r, 5)?,
        running_balance: decimal_at(r, 6)?,
        has_alerts: r.get(7)?,
        alerts: opt_json_at(r, 8)?,
        is_payday: r.get(9)?,
        income_details: json_at(r, 10)?,
        debt_details: json_at(r, 11)?,
        expense_details: opt_json_at(r, 12)?,
    })
}

pub fn get_range(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyTrackerEntry>> {
    check_range(start, end)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLS} FROM daily_tracker_entries
         WHERE user_id=?1 AND date>=?2 AND date<=?3 ORDER BY date"
    ))?;
    let rows = stmt.query_map(params![user_id, start, end], map_entry)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_by_date(
    conn: &Connection,
    user_id: i64,
    date: NaiveDate,
) -> Result<Option<DailyTrackerEntry>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {ENTRY_COLS} FROM daily_tracker_entries WHERE user_id=?1 AND date=?2"
            ),
            params![user_id, date],
            map_entry,
        )
        .optional()?)
}
