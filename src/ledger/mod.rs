// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-consistency ledger.
//!
//! Every operation that creates, amends, or removes a balance-affecting
//! record runs inside a single immediate SQLite transaction: the record
//! write and the aggregate write commit together, and the write lock taken
//! at BEGIN serializes concurrent read-modify-write cycles on aggregates.

pub mod accounts;
pub mod audit;
pub mod balance;
pub mod budgets;
pub mod categories;
pub mod debts;
pub mod recurring;
pub mod savings;
pub mod transactions;

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use crate::db::{decimal_at, opt_decimal_at};
use crate::error::{LedgerError, Result};
use crate::models::{
    Account, Budget, BudgetLine, Debt, DebtPayment, RecurringTransaction, SavingsContribution,
    SavingsGoal, Transaction,
};

pub use balance::{apply, AggregateRef};

/// Opens the write transaction every ledger operation runs in.
pub(crate) fn begin(conn: &mut Connection) -> Result<rusqlite::Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

pub(crate) const ACCOUNT_COLS: &str = "id, user_id, name, classification, account_type, \
     opening_balance, current_balance, credit_limit";

pub(crate) fn map_account(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        classification: r.get(3)?,
        account_type: r.get(4)?,
        opening_balance: decimal_at(r, 5)?,
        current_balance: decimal_at(r, 6)?,
        credit_limit: opt_decimal_at(r, 7)?,
    })
}

pub(crate) const TRANSACTION_COLS: &str = "t.id, t.account_id, t.category_id, t.date, \
     t.description, t.amount, t.transaction_type, t.transfer_pair_id, t.is_reviewed, \
     t.is_recurring_instance, t.recurring_transaction_id";

pub(crate) fn map_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        account_id: r.get(1)?,
        category_id: r.get(2)?,
        date: r.get(3)?,
        description: r.get(4)?,
        amount: decimal_at(r, 5)?,
        transaction_type: r.get(6)?,
        transfer_pair_id: r.get(7)?,
        is_reviewed: r.get(8)?,
        is_recurring_instance: r.get(9)?,
        recurring_transaction_id: r.get(10)?,
    })
}

pub(crate) const DEBT_COLS: &str = "id, user_id, name, original_amount, opening_balance, \
     current_balance, minimum_payment, fixed_payment, interest_rate, is_active";

pub(crate) fn map_debt(r: &Row<'_>) -> rusqlite::Result<Debt> {
    Ok(Debt {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        original_amount: decimal_at(r, 3)?,
        opening_balance: decimal_at(r, 4)?,
        current_balance: decimal_at(r, 5)?,
        minimum_payment: decimal_at(r, 6)?,
        fixed_payment: opt_decimal_at(r, 7)?,
        interest_rate: opt_decimal_at(r, 8)?,
        is_active: r.get(9)?,
    })
}

pub(crate) const PAYMENT_COLS: &str = "p.id, p.debt_id, p.date, p.amount, p.principal, \
     p.interest, p.note";

pub(crate) fn map_payment(r: &Row<'_>) -> rusqlite::Result<DebtPayment> {
    Ok(DebtPayment {
        id: r.get(0)?,
        debt_id: r.get(1)?,
        date: r.get(2)?,
        amount: decimal_at(r, 3)?,
        principal: opt_decimal_at(r, 4)?,
        interest: opt_decimal_at(r, 5)?,
        note: r.get(6)?,
    })
}

pub(crate) const GOAL_COLS: &str = "id, user_id, name, opening_amount, current_amount, \
     target_amount, target_date, is_completed, completed_at";

pub(crate) fn map_goal(r: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: r.get(0)?,
        user_id: r.get(1)?,
        name: r.get(2)?,
        opening_amount: decimal_at(r, 3)?,
        current_amount: decimal_at(r, 4)?,
        target_amount: opt_decimal_at(r, 5)?,
        target_date: r.get(6)?,
        is_completed: r.get(7)?,
        completed_at: r.get(8)?,
    })
}

pub(crate) const CONTRIBUTION_COLS: &str = "c.id, c.goal_id, c.date, c.amount, c.note";

pub(crate) fn map_contribution(r: &Row<'_>) -> rusqlite::Result<SavingsContribution> {
    Ok(SavingsContribution {
        id: r.get(0)?,
        goal_id: r.get(1)?,
        date: r.get(2)?,
        amount: decimal_at(r, 3)?,
        note: r.get(4)?,
    })
}

pub(crate) const RECURRING_COLS: &str = "id, user_id, account_id, category_id, name, \
     transaction_type, amount_type, amount, amount_max, frequency, day_of_month, day_of_week, \
     next_occurrence, last_occurrence, is_active";

pub(crate) fn map_recurring(r: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
    Ok(RecurringTransaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        account_id: r.get(2)?,
        category_id: r.get(3)?,
        name: r.get(4)?,
        transaction_type: r.get(5)?,
        amount_type: r.get(6)?,
        amount: opt_decimal_at(r, 7)?,
        amount_max: opt_decimal_at(r, 8)?,
        frequency: r.get(9)?,
        day_of_month: r.get(10)?,
        day_of_week: r.get(11)?,
        next_occurrence: r.get(12)?,
        last_occurrence: r.get(13)?,
        is_active: r.get(14)?,
    })
}

pub(crate) const BUDGET_COLS: &str =
    "id, user_id, month, status, total_planned_expenses, total_income, unallocated";

pub(crate) fn map_budget(r: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        user_id: r.get(1)?,
        month: r.get(2)?,
        status: r.get(3)?,
        total_planned_expenses: decimal_at(r, 4)?,
        total_income: decimal_at(r, 5)?,
        unallocated: decimal_at(r, 6)?,
    })
}

pub(crate) const BUDGET_LINE_COLS: &str = "id, budget_id, kind, name, amount, category_id, date";

pub(crate) fn map_budget_line(r: &Row<'_>) -> rusqlite::Result<BudgetLine> {
    Ok(BudgetLine {
        id: r.get(0)?,
        budget_id: r.get(1)?,
        kind: r.get(2)?,
        name: r.get(3)?,
        amount: decimal_at(r, 4)?,
        category_id: r.get(5)?,
        date: r.get(6)?,
    })
}

pub fn find_account(conn: &Connection, user_id: i64, id: i64) -> Result<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        map_account,
    )
    .optional()?
    .ok_or(LedgerError::not_found("account", id))
}

pub fn find_transaction(conn: &Connection, user_id: i64, id: i64) -> Result<Transaction> {
    conn.query_row(
        &format!(
            "SELECT {TRANSACTION_COLS} FROM transactions t JOIN accounts a ON t.account_id=a.id
             WHERE t.id=?1 AND a.user_id=?2"
        ),
        params![id, user_id],
        map_transaction,
    )
    .optional()?
    .ok_or(LedgerError::not_found("transaction", id))
}

pub fn find_debt(conn: &Connection, user_id: i64, id: i64) -> Result<Debt> {
    conn.query_row(
        &format!("SELECT {DEBT_COLS} FROM debts WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        map_debt,
    )
    .optional()?
    .ok_or(LedgerError::not_found("debt", id))
}

pub fn find_goal(conn: &Connection, user_id: i64, id: i64) -> Result<SavingsGoal> {
    conn.query_row(
        &format!("SELECT {GOAL_COLS} FROM savings_goals WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        map_goal,
    )
    .optional()?
    .ok_or(LedgerError::not_found("savings goal", id))
}

pub fn find_recurring(conn: &Connection, user_id: i64, id: i64) -> Result<RecurringTransaction> {
    conn.query_row(
        &format!("SELECT {RECURRING_COLS} FROM recurring_transactions WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        map_recurring,
    )
    .optional()?
    .ok_or(LedgerError::not_found("recurring transaction", id))
}

pub fn find_budget(conn: &Connection, user_id: i64, id: i64) -> Result<Budget> {
    conn.query_row(
        &format!("SELECT {BUDGET_COLS} FROM budgets WHERE id=?1 AND user_id=?2"),
        params![id, user_id],
        map_budget,
    )
    .optional()?
    .ok_or(LedgerError::not_found("budget", id))
}

pub fn ensure_category(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE id=?1 AND user_id=?2",
            params![id, user_id],
            |r| r.get(0),
        )
        .optional()?;
    found
        .map(|_| ())
        .ok_or(LedgerError::not_found("category", id))
}
