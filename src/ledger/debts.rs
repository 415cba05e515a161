// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use super::{apply, begin, find_debt, map_debt, map_payment, AggregateRef, DEBT_COLS, PAYMENT_COLS};
use crate::error::{LedgerError, Result};
use crate::models::{Debt, DebtPayment};
use crate::utils::{cents, check_amount, money, opt_money};

#[derive(Debug, Clone)]
pub struct NewDebt {
    pub name: String,
    pub original_amount: Decimal,
    pub current_balance: Option<Decimal>,
    pub minimum_payment: Decimal,
    pub fixed_payment: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub note: Option<String>,
}

fn non_negative(field: &'static str, v: Option<Decimal>) -> Result<()> {
    match v {
        Some(d) if d < Decimal::ZERO => Err(LedgerError::validation(field, "must not be negative")),
        _ => Ok(()),
    }
}

fn ensure_open(debt: &Debt) -> Result<()> {
    if debt.is_active {
        Ok(())
    } else {
        Err(LedgerError::validation(
            "debt_id",
            format!("debt {} is closed", debt.id),
        ))
    }
}

pub fn create_debt(conn: &mut Connection, user_id: i64, input: NewDebt) -> Result<Debt> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    non_negative("original_amount", Some(input.original_amount))?;
    non_negative("current_balance", input.current_balance)?;
    non_negative("minimum_payment", Some(input.minimum_payment))?;
    non_negative("fixed_payment", input.fixed_payment)?;
    non_negative("interest_rate", input.interest_rate)?;
    let tx = begin(conn)?;
    tx.execute(
        "INSERT INTO debts(user_id, name, original_amount, opening_balance, current_balance,
                           minimum_payment, fixed_payment, interest_rate)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            input.name.trim(),
            money(input.original_amount),
            money(input.current_balance.unwrap_or(input.original_amount)),
            money(input.minimum_payment),
            opt_money(input.fixed_payment),
            input.interest_rate.map(|r| r.to_string())
        ],
    )?;
    let debt = find_debt(&tx, user_id, tx.last_insert_rowid())?;
    tx.commit()?;
    tracing::info!(id = debt.id, name = %debt.name, "debt created");
    Ok(debt)
}

pub fn get_debt(conn: &Connection, user_id: i64, id: i64) -> Result<Debt> {
    find_debt(conn, user_id, id)
}

pub fn list_debts(conn: &Connection, user_id: i64) -> Result<Vec<Debt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEBT_COLS} FROM debts WHERE user_id=?1 ORDER BY name, id"
    ))?;
    let rows = stmt.query_map(params![user_id], map_debt)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Closing a debt freezes it: no payments can be added or amended.
pub fn set_debt_active(conn: &mut Connection, user_id: i64, id: i64, active: bool) -> Result<Debt> {
    let tx = begin(conn)?;
    find_debt(&tx, user_id, id)?;
    tx.execute("UPDATE debts SET is_active=?1 WHERE id=?2", params![active, id])?;
    let debt = find_debt(&tx, user_id, id)?;
    tx.commit()?;
    Ok(debt)
}

fn find_payment(conn: &Connection, user_id: i64, id: i64) -> Result<DebtPayment> {
    conn.query_row(
        &format!(
            "SELECT {PAYMENT_COLS} FROM debt_payments p JOIN debts d ON p.debt_id=d.id
             WHERE p.id=?1 AND d.user_id=?2"
        ),
        params![id, user_id],
        map_payment,
    )
    .optional()?
    .ok_or(LedgerError::not_found("debt payment", id))
}

/// Records a payment; the debt balance drops by the paid amount.
pub fn add_payment(
    conn: &mut Connection,
    user_id: i64,
    debt_id: i64,
    input: NewPayment,
) -> Result<(DebtPayment, Debt)> {
    let amount = check_amount("amount", input.amount)?;
    non_negative("principal", input.principal)?;
    non_negative("interest", input.interest)?;
    let tx = begin(conn)?;
    let debt = find_debt(&tx, user_id, debt_id)?;
    ensure_open(&debt)?;
    tx.execute(
        "INSERT INTO debt_payments(debt_id, date, amount, principal, interest, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            debt_id,
            input.date,
            money(amount),
            opt_money(input.principal),
            opt_money(input.interest),
            input.note
        ],
    )?;
    let payment = find_payment(&tx, user_id, tx.last_insert_rowid())?;
    apply(&tx, AggregateRef::Debt(debt_id), -amount)?;
    let debt = find_debt(&tx, user_id, debt_id)?;
    tx.commit()?;
    tracing::info!(id = payment.id, debt = debt_id, amount = %amount, "debt payment recorded");
    Ok((payment, debt))
}

/// Amends a payment; a changed amount is reversed then reapplied.
pub fn update_payment(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    update: PaymentUpdate,
) -> Result<(DebtPayment, Debt)> {
    let new_amount = update
        .amount
        .map(|a| check_amount("amount", a))
        .transpose()?;
    non_negative("principal", update.principal)?;
    non_negative("interest", update.interest)?;
    let tx = begin(conn)?;
    let old = find_payment(&tx, user_id, id)?;
    let debt = find_debt(&tx, user_id, old.debt_id)?;
    ensure_open(&debt)?;
    let amount = new_amount.unwrap_or(old.amount);
    tx.execute(
        "UPDATE debt_payments SET date=?1, amount=?2, principal=?3, interest=?4, note=?5
         WHERE id=?6",
        params![
            update.date.unwrap_or(old.date),
            money(amount),
            opt_money(update.principal.or(old.principal)),
            opt_money(update.interest.or(old.interest)),
            update.note.or(old.note),
            id
        ],
    )?;
    if amount != old.amount {
        let target = AggregateRef::Debt(old.debt_id);
        apply(&tx, target, old.amount)?;
        apply(&tx, target, -amount)?;
    }
    let payment = find_payment(&tx, user_id, id)?;
    let debt = find_debt(&tx, user_id, old.debt_id)?;
    tx.commit()?;
    tracing::info!(id, debt = debt.id, "debt payment updated");
    Ok((payment, debt))
}

/// Deletes a payment and restores the amount to the debt.
pub fn remove_payment(conn: &mut Connection, user_id: i64, id: i64) -> Result<Debt> {
    let tx = begin(conn)?;
    let payment = find_payment(&tx, user_id, id)?;
    tx.execute("DELETE FROM debt_payments WHERE id=?1", params![id])?;
    apply(&tx, AggregateRef::Debt(payment.debt_id), payment.amount)?;
    let debt = find_debt(&tx, user_id, payment.debt_id)?;
    tx.commit()?;
    tracing::info!(id, debt = debt.id, "debt payment removed");
    Ok(debt)
}

pub fn list_payments(conn: &Connection, user_id: i64, debt_id: i64) -> Result<Vec<DebtPayment>> {
    find_debt(conn, user_id, debt_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLS} FROM debt_payments p WHERE p.debt_id=?1 ORDER BY p.date, p.id"
    ))?;
    let rows = stmt.query_map(params![debt_id], map_payment)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Sum still owed across active debts.
pub fn total_outstanding(conn: &Connection, user_id: i64) -> Result<Decimal> {
    Ok(cents(
        list_debts(conn, user_id)?
            .iter()
            .filter(|d| d.is_active)
            .map(|d| d.current_balance)
            .sum(),
    ))
}
