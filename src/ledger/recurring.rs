// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use super::transactions::{insert, Insert};
use super::{
    apply, begin, ensure_category, find_account, find_recurring, find_transaction,
    map_recurring, AggregateRef, RECURRING_COLS,
};
use crate::error::{LedgerError, Result};
use crate::models::{AmountType, Frequency, RecurringTransaction, Transaction, TransactionType};
use crate::recurrence::advance;
use crate::utils::{check_amount, opt_money};

#[derive(Debug, Clone)]
pub struct NewRecurring {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub transaction_type: TransactionType,
    pub amount_type: AmountType,
    pub amount: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub frequency: Frequency,
    pub day_of_month: Option<u32>,
    pub day_of_week: Option<u32>,
    pub next_occurrence: Option<NaiveDate>,
}

fn validate(input: &NewRecurring) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    if let Some(a) = input.amount {
        check_amount("amount", a)?;
    }
    if let Some(a) = input.amount_max {
        check_amount("amount_max", a)?;
    }
    match input.amount_type {
        AmountType::Fixed if input.amount.is_none() => {
            return Err(LedgerError::validation(
                "amount",
                "a fixed template needs an amount",
            ));
        }
        AmountType::Variable if input.amount.is_none() && input.amount_max.is_none() => {
            return Err(LedgerError::validation(
                "amount_max",
                "a variable template needs an amount or a ceiling",
            ));
        }
        _ => {}
    }
    match input.frequency {
        Frequency::Monthly => match input.day_of_month {
            Some(1..=31) => {}
            _ => {
                return Err(LedgerError::validation(
                    "day_of_month",
                    "monthly templates need a day between 1 and 31",
                ));
            }
        },
        Frequency::Weekly => match input.day_of_week {
            Some(0..=6) => {}
            _ => {
                return Err(LedgerError::validation(
                    "day_of_week",
                    "weekly templates need a day between 0 (Sunday) and 6",
                ));
            }
        },
        Frequency::Yearly => {}
    }
    Ok(())
}

pub fn create_recurring(
    conn: &mut Connection,
    user_id: i64,
    input: NewRecurring,
) -> Result<RecurringTransaction> {
    validate(&input)?;
    let tx = begin(conn)?;
    find_account(&tx, user_id, input.account_id)?;
    if let Some(cat) = input.category_id {
        ensure_category(&tx, user_id, cat)?;
    }
    tx.execute(
        "INSERT INTO recurring_transactions(user_id, account_id, category_id, name,
             transaction_type, amount_type, amount, amount_max, frequency, day_of_month,
             day_of_week, next_occurrence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            user_id,
            input.account_id,
            input.category_id,
            input.name.trim(),
            input.transaction_type,
            input.amount_type,
            opt_money(input.amount),
            opt_money(input.amount_max),
            input.frequency,
            input.day_of_month,
            input.day_of_week,
            input.next_occurrence
        ],
    )?;
    let created = find_recurring(&tx, user_id, tx.last_insert_rowid())?;
    tx.commit()?;
    tracing::info!(id = created.id, name = %created.name, "recurring template created");
    Ok(created)
}

pub fn get_recurring(conn: &Connection, user_id: i64, id: i64) -> Result<RecurringTransaction> {
    find_recurring(conn, user_id, id)
}

pub fn list_recurring(conn: &Connection, user_id: i64) -> Result<Vec<RecurringTransaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RECURRING_COLS} FROM recurring_transactions WHERE user_id=?1 ORDER BY name, id"
    ))?;
    let rows = stmt.query_map(params![user_id], map_recurring)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn set_active(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    active: bool,
) -> Result<RecurringTransaction> {
    let tx = begin(conn)?;
    find_recurring(&tx, user_id, id)?;
    tx.execute(
        "UPDATE recurring_transactions SET is_active=?1 WHERE id=?2",
        params![active, id],
    )?;
    let updated = find_recurring(&tx, user_id, id)?;
    tx.commit()?;
    Ok(updated)
}

fn pending_occurrence(template: &RecurringTransaction) -> Result<NaiveDate> {
    template.next_occurrence.ok_or_else(|| {
        LedgerError::validation(
            "next_occurrence",
            format!("recurring transaction {} has no pending occurrence", template.id),
        )
    })
}

/// Moves the template's cursor past `consumed`.
fn advance_cursor(
    conn: &Connection,
    template: &RecurringTransaction,
    consumed: NaiveDate,
) -> Result<NaiveDate> {
    let next = advance(consumed, template.frequency, template.day_of_month);
    conn.execute(
        "UPDATE recurring_transactions SET next_occurrence=?1, last_occurrence=?2 WHERE id=?3",
        params![next, consumed, template.id],
    )?;
    Ok(next)
}

/// Books the template's pending occurrence as a real transaction.
///
/// Variable templates take `amount` when given, otherwise their amount or
/// ceiling. Returns the new transaction and the advanced template.
pub fn generate_instance(
    conn: &mut Connection,
    user_id: i64,
    template_id: i64,
    amount: Option<Decimal>,
) -> Result<(Transaction, RecurringTransaction)> {
    let amount = amount.map(|a| check_amount("amount", a)).transpose()?;
    let tx = begin(conn)?;
    let template = find_recurring(&tx, user_id, template_id)?;
    let due = pending_occurrence(&template)?;
    let amount = match (template.amount_type, amount) {
        (AmountType::Variable, Some(a)) => a,
        _ => template.amount.or(template.amount_max).ok_or_else(|| {
            LedgerError::validation("amount", "template has no amount to book")
        })?,
    };
    find_account(&tx, user_id, template.account_id)?;

    let id = insert(
        &tx,
        &Insert {
            account_id: template.account_id,
            category_id: template.category_id,
            date: due,
            description: &template.name,
            amount,
            transaction_type: template.transaction_type,
            transfer_pair_id: None,
            recurring_transaction_id: Some(template.id),
        },
    )?;
    apply(
        &tx,
        AggregateRef::Account(template.account_id),
        template.transaction_type.signed(amount),
    )?;
    let next = advance_cursor(&tx, &template, due)?;
    let created = find_transaction(&tx, user_id, id)?;
    let template = find_recurring(&tx, user_id, template_id)?;
    tx.commit()?;
    tracing::info!(
        template = template_id,
        transaction = id,
        %due,
        %next,
        "recurring instance generated"
    );
    Ok((created, template))
}

/// Advances the cursor without booking anything.
pub fn skip_occurrence(
    conn: &mut Connection,
    user_id: i64,
    template_id: i64,
) -> Result<RecurringTransaction> {
    let tx = begin(conn)?;
    let template = find_recurring(&tx, user_id, template_id)?;
    let due = pending_occurrence(&template)?;
    let next = advance_cursor(&tx, &template, due)?;
    let template = find_recurring(&tx, user_id, template_id)?;
    tx.commit()?;
    tracing::info!(template = template_id, skipped = %due, %next, "recurring occurrence skipped");
    Ok(template)
}
