// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    apply, begin, ensure_category, find_account, find_transaction, map_transaction,
    AggregateRef, TRANSACTION_COLS,
};
use crate::error::{LedgerError, Result};
use crate::models::{Transaction, TransactionType};
use crate::utils::{check_amount, money};

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

/// Field-wise amendment; `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<i64>,
    pub month: Option<String>,
    pub limit: Option<usize>,
}

/// Row written by every creation path.
pub(crate) struct Insert<'a> {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: &'a str,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub transfer_pair_id: Option<&'a str>,
    pub recurring_transaction_id: Option<i64>,
}

pub(crate) fn insert(conn: &Connection, row: &Insert<'_>) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions(account_id, category_id, date, description, amount,
                                  transaction_type, transfer_pair_id, is_recurring_instance,
                                  recurring_transaction_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            row.account_id,
            row.category_id,
            row.date,
            row.description,
            money(row.amount),
            row.transaction_type,
            row.transfer_pair_id,
            row.recurring_transaction_id.is_some(),
            row.recurring_transaction_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn create_transaction(
    conn: &mut Connection,
    user_id: i64,
    input: NewTransaction,
) -> Result<Transaction> {
    let amount = check_amount("amount", input.amount)?;
    let tx = begin(conn)?;
    find_account(&tx, user_id, input.account_id)?;
    if let Some(cat) = input.category_id {
        ensure_category(&tx, user_id, cat)?;
    }
    let id = insert(
        &tx,
        &Insert {
            account_id: input.account_id,
            category_id: input.category_id,
            date: input.date,
            description: input.description.trim(),
            amount,
            transaction_type: input.transaction_type,
            transfer_pair_id: None,
            recurring_transaction_id: None,
        },
    )?;
    apply(
        &tx,
        AggregateRef::Account(input.account_id),
        input.transaction_type.signed(amount),
    )?;
    let created = find_transaction(&tx, user_id, id)?;
    tx.commit()?;
    tracing::info!(id, account = input.account_id, "transaction created");
    Ok(created)
}

/// Moves money between two of the user's accounts.
///
/// Returns the (debit, credit) legs, which share one pair id.
pub fn create_transfer(
    conn: &mut Connection,
    user_id: i64,
    input: NewTransfer,
) -> Result<(Transaction, Transaction)> {
    let amount = check_amount("amount", input.amount)?;
    if input.from_account_id == input.to_account_id {
        return Err(LedgerError::validation(
            "to_account_id",
            "transfer source and destination must differ",
        ));
    }
    let tx = begin(conn)?;
    let from = find_account(&tx, user_id, input.from_account_id)?;
    let to = find_account(&tx, user_id, input.to_account_id)?;
    let pair = Uuid::new_v4().to_string();
    let description = match input.description.trim() {
        "" => format!("Transfer {} -> {}", from.name, to.name),
        d => d.to_string(),
    };

    let leg = |account_id: i64, kind: TransactionType| -> Result<Transaction> {
        let id = insert(
            &tx,
            &Insert {
                account_id,
                category_id: None,
                date: input.date,
                description: &description,
                amount,
                transaction_type: kind,
                transfer_pair_id: Some(&pair),
                recurring_transaction_id: None,
            },
        )?;
        apply(&tx, AggregateRef::Account(account_id), kind.signed(amount))?;
        find_transaction(&tx, user_id, id)
    };
    let debit = leg(from.id, TransactionType::Debit)?;
    let credit = leg(to.id, TransactionType::Credit)?;
    tx.commit()?;
    tracing::info!(%pair, from = from.id, to = to.id, amount = %amount, "transfer created");
    Ok((debit, credit))
}

fn sibling_leg(conn: &Connection, leg: &Transaction) -> Result<Option<Transaction>> {
    let Some(pair) = leg.transfer_pair_id.as_deref() else {
        return Ok(None);
    };
    Ok(conn
        .query_row(
            &format!(
                "SELECT {TRANSACTION_COLS} FROM transactions t
                 WHERE t.transfer_pair_id=?1 AND t.id<>?2"
            ),
            params![pair, leg.id],
            map_transaction,
        )
        .optional()?)
}

/// Amends a transaction, reversing and reapplying its balance effect when
/// that effect changes. Amount changes on a transfer leg carry to its sibling.
pub fn update_transaction(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    update: TransactionUpdate,
) -> Result<Transaction> {
    let new_amount = update
        .amount
        .map(|a| check_amount("amount", a))
        .transpose()?;
    let tx = begin(conn)?;
    let old = find_transaction(&tx, user_id, id)?;
    if old.is_transfer_leg() {
        if update.transaction_type.is_some_and(|t| t != old.transaction_type) {
            return Err(LedgerError::validation(
                "transaction_type",
                "cannot change the direction of a transfer leg",
            ));
        }
        if update.account_id.is_some_and(|a| a != old.account_id) {
            return Err(LedgerError::validation(
                "account_id",
                "cannot move a transfer leg to another account",
            ));
        }
    }
    if let Some(account_id) = update.account_id {
        find_account(&tx, user_id, account_id)?;
    }
    if let Some(cat) = update.category_id {
        ensure_category(&tx, user_id, cat)?;
    }

    let account_id = update.account_id.unwrap_or(old.account_id);
    let amount = new_amount.unwrap_or(old.amount);
    let kind = update.transaction_type.unwrap_or(old.transaction_type);
    tx.execute(
        "UPDATE transactions SET account_id=?1, category_id=?2, date=?3, description=?4,
                amount=?5, transaction_type=?6
         WHERE id=?7",
        params![
            account_id,
            update.category_id.or(old.category_id),
            update.date.unwrap_or(old.date),
            update
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or(&old.description),
            money(amount),
            kind,
            id
        ],
    )?;

    if (account_id, kind.signed(amount)) != (old.account_id, old.signed_amount()) {
        apply(&tx, AggregateRef::Account(old.account_id), -old.signed_amount())?;
        apply(&tx, AggregateRef::Account(account_id), kind.signed(amount))?;
    }

    if amount != old.amount {
        if let Some(sibling) = sibling_leg(&tx, &old)? {
            tx.execute(
                "UPDATE transactions SET amount=?1 WHERE id=?2",
                params![money(amount), sibling.id],
            )?;
            let target = AggregateRef::Account(sibling.account_id);
            apply(&tx, target, -sibling.signed_amount())?;
            apply(&tx, target, sibling.transaction_type.signed(amount))?;
        }
    }

    let updated = find_transaction(&tx, user_id, id)?;
    tx.commit()?;
    tracing::info!(id, "transaction updated");
    Ok(updated)
}

/// Deletes a transaction (both legs for a transfer) and reverses its effect.
///
/// Returns the ids of the removed rows.
pub fn delete_transaction(conn: &mut Connection, user_id: i64, id: i64) -> Result<Vec<i64>> {
    let tx = begin(conn)?;
    let leg = find_transaction(&tx, user_id, id)?;
    let mut removed = vec![leg.clone()];
    if let Some(sibling) = sibling_leg(&tx, &leg)? {
        removed.push(sibling);
    }
    for row in &removed {
        tx.execute("DELETE FROM transactions WHERE id=?1", params![row.id])?;
        apply(&tx, AggregateRef::Account(row.account_id), -row.signed_amount())?;
    }
    tx.commit()?;
    let ids: Vec<i64> = removed.iter().map(|t| t.id).collect();
    tracing::info!(?ids, "transaction deleted");
    Ok(ids)
}

pub fn get_transaction(conn: &Connection, user_id: i64, id: i64) -> Result<Transaction> {
    find_transaction(conn, user_id, id)
}

pub fn list_transactions(
    conn: &Connection,
    user_id: i64,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>> {
    let mut sql = format!(
        "SELECT {TRANSACTION_COLS} FROM transactions t JOIN accounts a ON t.account_id=a.id
         WHERE a.user_id=?"
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];
    if let Some(account_id) = filter.account_id {
        sql.push_str(" AND t.account_id=?");
        params_vec.push(Box::new(account_id));
    }
    if let Some(month) = &filter.month {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(Box::new(month.clone()));
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Box::new(limit as i64));
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(params_vec.iter().map(|p| p.as_ref())),
        map_transaction,
    )?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
