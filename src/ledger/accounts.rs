// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use super::{begin, find_account, map_account, AggregateRef, ACCOUNT_COLS};
use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountType, Classification, TransactionType};
use crate::utils::{cents, money, opt_money};

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub classification: Classification,
    pub account_type: AccountType,
    pub opening_balance: Decimal,
    pub credit_limit: Option<Decimal>,
}

/// Creates an account whose current balance starts at the opening balance.
pub fn create_account(conn: &mut Connection, user_id: i64, input: NewAccount) -> Result<Account> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    if let Some(limit) = input.credit_limit {
        if limit < Decimal::ZERO {
            return Err(LedgerError::validation("credit_limit", "must not be negative"));
        }
    }
    let opening = cents(input.opening_balance);
    let tx = begin(conn)?;
    let clash: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE user_id=?1 AND name=?2)",
        params![user_id, &name],
        |r| r.get(0),
    )?;
    if clash {
        return Err(LedgerError::Conflict(format!("account '{}' already exists", name)));
    }
    tx.execute(
        "INSERT INTO accounts(user_id, name, classification, account_type, opening_balance,
                              current_balance, credit_limit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)",
        params![
            user_id,
            &name,
            input.classification,
            input.account_type,
            money(opening),
            opt_money(input.credit_limit)
        ],
    )?;
    let id = tx.last_insert_rowid();
    let account = find_account(&tx, user_id, id)?;
    tx.commit()?;
    tracing::info!(id, %name, opening = %opening, "account created");
    Ok(account)
}

pub fn list_accounts(conn: &Connection, user_id: i64) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLS} FROM accounts WHERE user_id=?1 ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_account)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Removes an account and its transactions.
///
/// Transfer legs in other accounts lose their counterpart here, so they are
/// deleted and reversed as well.
pub fn delete_account(conn: &mut Connection, user_id: i64, id: i64) -> Result<()> {
    let tx = begin(conn)?;
    find_account(&tx, user_id, id)?;
    let siblings: Vec<(i64, i64, String, TransactionType)> = {
        let mut stmt = tx.prepare(
            "SELECT s.id, s.account_id, s.amount, s.transaction_type
             FROM transactions t JOIN transactions s
               ON s.transfer_pair_id=t.transfer_pair_id AND s.id<>t.id
             WHERE t.account_id=?1 AND s.account_id<>?1",
        )?;
        let rows = stmt.query_map(params![id], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    for (sibling_id, account_id, amount, kind) in siblings {
        let amount = amount
            .parse::<Decimal>()
            .map_err(|_| LedgerError::CorruptAmount { value: amount })?;
        tx.execute("DELETE FROM transactions WHERE id=?1", params![sibling_id])?;
        super::apply(&tx, AggregateRef::Account(account_id), -kind.signed(amount))?;
    }
    tx.execute("DELETE FROM transactions WHERE account_id=?1", params![id])?;
    tx.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(id, "account deleted");
    Ok(())
}
