// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::ledger::accounts::{create_account, delete_account, list_accounts, NewAccount};
use crate::ledger::find_account;
use crate::models::Account;
use crate::utils::{
    arg, get_currency, id_arg, maybe_print_json, money, opt_arg, opt_money, parse_decimal,
    pretty_table,
};

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewAccount {
                name: arg(sub, "name")?.to_string(),
                classification: arg(sub, "classification")?.parse()?,
                account_type: arg(sub, "type")?.parse()?,
                opening_balance: parse_decimal(arg(sub, "opening")?)?,
                credit_limit: opt_arg(sub, "credit-limit").map(parse_decimal).transpose()?,
            };
            let account = create_account(conn, user_id, input)?;
            println!(
                "Added account '{}' (id {}, {}, {}) with balance {}",
                account.name,
                account.id,
                account.classification,
                account.account_type,
                money(account.current_balance)
            );
        }
        Some(("list", sub)) => {
            let accounts = list_accounts(conn, user_id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                return Ok(());
            }
            let ccy = get_currency(conn)?;
            println!("{}", account_table(&accounts, &ccy));
        }
        Some(("show", sub)) => {
            let account = find_account(conn, user_id, id_arg(sub, "id")?)?;
            let ccy = get_currency(conn)?;
            println!("{}", account_table(std::slice::from_ref(&account), &ccy));
        }
        Some(("rm", sub)) => {
            let id = id_arg(sub, "id")?;
            delete_account(conn, user_id, id)?;
            println!("Removed account {} and its transactions", id);
        }
        _ => {}
    }
    Ok(())
}

fn account_table(accounts: &[Account], ccy: &str) -> comfy_table::Table {
    let data = accounts
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.classification.to_string(),
                a.account_type.to_string(),
                money(a.opening_balance),
                format!("{} {}", money(a.current_balance), ccy),
                opt_money(a.credit_limit).unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &["Id", "Name", "Class", "Type", "Opening", "Balance", "Limit"],
        data,
    )
}
