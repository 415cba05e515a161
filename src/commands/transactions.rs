// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::ledger::transactions::{
    create_transaction, create_transfer, delete_transaction, list_transactions,
    update_transaction, NewTransaction, NewTransfer, TransactionFilter, TransactionUpdate,
};
use crate::models::Transaction;
use crate::utils::{
    amount_arg, arg, date_or_today, id_arg, maybe_print_json, money, opt_amount_arg, opt_arg,
    opt_date_arg, opt_id_arg, parse_month, pretty_table,
};

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewTransaction {
                account_id: id_arg(sub, "account")?,
                category_id: opt_id_arg(sub, "category")?,
                date: date_or_today(sub, "date")?,
                description: opt_arg(sub, "description").unwrap_or_default().to_string(),
                amount: amount_arg(sub, "amount")?,
                transaction_type: arg(sub, "type")?.parse()?,
            };
            let t = create_transaction(conn, user_id, input)?;
            println!(
                "Recorded {} {} on {} (id {})",
                t.transaction_type,
                money(t.amount),
                t.date,
                t.id
            );
        }
        Some(("transfer", sub)) => {
            let input = NewTransfer {
                from_account_id: id_arg(sub, "from")?,
                to_account_id: id_arg(sub, "to")?,
                date: date_or_today(sub, "date")?,
                description: opt_arg(sub, "description").unwrap_or_default().to_string(),
                amount: amount_arg(sub, "amount")?,
            };
            let (debit, credit) = create_transfer(conn, user_id, input)?;
            println!(
                "Transferred {} from account {} to account {} (ids {}, {})",
                money(debit.amount),
                debit.account_id,
                credit.account_id,
                debit.id,
                credit.id
            );
        }
        Some(("edit", sub)) => {
            let id = id_arg(sub, "id")?;
            let update = TransactionUpdate {
                account_id: opt_id_arg(sub, "account")?,
                category_id: opt_id_arg(sub, "category")?,
                date: opt_date_arg(sub, "date")?,
                description: opt_arg(sub, "description").map(str::to_string),
                amount: opt_amount_arg(sub, "amount")?,
                transaction_type: opt_arg(sub, "type").map(str::parse).transpose()?,
            };
            let t = update_transaction(conn, user_id, id, update)?;
            println!(
                "Updated transaction {}: {} {} on {}",
                t.id,
                t.transaction_type,
                money(t.amount),
                t.date
            );
        }
        Some(("rm", sub)) => {
            let removed = delete_transaction(conn, user_id, id_arg(sub, "id")?)?;
            let ids: Vec<String> = removed.iter().map(i64::to_string).collect();
            println!("Removed transaction(s) {}", ids.join(", "));
        }
        Some(("list", sub)) => {
            let filter = TransactionFilter {
                account_id: opt_id_arg(sub, "account")?,
                month: opt_arg(sub, "month").map(parse_month).transpose()?,
                limit: sub.get_one::<usize>("limit").copied(),
            };
            let items = list_transactions(conn, user_id, &filter)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                return Ok(());
            }
            println!("{}", transaction_table(&items));
        }
        _ => {}
    }
    Ok(())
}

fn transaction_table(items: &[Transaction]) -> comfy_table::Table {
    let data = items
        .iter()
        .map(|t| {
            let mut flags = Vec::new();
            if t.is_transfer_leg() {
                flags.push("transfer");
            }
            if t.is_recurring_instance {
                flags.push("recurring");
            }
            if t.is_reviewed {
                flags.push("reviewed");
            }
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.account_id.to_string(),
                t.description.clone(),
                money(t.signed_amount()),
                t.category_id.map(|c| c.to_string()).unwrap_or_default(),
                flags.join(","),
            ]
        })
        .collect();
    pretty_table(
        &["Id", "Date", "Account", "Description", "Amount", "Category", "Flags"],
        data,
    )
}
