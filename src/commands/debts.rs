// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::ledger::debts::{
    add_payment, create_debt, list_debts, list_payments, remove_payment, set_debt_active,
    total_outstanding, update_payment, NewDebt, NewPayment, PaymentUpdate,
};
use crate::utils::{
    amount_arg, arg, date_or_today, id_arg, maybe_print_json, money, opt_amount_arg, opt_arg,
    opt_date_arg, opt_money, parse_decimal, pretty_table,
};

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewDebt {
                name: arg(sub, "name")?.to_string(),
                original_amount: amount_arg(sub, "amount")?,
                current_balance: opt_arg(sub, "balance").map(parse_decimal).transpose()?,
                minimum_payment: parse_decimal(arg(sub, "minimum")?)?,
                fixed_payment: opt_amount_arg(sub, "fixed")?,
                interest_rate: opt_arg(sub, "rate").map(parse_decimal).transpose()?,
            };
            let debt = create_debt(conn, user_id, input)?;
            println!(
                "Added debt '{}' (id {}) with balance {}",
                debt.name,
                debt.id,
                money(debt.current_balance)
            );
        }
        Some(("list", sub)) => {
            let debts = list_debts(conn, user_id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &debts)? {
                return Ok(());
            }
            let data = debts
                .iter()
                .map(|d| {
                    vec![
                        d.id.to_string(),
                        d.name.clone(),
                        money(d.original_amount),
                        money(d.current_balance),
                        money(d.minimum_payment),
                        opt_money(d.fixed_payment).unwrap_or_default(),
                        d.interest_rate.map(|r| format!("{}%", r)).unwrap_or_default(),
                        if d.is_active { "active" } else { "closed" }.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Id", "Name", "Original", "Balance", "Minimum", "Fixed", "Rate", "Status"],
                    data
                )
            );
            println!("Total outstanding: {}", money(total_outstanding(conn, user_id)?));
        }
        Some(("pay", sub)) => {
            let input = NewPayment {
                date: date_or_today(sub, "date")?,
                amount: amount_arg(sub, "amount")?,
                principal: opt_arg(sub, "principal").map(parse_decimal).transpose()?,
                interest: opt_arg(sub, "interest").map(parse_decimal).transpose()?,
                note: opt_arg(sub, "note").map(str::to_string),
            };
            let (payment, debt) = add_payment(conn, user_id, id_arg(sub, "debt")?, input)?;
            println!(
                "Paid {} towards '{}' (payment {}); balance now {}",
                money(payment.amount),
                debt.name,
                payment.id,
                money(debt.current_balance)
            );
        }
        Some(("edit-payment", sub)) => {
            let update = PaymentUpdate {
                date: opt_date_arg(sub, "date")?,
                amount: opt_amount_arg(sub, "amount")?,
                principal: opt_arg(sub, "principal").map(parse_decimal).transpose()?,
                interest: opt_arg(sub, "interest").map(parse_decimal).transpose()?,
                note: opt_arg(sub, "note").map(str::to_string),
            };
            let (payment, debt) = update_payment(conn, user_id, id_arg(sub, "id")?, update)?;
            println!(
                "Updated payment {}; '{}' balance now {}",
                payment.id,
                debt.name,
                money(debt.current_balance)
            );
        }
        Some(("rm-payment", sub)) => {
            let id = id_arg(sub, "id")?;
            let debt = remove_payment(conn, user_id, id)?;
            println!(
                "Removed payment {}; '{}' balance now {}",
                id,
                debt.name,
                money(debt.current_balance)
            );
        }
        Some(("payments", sub)) => {
            let payments = list_payments(conn, user_id, id_arg(sub, "debt")?)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payments)? {
                return Ok(());
            }
            let data = payments
                .into_iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.date.to_string(),
                        money(p.amount),
                        opt_money(p.principal).unwrap_or_default(),
                        opt_money(p.interest).unwrap_or_default(),
                        p.note.unwrap_or_default(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "Date", "Amount", "Principal", "Interest", "Note"], data)
            );
        }
        Some(("close", sub)) => {
            let debt = set_debt_active(conn, user_id, id_arg(sub, "id")?, false)?;
            println!("Closed debt '{}'", debt.name);
        }
        Some(("reopen", sub)) => {
            let debt = set_debt_active(conn, user_id, id_arg(sub, "id")?, true)?;
            println!("Reopened debt '{}'", debt.name);
        }
        _ => {}
    }
    Ok(())
}
