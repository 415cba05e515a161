// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

use crate::ledger::budgets::{
    add_line, create_budget, get_budget, list_budgets, list_lines, remove_line, set_status,
    NewBudgetLine,
};
use crate::models::{Budget, BudgetLineKind, BudgetStatus};
use crate::utils::{
    amount_arg, arg, id_arg, maybe_print_json, money, opt_date_arg, opt_id_arg, parse_month,
    pretty_table,
};

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let budget = create_budget(conn, user_id, &month)?;
            println!("Created draft budget {} for {}", budget.id, budget.month);
        }
        Some(("activate", sub)) => {
            let budget = set_status(conn, user_id, id_arg(sub, "id")?, BudgetStatus::Active)?;
            println!("Budget {} for {} is now active", budget.id, budget.month);
        }
        Some(("close", sub)) => {
            let budget = set_status(conn, user_id, id_arg(sub, "id")?, BudgetStatus::Closed)?;
            println!("Closed budget {} for {}", budget.id, budget.month);
        }
        Some(("item", sub)) => add(conn, user_id, sub, BudgetLineKind::Item)?,
        Some(("income", sub)) => add(conn, user_id, sub, BudgetLineKind::Income)?,
        Some(("one-off", sub)) => add(conn, user_id, sub, BudgetLineKind::OneOff)?,
        Some(("rm-line", sub)) => {
            let budget = remove_line(conn, user_id, id_arg(sub, "id")?)?;
            print_summary(&budget);
        }
        Some(("show", sub)) => show(conn, user_id, sub)?,
        Some(("list", sub)) => {
            let budgets = list_budgets(conn, user_id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &budgets)? {
                return Ok(());
            }
            let data = budgets
                .iter()
                .map(|b| {
                    vec![
                        b.id.to_string(),
                        b.month.clone(),
                        b.status.to_string(),
                        money(b.total_income),
                        money(b.total_planned_expenses),
                        money(b.unallocated),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["Id", "Month", "Status", "Income", "Planned", "Unallocated"],
                    data
                )
            );
        }
        _ => {}
    }
    Ok(())
}

fn add(
    conn: &mut Connection,
    user_id: i64,
    sub: &clap::ArgMatches,
    kind: BudgetLineKind,
) -> Result<()> {
    // only one-offs carry a date and only expense lines a category
    let date = match kind {
        BudgetLineKind::OneOff => opt_date_arg(sub, "date")?,
        _ => None,
    };
    let category_id = match kind {
        BudgetLineKind::Item => opt_id_arg(sub, "category")?,
        _ => None,
    };
    let input = NewBudgetLine {
        kind,
        name: arg(sub, "name")?.to_string(),
        amount: amount_arg(sub, "amount")?,
        category_id,
        date,
    };
    let (line, budget) = add_line(conn, user_id, id_arg(sub, "budget")?, input)?;
    println!("Added {} '{}' ({})", line.kind, line.name, money(line.amount));
    print_summary(&budget);
    Ok(())
}

fn print_summary(b: &Budget) {
    println!(
        "Budget {} [{}]: income {}, planned {}, unallocated {}",
        b.month,
        b.status,
        money(b.total_income),
        money(b.total_planned_expenses),
        money(b.unallocated)
    );
}

fn show(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_arg(sub, "id")?;
    let budget = get_budget(conn, user_id, id)?;
    let lines = list_lines(conn, user_id, id)?;
    let payload = json!({ "budget": &budget, "lines": &lines });
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payload)? {
        return Ok(());
    }
    let data = lines
        .into_iter()
        .map(|l| {
            vec![
                l.id.to_string(),
                l.kind.to_string(),
                l.name,
                money(l.amount),
                l.category_id.map(|c| c.to_string()).unwrap_or_default(),
                l.date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Kind", "Name", "Amount", "Category", "Date"], data)
    );
    print_summary(&budget);
    Ok(())
}
