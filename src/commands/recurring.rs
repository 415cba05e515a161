// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::ledger::recurring::{
    create_recurring, generate_instance, list_recurring, set_active, skip_occurrence,
    NewRecurring,
};
use crate::models::{AmountType, RecurringTransaction};
use crate::utils::{
    arg, id_arg, maybe_print_json, money, opt_amount_arg, opt_arg, opt_date_arg, opt_id_arg,
    opt_money, pretty_table,
};

fn opt_day(m: &clap::ArgMatches, name: &str) -> Result<Option<u32>> {
    opt_arg(m, name)
        .map(|raw| {
            raw.parse::<u32>()
                .with_context(|| format!("Invalid day '{}' for --{}", raw, name))
        })
        .transpose()
}

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let amount_type = if sub.get_flag("variable") {
                AmountType::Variable
            } else {
                AmountType::Fixed
            };
            let input = NewRecurring {
                account_id: id_arg(sub, "account")?,
                category_id: opt_id_arg(sub, "category")?,
                name: arg(sub, "name")?.to_string(),
                transaction_type: arg(sub, "type")?.parse()?,
                amount_type,
                amount: opt_amount_arg(sub, "amount")?,
                amount_max: opt_amount_arg(sub, "amount-max")?,
                frequency: arg(sub, "frequency")?.parse()?,
                day_of_month: opt_day(sub, "day-of-month")?,
                day_of_week: opt_day(sub, "day-of-week")?,
                next_occurrence: opt_date_arg(sub, "start")?,
            };
            let t = create_recurring(conn, user_id, input)?;
            println!("Added recurring '{}' (id {}, {})", t.name, t.id, t.frequency);
        }
        Some(("list", sub)) => {
            let items = list_recurring(conn, user_id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                return Ok(());
            }
            println!("{}", recurring_table(&items));
        }
        Some(("generate", sub)) => {
            let id = id_arg(sub, "id")?;
            let (t, template) = generate_instance(conn, user_id, id, opt_amount_arg(sub, "amount")?)?;
            println!(
                "Booked {} {} on {} (transaction {}); next occurrence {}",
                t.transaction_type,
                money(t.amount),
                t.date,
                t.id,
                next_label(&template)
            );
        }
        Some(("skip", sub)) => {
            let template = skip_occurrence(conn, user_id, id_arg(sub, "id")?)?;
            println!(
                "Skipped; '{}' next occurs {}",
                template.name,
                next_label(&template)
            );
        }
        Some(("pause", sub)) => {
            let template = set_active(conn, user_id, id_arg(sub, "id")?, false)?;
            println!("Paused '{}'", template.name);
        }
        Some(("resume", sub)) => {
            let template = set_active(conn, user_id, id_arg(sub, "id")?, true)?;
            println!("Resumed '{}'", template.name);
        }
        _ => {}
    }
    Ok(())
}

fn next_label(t: &RecurringTransaction) -> String {
    t.next_occurrence
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn recurring_table(items: &[RecurringTransaction]) -> comfy_table::Table {
    let data = items
        .iter()
        .map(|t| {
            let anchor = match (t.day_of_month, t.day_of_week) {
                (Some(d), _) => format!("day {}", d),
                (None, Some(w)) => format!("weekday {}", w),
                _ => String::new(),
            };
            vec![
                t.id.to_string(),
                t.name.clone(),
                t.transaction_type.to_string(),
                t.amount_type.to_string(),
                opt_money(t.amount).unwrap_or_default(),
                opt_money(t.amount_max).unwrap_or_default(),
                t.frequency.to_string(),
                anchor,
                next_label(t),
                if t.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &[
            "Id", "Name", "Type", "Amount type", "Amount", "Max", "Frequency", "Anchor", "Next",
            "Active",
        ],
        data,
    )
}
