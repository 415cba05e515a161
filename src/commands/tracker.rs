// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::models::DailyTrackerEntry;
use crate::projection;
use crate::utils::{arg, maybe_print_json, money, parse_date, pretty_table};

fn range(sub: &clap::ArgMatches) -> Result<(NaiveDate, NaiveDate)> {
    Ok((parse_date(arg(sub, "from")?)?, parse_date(arg(sub, "to")?)?))
}

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("generate", sub)) => {
            let (start, end) = range(sub)?;
            let entries = projection::generate(conn, user_id, start, end)?;
            let alerts = entries.iter().filter(|e| e.has_alerts).count();
            let closing = entries
                .last()
                .map(|e| money(e.running_balance))
                .unwrap_or_default();
            println!(
                "Projected {} day(s) from {} to {}; closing balance {}, {} alert day(s)",
                entries.len(),
                start,
                end,
                closing,
                alerts
            );
        }
        Some(("show", sub)) => {
            let (start, end) = range(sub)?;
            let entries = projection::get_range(conn, user_id, start, end)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entries)? {
                return Ok(());
            }
            println!("{}", entry_table(&entries));
        }
        Some(("day", sub)) => {
            let date = parse_date(arg(sub, "date")?)?;
            let Some(entry) = projection::get_by_date(conn, user_id, date)? else {
                println!("No forecast for {}", date);
                return Ok(());
            };
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &entry)? {
                return Ok(());
            }
            println!("{}", entry_table(std::slice::from_ref(&entry)));
            for flow in entry.income_details.iter().chain(&entry.debt_details) {
                println!(
                    "  {} (recurring {}): {}",
                    flow.name,
                    flow.recurring_id,
                    money(flow.amount)
                );
            }
            if let Some(basis) = &entry.expense_details {
                println!(
                    "  budget {}: {} over {} days",
                    basis.budget_id,
                    money(basis.monthly_planned),
                    basis.days_in_month
                );
            }
            for alert in entry.alerts.iter().flatten() {
                println!("  ! {}", alert.message);
            }
        }
        Some(("clear", sub)) => {
            let (start, end) = range(sub)?;
            let removed = projection::clear_range(conn, user_id, start, end)?;
            println!("Cleared {} forecast day(s)", removed);
        }
        Some(("export", sub)) => {
            let (start, end) = range(sub)?;
            let path = arg(sub, "path")?;
            let written = export_csv(conn, user_id, start, end, Path::new(path))?;
            println!("Exported {} forecast day(s) to {}", written, path);
        }
        _ => {}
    }
    Ok(())
}

/// Writes stored forecast rows in `[start, end]` as CSV; returns the row count.
pub fn export_csv(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    path: &Path,
) -> Result<usize> {
    let entries = projection::get_range(conn, user_id, start, end)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    wtr.write_record([
        "date",
        "expected_income",
        "expected_expenses",
        "expected_debt_payments",
        "predicted_spend",
        "running_balance",
        "is_payday",
        "has_alerts",
    ])?;
    for e in &entries {
        wtr.write_record([
            e.date.to_string(),
            money(e.expected_income),
            money(e.expected_expenses),
            money(e.expected_debt_payments),
            money(e.predicted_spend),
            money(e.running_balance),
            e.is_payday.to_string(),
            e.has_alerts.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(entries.len())
}

fn entry_table(entries: &[DailyTrackerEntry]) -> comfy_table::Table {
    let data = entries
        .iter()
        .map(|e| {
            vec![
                e.date.to_string(),
                money(e.expected_income),
                money(e.expected_expenses),
                money(e.expected_debt_payments),
                money(e.predicted_spend),
                money(e.running_balance),
                if e.is_payday { "payday" } else { "" }.to_string(),
                if e.has_alerts { "!" } else { "" }.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["Date", "Income", "Expenses", "Debt", "Spend", "Balance", "Payday", "Alert"],
        data,
    )
}
