// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::ledger::savings::{
    add_contribution, create_goal, get_goal, list_contributions, list_goals, remove_contribution,
    update_contribution, ContributionUpdate, NewContribution, NewGoal,
};
use crate::models::SavingsGoal;
use crate::utils::{
    amount_arg, arg, date_or_today, id_arg, maybe_print_json, money, opt_amount_arg, opt_arg,
    opt_date_arg, opt_money, parse_decimal, pretty_table,
};

fn progress(goal: &SavingsGoal) -> String {
    if goal.is_completed {
        return "completed".to_string();
    }
    match goal.target_amount {
        Some(t) if !t.is_zero() => {
            format!("{}%", money(goal.current_amount * Decimal::ONE_HUNDRED / t))
        }
        _ => String::new(),
    }
}

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewGoal {
                name: arg(sub, "name")?.to_string(),
                current_amount: parse_decimal(arg(sub, "current")?)?,
                target_amount: opt_amount_arg(sub, "target")?,
                target_date: opt_date_arg(sub, "target-date")?,
            };
            let goal = create_goal(conn, user_id, input)?;
            println!(
                "Added goal '{}' (id {}) starting at {}",
                goal.name,
                goal.id,
                money(goal.current_amount)
            );
        }
        Some(("list", sub)) => {
            let goals = list_goals(conn, user_id)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &goals)? {
                return Ok(());
            }
            let data = goals
                .iter()
                .map(|g| {
                    vec![
                        g.id.to_string(),
                        g.name.clone(),
                        money(g.current_amount),
                        opt_money(g.target_amount).unwrap_or_default(),
                        g.target_date.map(|d| d.to_string()).unwrap_or_default(),
                        progress(g),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "Name", "Saved", "Target", "By", "Progress"], data)
            );
        }
        Some(("contribute", sub)) => {
            let input = NewContribution {
                date: date_or_today(sub, "date")?,
                amount: amount_arg(sub, "amount")?,
                note: opt_arg(sub, "note").map(str::to_string),
            };
            let goal_id = id_arg(sub, "goal")?;
            let was_completed = get_goal(conn, user_id, goal_id)?.is_completed;
            let (c, goal) = add_contribution(conn, user_id, goal_id, input)?;
            println!(
                "Added {} to '{}' (contribution {}); saved {}",
                money(c.amount),
                goal.name,
                c.id,
                money(goal.current_amount)
            );
            if goal.is_completed && !was_completed {
                println!("Goal '{}' reached its target", goal.name);
            }
        }
        Some(("edit-contribution", sub)) => {
            let update = ContributionUpdate {
                date: opt_date_arg(sub, "date")?,
                amount: opt_amount_arg(sub, "amount")?,
                note: opt_arg(sub, "note").map(str::to_string),
            };
            let (c, goal) = update_contribution(conn, user_id, id_arg(sub, "id")?, update)?;
            println!(
                "Updated contribution {}; '{}' saved {}",
                c.id,
                goal.name,
                money(goal.current_amount)
            );
        }
        Some(("rm-contribution", sub)) => {
            let id = id_arg(sub, "id")?;
            let goal = remove_contribution(conn, user_id, id)?;
            println!(
                "Removed contribution {}; '{}' saved {}",
                id,
                goal.name,
                money(goal.current_amount)
            );
        }
        Some(("contributions", sub)) => {
            let items = list_contributions(conn, user_id, id_arg(sub, "goal")?)?;
            if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &items)? {
                return Ok(());
            }
            let data = items
                .into_iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.date.to_string(),
                        money(c.amount),
                        c.note.unwrap_or_default(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Id", "Date", "Amount", "Note"], data));
        }
        _ => {}
    }
    Ok(())
}
