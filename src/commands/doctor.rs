// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::audit::reconcile;
use crate::utils::{maybe_print_json, money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    let drift = reconcile(conn, user_id)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &drift)? {
        return Ok(());
    }
    if drift.is_empty() {
        println!("doctor: all balances agree with their records");
        return Ok(());
    }
    let rows = drift
        .iter()
        .map(|d| {
            vec![
                d.aggregate.to_string(),
                d.id.to_string(),
                d.name.clone(),
                money(d.stored),
                money(d.expected),
                money(d.stored - d.expected),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Aggregate", "Id", "Name", "Stored", "Expected", "Difference"],
            rows
        )
    );
    Ok(())
}
