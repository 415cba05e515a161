// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::ledger::categories::{create_category, list_categories, recategorize};
use crate::utils::{arg, id_arg, pretty_table};

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let category = create_category(conn, user_id, arg(sub, "name")?)?;
            println!("Added category '{}' (id {})", category.name, category.id);
        }
        Some(("list", _)) => {
            let data = list_categories(conn, user_id)?
                .into_iter()
                .map(|c| vec![c.id.to_string(), c.name])
                .collect();
            println!("{}", pretty_table(&["Id", "Name"], data));
        }
        Some(("recategorize", sub)) => {
            let ids = parse_ids(arg(sub, "ids")?)?;
            let category_id = id_arg(sub, "category")?;
            let changed = recategorize(conn, user_id, &ids, category_id)?;
            println!("Recategorized {} transaction(s)", changed);
        }
        _ => {}
    }
    Ok(())
}

fn parse_ids(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("Invalid transaction id '{}'", s))
        })
        .collect()
}
