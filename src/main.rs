// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use runway::{cli, commands, db, utils};

fn main() -> Result<()> {
    runway::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut conn = db::open_or_init()?;
    let user = utils::acting_user(&conn, &matches)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&mut conn, user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut conn, user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&mut conn, user, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut conn, user, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&mut conn, user, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&mut conn, user, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&mut conn, user, sub)?,
        Some(("tracker", sub)) => commands::tracker::handle(&mut conn, user, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, user, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
