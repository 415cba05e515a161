// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

use runway::ledger::accounts::list_accounts;
use runway::ledger::transactions::{list_transactions, TransactionFilter};
use runway::{cli, commands, db, utils};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

/// Parses `args` and dispatches the one subcommand under test.
fn run(conn: &mut Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["runway"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv)?;
    let user = utils::acting_user(conn, &matches)?;
    match matches.subcommand() {
        Some(("config", sub)) => commands::config::handle(conn, sub),
        Some(("account", sub)) => commands::accounts::handle(conn, user, sub),
        Some(("category", sub)) => commands::categories::handle(conn, user, sub),
        Some(("tx", sub)) => commands::transactions::handle(conn, user, sub),
        Some(("recurring", sub)) => commands::recurring::handle(conn, user, sub),
        Some(("debt", sub)) => commands::debts::handle(conn, user, sub),
        Some(("goal", sub)) => commands::goals::handle(conn, user, sub),
        Some(("budget", sub)) => commands::budgets::handle(conn, user, sub),
        Some(("tracker", sub)) => commands::tracker::handle(conn, user, sub),
        Some(("doctor", sub)) => commands::doctor::handle(conn, user, sub),
        _ => Ok(()),
    }
}

#[test]
fn user_flag_is_global() {
    let m = cli::build_cli()
        .get_matches_from(vec!["runway", "account", "list", "--user", "7", "--json"]);
    let conn = setup();
    assert_eq!(utils::acting_user(&conn, &m).unwrap(), 7);
    let (_, sub) = m.subcommand().unwrap();
    let (_, list) = sub.subcommand().unwrap();
    assert!(list.get_flag("json"));
}

#[test]
fn default_user_setting_applies() {
    let mut conn = setup();
    let m = cli::build_cli().get_matches_from(vec!["runway", "doctor"]);
    assert_eq!(utils::acting_user(&conn, &m).unwrap(), 1);
    run(&mut conn, &["config", "set", "--key", "default_user", "--value", "3"]).unwrap();
    assert_eq!(utils::acting_user(&conn, &m).unwrap(), 3);
    assert!(run(&mut conn, &["config", "set", "--key", "default_user", "--value", "x"]).is_err());
    assert!(run(&mut conn, &["config", "set", "--key", "colour", "--value", "red"]).is_err());
}

#[test]
fn account_and_transactions_through_the_cli() {
    let mut conn = setup();
    run(&mut conn, &["account", "add", "--name", " Cheque ", "--opening", "500"]).unwrap();
    run(
        &mut conn,
        &[
            "account",
            "add",
            "--name",
            "Savings",
            "--type",
            "savings",
            "--classification",
            "non_spending",
        ],
    )
    .unwrap();
    let accounts = list_accounts(&conn, 1).unwrap();
    let cheque = accounts.iter().find(|a| a.name == "Cheque").unwrap().id.to_string();
    let savings = accounts.iter().find(|a| a.name == "Savings").unwrap().id.to_string();

    run(
        &mut conn,
        &["tx", "add", "--account", &cheque, "--amount", "120.25", "--date", "2025-03-01"],
    )
    .unwrap();
    run(
        &mut conn,
        &[
            "tx", "transfer", "--from", &cheque, "--to", &savings, "--amount", "100", "--date",
            "2025-03-02",
        ],
    )
    .unwrap();

    let accounts = list_accounts(&conn, 1).unwrap();
    let balance = |name: &str| accounts.iter().find(|a| a.name == name).unwrap().current_balance;
    assert_eq!(balance("Cheque"), Decimal::from_str("279.75").unwrap());
    assert_eq!(balance("Savings"), Decimal::from_str("100").unwrap());
    assert_eq!(list_transactions(&conn, 1, &TransactionFilter::default()).unwrap().len(), 3);

    let err = run(&mut conn, &["tx", "add", "--account", &cheque, "--amount=-4"]).unwrap_err();
    assert!(err.to_string().contains("amount"));
    run(&mut conn, &["doctor"]).unwrap();
}

#[test]
fn bad_enum_values_are_reported() {
    let mut conn = setup();
    let err = run(&mut conn, &["account", "add", "--name", "X", "--type", "piggy"]).unwrap_err();
    assert!(err.to_string().contains("account_type"));
    assert!(list_accounts(&conn, 1).unwrap().is_empty());
}

#[test]
fn budget_and_tracker_through_the_cli() {
    let mut conn = setup();
    run(&mut conn, &["account", "add", "--name", "Cheque", "--opening", "3000"]).unwrap();
    run(&mut conn, &["budget", "create", "--month", "2025-02"]).unwrap();
    run(&mut conn, &["budget", "item", "--budget", "1", "--name", "Food", "--amount", "2800"])
        .unwrap();
    run(&mut conn, &["budget", "activate", "--id", "1"]).unwrap();
    run(
        &mut conn,
        &["tracker", "generate", "--from", "2025-02-01", "--to", "2025-02-03"],
    )
    .unwrap();

    let entries = runway::projection::get_range(
        &conn,
        1,
        utils::parse_date("2025-02-01").unwrap(),
        utils::parse_date("2025-02-03").unwrap(),
    )
    .unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(utils::money(entries[2].running_balance), "2700.00");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let path = path.to_str().unwrap();
    run(
        &mut conn,
        &["tracker", "export", "--from", "2025-02-01", "--to", "2025-02-03", "--path", path],
    )
    .unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn missing_required_args_fail_to_parse() {
    assert!(cli::build_cli()
        .try_get_matches_from(vec!["runway", "tx", "add", "--amount", "5"])
        .is_err());
    assert!(cli::build_cli()
        .try_get_matches_from(vec!["runway", "tx", "list", "--limit", "many"])
        .is_err());
}
