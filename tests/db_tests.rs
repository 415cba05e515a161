// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;

use runway::ledger::accounts::{create_account, list_accounts, NewAccount};
use runway::models::{AccountType, Classification};
use runway::{db, utils};

#[test]
fn schema_is_idempotent_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runway.sqlite");
    {
        let mut conn = Connection::open(&path).unwrap();
        db::init_schema(&mut conn).unwrap();
        create_account(
            &mut conn,
            1,
            NewAccount {
                name: "Cheque".into(),
                classification: Classification::Spending,
                account_type: AccountType::Cheque,
                opening_balance: "-12.5".parse().unwrap(),
                credit_limit: None,
            },
        )
        .unwrap();
    }
    let mut conn = Connection::open(&path).unwrap();
    db::init_schema(&mut conn).unwrap();
    let accounts = list_accounts(&conn, 1).unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(utils::money(accounts[0].current_balance), "-12.50");
}

#[test]
fn corrupt_amounts_surface_as_errors() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO accounts(user_id, name, classification, account_type, opening_balance,
                              current_balance)
         VALUES (1, 'Broken', 'spending', 'cheque', '0.00', 'lots')",
        [],
    )
    .unwrap();
    assert!(list_accounts(&conn, 1).is_err());
}

#[test]
fn settings_round_trip() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    assert_eq!(utils::get_currency(&conn).unwrap(), "USD");
    utils::set_setting(&conn, utils::CURRENCY_KEY, "ZAR").unwrap();
    utils::set_setting(&conn, utils::CURRENCY_KEY, "EUR").unwrap();
    assert_eq!(utils::get_currency(&conn).unwrap(), "EUR");
}
