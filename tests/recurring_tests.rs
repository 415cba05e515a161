// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

use runway::db;
use runway::ledger::accounts::{create_account, NewAccount};
use runway::ledger::find_account;
use runway::ledger::recurring::{
    create_recurring, generate_instance, get_recurring, list_recurring, set_active,
    skip_occurrence, NewRecurring,
};
use runway::models::{AccountType, AmountType, Classification, Frequency, TransactionType};

fn setup() -> (Connection, i64) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    let acc = create_account(
        &mut conn,
        1,
        NewAccount {
            name: "Cheque".into(),
            classification: Classification::Spending,
            account_type: AccountType::Cheque,
            opening_balance: dec("1000"),
            credit_limit: None,
        },
    )
    .unwrap();
    (conn, acc.id)
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monthly(account_id: i64, day_of_month: u32, next: NaiveDate) -> NewRecurring {
    NewRecurring {
        account_id,
        category_id: None,
        name: "Rent".into(),
        transaction_type: TransactionType::Debit,
        amount_type: AmountType::Fixed,
        amount: Some(dec("500")),
        amount_max: None,
        frequency: Frequency::Monthly,
        day_of_month: Some(day_of_month),
        day_of_week: None,
        next_occurrence: Some(next),
    }
}

#[test]
fn generate_books_the_instance_and_advances() {
    let (mut conn, acc) = setup();
    let t = create_recurring(&mut conn, 1, monthly(acc, 15, date(2025, 3, 15))).unwrap();
    let (instance, template) = generate_instance(&mut conn, 1, t.id, None).unwrap();

    assert_eq!(instance.date, date(2025, 3, 15));
    assert_eq!(instance.amount, dec("500"));
    assert!(instance.is_recurring_instance);
    assert_eq!(instance.recurring_transaction_id, Some(t.id));
    assert_eq!(instance.description, "Rent");
    assert_eq!(template.next_occurrence, Some(date(2025, 4, 15)));
    assert_eq!(template.last_occurrence, Some(date(2025, 3, 15)));
    assert_eq!(find_account(&conn, 1, acc).unwrap().current_balance, dec("500"));
}

#[test]
fn month_end_anchor_clamps_and_recovers() {
    let (mut conn, acc) = setup();
    let t = create_recurring(&mut conn, 1, monthly(acc, 31, date(2025, 1, 31))).unwrap();
    let t = skip_occurrence(&mut conn, 1, t.id).unwrap();
    assert_eq!(t.next_occurrence, Some(date(2025, 2, 28)));
    let t = skip_occurrence(&mut conn, 1, t.id).unwrap();
    assert_eq!(t.next_occurrence, Some(date(2025, 3, 31)));
    // skipping books nothing
    assert_eq!(find_account(&conn, 1, acc).unwrap().current_balance, dec("1000"));
}

#[test]
fn weekly_templates_step_seven_days() {
    let (mut conn, acc) = setup();
    let mut input = monthly(acc, 1, date(2025, 2, 23));
    input.frequency = Frequency::Weekly;
    input.day_of_month = None;
    input.day_of_week = Some(0);
    let t = create_recurring(&mut conn, 1, input).unwrap();
    let (_, t) = generate_instance(&mut conn, 1, t.id, None).unwrap();
    assert_eq!(t.next_occurrence, Some(date(2025, 3, 2)));
}

#[test]
fn variable_amount_uses_override_then_ceiling() {
    let (mut conn, acc) = setup();
    let mut input = monthly(acc, 5, date(2025, 3, 5));
    input.name = "Power".into();
    input.amount_type = AmountType::Variable;
    input.amount = None;
    input.amount_max = Some(dec("120"));
    let t = create_recurring(&mut conn, 1, input).unwrap();

    let (first, _) = generate_instance(&mut conn, 1, t.id, Some(dec("87.40"))).unwrap();
    assert_eq!(first.amount, dec("87.40"));
    let (second, _) = generate_instance(&mut conn, 1, t.id, None).unwrap();
    assert_eq!(second.amount, dec("120"));
    assert_eq!(second.date, date(2025, 4, 5));
    assert_eq!(find_account(&conn, 1, acc).unwrap().current_balance, dec("792.60"));
}

#[test]
fn fixed_templates_ignore_the_override() {
    let (mut conn, acc) = setup();
    let t = create_recurring(&mut conn, 1, monthly(acc, 15, date(2025, 3, 15))).unwrap();
    let (instance, _) = generate_instance(&mut conn, 1, t.id, Some(dec("1"))).unwrap();
    assert_eq!(instance.amount, dec("500"));
}

#[test]
fn invalid_templates_are_rejected() {
    let (mut conn, acc) = setup();
    let mut no_amount = monthly(acc, 15, date(2025, 3, 15));
    no_amount.amount = None;
    assert!(create_recurring(&mut conn, 1, no_amount).unwrap_err().is_validation());

    let bad_anchor = monthly(acc, 32, date(2025, 3, 15));
    assert!(create_recurring(&mut conn, 1, bad_anchor).unwrap_err().is_validation());

    let mut bad_weekday = monthly(acc, 1, date(2025, 3, 15));
    bad_weekday.frequency = Frequency::Weekly;
    bad_weekday.day_of_week = Some(7);
    assert!(create_recurring(&mut conn, 1, bad_weekday).unwrap_err().is_validation());

    let foreign = monthly(acc, 15, date(2025, 3, 15));
    assert!(create_recurring(&mut conn, 2, foreign).unwrap_err().is_not_found());
    assert!(list_recurring(&conn, 1).unwrap().is_empty());
}

#[test]
fn pause_and_resume_toggle_activity() {
    let (mut conn, acc) = setup();
    let t = create_recurring(&mut conn, 1, monthly(acc, 15, date(2025, 3, 15))).unwrap();
    assert!(t.is_active);
    assert!(!set_active(&mut conn, 1, t.id, false).unwrap().is_active);
    assert!(set_active(&mut conn, 1, t.id, true).unwrap().is_active);
    assert!(get_recurring(&conn, 2, t.id).unwrap_err().is_not_found());
}

#[test]
fn template_without_pending_date_cannot_generate() {
    let (mut conn, acc) = setup();
    let mut input = monthly(acc, 15, date(2025, 3, 15));
    input.next_occurrence = None;
    let t = create_recurring(&mut conn, 1, input).unwrap();
    assert!(generate_instance(&mut conn, 1, t.id, None).unwrap_err().is_validation());
    assert!(skip_occurrence(&mut conn, 1, t.id).unwrap_err().is_validation());
    assert_eq!(find_account(&conn, 1, acc).unwrap().current_balance, dec("1000"));
}
