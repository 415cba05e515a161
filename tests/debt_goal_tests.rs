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
use runway::ledger::audit::reconcile;
use runway::ledger::debts::{
    add_payment, create_debt, get_debt, list_payments, remove_payment, set_debt_active,
    total_outstanding, update_payment, NewDebt, NewPayment, PaymentUpdate,
};
use runway::ledger::savings::{
    add_contribution, create_goal, get_goal, list_contributions, remove_contribution,
    update_contribution, ContributionUpdate, NewContribution, NewGoal,
};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
}

fn debt(conn: &mut Connection, original: &str, current: Option<&str>) -> i64 {
    create_debt(
        conn,
        1,
        NewDebt {
            name: "Car loan".into(),
            original_amount: dec(original),
            current_balance: current.map(dec),
            minimum_payment: dec("250"),
            fixed_payment: None,
            interest_rate: Some(dec("7.5")),
        },
    )
    .unwrap()
    .id
}

fn payment(amount: &str) -> NewPayment {
    NewPayment {
        date: day(1),
        amount: dec(amount),
        principal: None,
        interest: None,
        note: None,
    }
}

#[test]
fn debt_starts_at_current_or_original_amount() {
    let mut conn = setup();
    let a = debt(&mut conn, "15000", None);
    let b = debt(&mut conn, "15000", Some("9000"));
    assert_eq!(get_debt(&conn, 1, a).unwrap().current_balance, dec("15000"));
    assert_eq!(get_debt(&conn, 1, b).unwrap().current_balance, dec("9000"));
    assert_eq!(total_outstanding(&conn, 1).unwrap(), dec("24000"));
}

#[test]
fn payment_lifecycle_is_symmetric() {
    let mut conn = setup();
    let id = debt(&mut conn, "10000", None);
    let (p, d) = add_payment(&mut conn, 1, id, payment("400")).unwrap();
    assert_eq!(d.current_balance, dec("9600"));

    let update = PaymentUpdate {
        amount: Some(dec("250")),
        note: Some("corrected".into()),
        ..Default::default()
    };
    let (p2, d) = update_payment(&mut conn, 1, p.id, update).unwrap();
    assert_eq!(d.current_balance, dec("9750"));
    assert_eq!(p2.note.as_deref(), Some("corrected"));

    let d = remove_payment(&mut conn, 1, p.id).unwrap();
    assert_eq!(d.current_balance, dec("10000"));
    assert!(list_payments(&conn, 1, id).unwrap().is_empty());
    assert!(reconcile(&conn, 1).unwrap().is_empty());
}

#[test]
fn payments_on_a_closed_debt_are_rejected() {
    let mut conn = setup();
    let id = debt(&mut conn, "1000", None);
    let (p, _) = add_payment(&mut conn, 1, id, payment("100")).unwrap();
    set_debt_active(&mut conn, 1, id, false).unwrap();

    assert!(add_payment(&mut conn, 1, id, payment("50")).unwrap_err().is_validation());
    let update = PaymentUpdate {
        amount: Some(dec("10")),
        ..Default::default()
    };
    assert!(update_payment(&mut conn, 1, p.id, update).unwrap_err().is_validation());
    assert_eq!(get_debt(&conn, 1, id).unwrap().current_balance, dec("900"));
    assert_eq!(total_outstanding(&conn, 1).unwrap(), Decimal::ZERO);

    // removal stays possible and restores the balance
    assert_eq!(remove_payment(&mut conn, 1, p.id).unwrap().current_balance, dec("1000"));
}

#[test]
fn payment_validation_and_ownership() {
    let mut conn = setup();
    let id = debt(&mut conn, "1000", None);
    assert!(add_payment(&mut conn, 1, id, payment("0")).unwrap_err().is_validation());
    assert!(add_payment(&mut conn, 2, id, payment("10")).unwrap_err().is_not_found());
    assert!(remove_payment(&mut conn, 1, 77).unwrap_err().is_not_found());
    assert_eq!(get_debt(&conn, 1, id).unwrap().current_balance, dec("1000"));
}

fn goal(conn: &mut Connection, current: &str, target: Option<&str>) -> i64 {
    create_goal(
        conn,
        1,
        NewGoal {
            name: "Emergency fund".into(),
            current_amount: dec(current),
            target_amount: target.map(dec),
            target_date: None,
        },
    )
    .unwrap()
    .id
}

fn contribution(amount: &str) -> NewContribution {
    NewContribution {
        date: day(2),
        amount: dec(amount),
        note: None,
    }
}

#[test]
fn reaching_the_target_completes_the_goal() {
    let mut conn = setup();
    let id = goal(&mut conn, "48000", Some("50000"));
    let (_, g) = add_contribution(&mut conn, 1, id, contribution("1999.99")).unwrap();
    assert!(!g.is_completed);
    assert!(g.completed_at.is_none());

    let (c, g) = add_contribution(&mut conn, 1, id, contribution("0.01")).unwrap();
    assert_eq!(g.current_amount, dec("50000"));
    assert!(g.is_completed);
    assert!(g.completed_at.is_some());

    // completion sticks even when the total later drops
    let g = remove_contribution(&mut conn, 1, c.id).unwrap();
    assert_eq!(g.current_amount, dec("49999.99"));
    assert!(g.is_completed);
}

#[test]
fn goals_without_target_never_complete() {
    let mut conn = setup();
    let id = goal(&mut conn, "0", None);
    let (_, g) = add_contribution(&mut conn, 1, id, contribution("1000000")).unwrap();
    assert!(!g.is_completed);
}

#[test]
fn contribution_edits_are_symmetric() {
    let mut conn = setup();
    let id = goal(&mut conn, "100", Some("1000"));
    let (c, _) = add_contribution(&mut conn, 1, id, contribution("50")).unwrap();
    let update = ContributionUpdate {
        amount: Some(dec("80")),
        ..Default::default()
    };
    let (_, g) = update_contribution(&mut conn, 1, c.id, update).unwrap();
    assert_eq!(g.current_amount, dec("180"));
    assert_eq!(list_contributions(&conn, 1, id).unwrap().len(), 1);

    remove_contribution(&mut conn, 1, c.id).unwrap();
    assert_eq!(get_goal(&conn, 1, id).unwrap().current_amount, dec("100"));
    assert!(remove_contribution(&mut conn, 1, c.id).unwrap_err().is_not_found());
    assert!(reconcile(&conn, 1).unwrap().is_empty());
}
