// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

use runway::commands::tracker::export_csv;
use runway::db;
use runway::ledger::accounts::{create_account, NewAccount};
use runway::ledger::budgets::{add_line, create_budget, set_status, NewBudgetLine};
use runway::ledger::recurring::{create_recurring, set_active, NewRecurring};
use runway::ledger::transactions::{create_transaction, NewTransaction};
use runway::models::{
    AccountType, AmountType, BudgetLineKind, BudgetStatus, Classification, Frequency,
    TransactionType,
};
use runway::projection::{self, ProjectionInputs, NEGATIVE_BALANCE_ALERT};
use runway::utils::money;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn account(conn: &mut Connection, name: &str, class: Classification, opening: &str) -> i64 {
    create_account(
        conn,
        1,
        NewAccount {
            name: name.into(),
            classification: class,
            account_type: AccountType::Cheque,
            opening_balance: dec(opening),
            credit_limit: None,
        },
    )
    .unwrap()
    .id
}

fn template(account_id: i64, kind: TransactionType, amount: &str, day: u32) -> NewRecurring {
    NewRecurring {
        account_id,
        category_id: None,
        name: format!("{} on {}", kind, day),
        transaction_type: kind,
        amount_type: AmountType::Fixed,
        amount: Some(dec(amount)),
        amount_max: None,
        frequency: Frequency::Monthly,
        day_of_month: Some(day),
        day_of_week: None,
        next_occurrence: None,
    }
}

#[test]
fn quiet_ledger_holds_its_balance() {
    let mut conn = setup();
    account(&mut conn, "Cheque", Classification::Spending, "10000");
    let entries =
        projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 3)).unwrap();
    assert_eq!(entries.len(), 3);
    for e in &entries {
        assert_eq!(money(e.running_balance), "10000.00");
        assert!(!e.has_alerts);
        assert!(e.alerts.is_none());
        assert!(!e.is_payday);
        assert!(e.expense_details.is_none());
    }
}

#[test]
fn only_spending_accounts_seed_the_balance() {
    let mut conn = setup();
    account(&mut conn, "Cheque", Classification::Spending, "1200");
    account(&mut conn, "Brokerage", Classification::NonSpending, "50000");
    let inputs = ProjectionInputs::gather(&conn, 1, date(2025, 3, 1)).unwrap();
    assert_eq!(inputs.starting_balance, dec("1200"));
}

#[test]
fn payday_lands_on_the_anchor_day() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "0");
    create_recurring(&mut conn, 1, template(acc, TransactionType::Credit, "30000", 25)).unwrap();
    let entries =
        projection::generate(&mut conn, 1, date(2025, 2, 23), date(2025, 2, 27)).unwrap();
    assert_eq!(entries.len(), 5);
    for e in &entries {
        if e.date == date(2025, 2, 25) {
            assert!(e.is_payday);
            assert_eq!(money(e.expected_income), "30000.00");
            assert_eq!(e.income_details.len(), 1);
        } else {
            assert!(!e.is_payday);
            assert_eq!(money(e.expected_income), "0.00");
        }
    }
    assert_eq!(money(entries[4].running_balance), "30000.00");
}

#[test]
fn debit_templates_become_debt_payments() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "1000");
    create_recurring(&mut conn, 1, template(acc, TransactionType::Debit, "350", 2)).unwrap();
    let paused =
        create_recurring(&mut conn, 1, template(acc, TransactionType::Debit, "999", 2)).unwrap();
    set_active(&mut conn, 1, paused.id, false).unwrap();

    let entries =
        projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 3)).unwrap();
    assert_eq!(money(entries[1].expected_debt_payments), "350.00");
    assert_eq!(money(entries[2].running_balance), "650.00");
}

#[test]
fn budget_expenses_are_prorated_per_day() {
    let mut conn = setup();
    account(&mut conn, "Cheque", Classification::Spending, "50000");
    let b = create_budget(&mut conn, 1, "2025-02").unwrap();
    let item = NewBudgetLine {
        kind: BudgetLineKind::Item,
        name: "Everything".into(),
        amount: dec("28000"),
        category_id: None,
        date: None,
    };
    add_line(&mut conn, 1, b.id, item).unwrap();
    set_status(&mut conn, 1, b.id, BudgetStatus::Active).unwrap();

    let entries =
        projection::generate(&mut conn, 1, date(2025, 2, 1), date(2025, 2, 28)).unwrap();
    assert_eq!(entries.len(), 28);
    for e in &entries {
        assert_eq!(money(e.expected_expenses), "1000.00");
        assert_eq!(e.expense_details.as_ref().unwrap().days_in_month, 28);
    }
    assert_eq!(money(entries[27].running_balance), "22000.00");
}

#[test]
fn history_sets_the_daily_baseline() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "1000");
    for (d, amount) in [(date(2025, 1, 10), "600"), (date(2025, 2, 28), "300")] {
        let t = NewTransaction {
            account_id: acc,
            category_id: None,
            date: d,
            description: "spend".into(),
            amount: dec(amount),
            transaction_type: TransactionType::Debit,
        };
        create_transaction(&mut conn, 1, t).unwrap();
    }
    // outside the trailing window
    let old = NewTransaction {
        account_id: acc,
        category_id: None,
        date: date(2024, 6, 1),
        description: "old".into(),
        amount: dec("5000"),
        transaction_type: TransactionType::Debit,
    };
    create_transaction(&mut conn, 1, old).unwrap();

    let entries =
        projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 2)).unwrap();
    // 900 over a fixed 90-day window
    assert_eq!(money(entries[0].predicted_spend), "10.00");
    // 1000 - 600 - 300 - 5000, then two days of baseline
    assert_eq!(money(entries[1].running_balance), "-4920.00");
}

#[test]
fn negative_days_are_flagged_without_touching_earlier_days() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "100");
    create_recurring(&mut conn, 1, template(acc, TransactionType::Debit, "150", 3)).unwrap();
    let entries =
        projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 4)).unwrap();
    assert!(!entries[0].has_alerts);
    assert!(!entries[1].has_alerts);
    assert!(entries[2].has_alerts);
    let alerts = entries[2].alerts.as_ref().unwrap();
    assert_eq!(alerts[0].kind, NEGATIVE_BALANCE_ALERT);
    assert_eq!(money(alerts[0].balance), "-50.00");
    assert!(entries[3].has_alerts);

    let stored = projection::get_by_date(&conn, 1, date(2025, 3, 3)).unwrap().unwrap();
    assert!(stored.has_alerts);
    assert_eq!(stored.alerts.unwrap()[0].balance, dec("-50"));
}

#[test]
fn regeneration_replaces_the_range() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "100");
    projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 10)).unwrap();
    let t = NewTransaction {
        account_id: acc,
        category_id: None,
        date: date(2025, 2, 20),
        description: "late".into(),
        amount: dec("90"),
        transaction_type: TransactionType::Debit,
    };
    create_transaction(&mut conn, 1, t).unwrap();
    projection::generate(&mut conn, 1, date(2025, 3, 5), date(2025, 3, 6)).unwrap();

    let all = projection::get_range(&conn, 1, date(2025, 3, 1), date(2025, 3, 10)).unwrap();
    assert_eq!(all.len(), 10);
    assert_eq!(money(all[0].running_balance), "100.00");
    assert_eq!(money(all[4].running_balance), "9.00");
    assert_eq!(money(all[5].running_balance), "8.00");

    let removed =
        projection::clear_range(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 4)).unwrap();
    assert_eq!(removed, 4);
    assert_eq!(
        projection::get_range(&conn, 1, date(2025, 3, 1), date(2025, 3, 10)).unwrap().len(),
        6
    );
    assert!(projection::get_by_date(&conn, 1, date(2025, 3, 2)).unwrap().is_none());
}

#[test]
fn forecasting_leaves_the_ledger_alone() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "100");
    create_recurring(&mut conn, 1, template(acc, TransactionType::Credit, "500", 1)).unwrap();
    projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 5, 1)).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    let stored: String = conn
        .query_row("SELECT current_balance FROM accounts WHERE id=?1", [acc], |r| r.get(0))
        .unwrap();
    assert_eq!(stored, "100.00");
}

#[test]
fn reversed_range_is_rejected() {
    let mut conn = setup();
    let err =
        projection::generate(&mut conn, 1, date(2025, 3, 2), date(2025, 3, 1)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn export_writes_one_row_per_day() {
    let mut conn = setup();
    account(&mut conn, "Cheque", Classification::Spending, "250");
    projection::generate(&mut conn, 1, date(2025, 3, 1), date(2025, 3, 3)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forecast.csv");
    let written = export_csv(&conn, 1, date(2025, 3, 1), date(2025, 3, 3), &path).unwrap();
    assert_eq!(written, 3);

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "2025-03-01");
    assert_eq!(&rows[2][5], "250.00");
}

#[test]
fn weekly_yearly_and_variable_templates() {
    let mut conn = setup();
    let acc = account(&mut conn, "Cheque", Classification::Spending, "1000");

    let mut weekly = template(acc, TransactionType::Credit, "200", 1);
    weekly.frequency = Frequency::Weekly;
    weekly.day_of_month = None;
    weekly.day_of_week = Some(2);
    create_recurring(&mut conn, 1, weekly).unwrap();

    let mut yearly = template(acc, TransactionType::Credit, "5000", 25);
    yearly.frequency = Frequency::Yearly;
    create_recurring(&mut conn, 1, yearly).unwrap();

    let mut variable = template(acc, TransactionType::Debit, "1", 1);
    variable.amount_type = AmountType::Variable;
    variable.amount = None;
    variable.amount_max = Some(dec("75"));
    create_recurring(&mut conn, 1, variable).unwrap();

    let entries =
        projection::generate(&mut conn, 1, date(2025, 2, 23), date(2025, 3, 4)).unwrap();
    assert_eq!(entries.len(), 10);
    for e in &entries {
        let tuesday = e.date == date(2025, 2, 25) || e.date == date(2025, 3, 4);
        assert_eq!(e.is_payday, tuesday);
        if tuesday {
            assert_eq!(money(e.expected_income), "200.00");
            assert_eq!(e.income_details.len(), 1);
        } else {
            assert_eq!(money(e.expected_income), "0.00");
        }
        if e.date == date(2025, 3, 1) {
            assert_eq!(money(e.expected_debt_payments), "75.00");
            assert_eq!(e.debt_details[0].amount, dec("75"));
        } else {
            assert_eq!(money(e.expected_debt_payments), "0.00");
        }
    }
    assert_eq!(money(entries[9].running_balance), "1325.00");
}
