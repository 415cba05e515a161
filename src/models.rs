// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Declares a closed set of string-tagged values stored as TEXT columns.
macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(LedgerError::validation(
                        $field,
                        format!("unknown value '{}'", other),
                    )),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(TransactionType, "transaction_type", {
    Debit => "debit",
    Credit => "credit",
});

impl TransactionType {
    /// Signed effect of `amount` on the owning aggregate.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Debit => -amount,
            TransactionType::Credit => amount,
        }
    }
}

text_enum!(Classification, "classification", {
    Spending => "spending",
    NonSpending => "non_spending",
});

text_enum!(AccountType, "account_type", {
    Cheque => "cheque",
    Savings => "savings",
    CreditCard => "credit_card",
    Investment => "investment",
    Loan => "loan",
    Other => "other",
});

text_enum!(Frequency, "frequency", {
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

text_enum!(AmountType, "amount_type", {
    Fixed => "fixed",
    Variable => "variable",
});

text_enum!(BudgetStatus, "status", {
    Draft => "draft",
    Active => "active",
    Closed => "closed",
});

text_enum!(BudgetLineKind, "kind", {
    Item => "item",
    Income => "income",
    OneOff => "one_off",
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub classification: Classification,
    pub account_type: AccountType,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub credit_limit: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal, // always positive
    pub transaction_type: TransactionType,
    pub transfer_pair_id: Option<String>,
    pub is_reviewed: bool,
    pub is_recurring_instance: bool,
    pub recurring_transaction_id: Option<i64>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }

    pub fn is_transfer_leg(&self) -> bool {
        self.transfer_pair_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub original_amount: Decimal,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub minimum_payment: Decimal,
    pub fixed_payment: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    pub id: i64,
    pub debt_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub principal: Option<Decimal>,
    pub interest: Option<Decimal>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub opening_amount: Decimal,
    pub current_amount: Decimal,
    pub target_amount: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsContribution {
    pub id: i64,
    pub goal_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub transaction_type: TransactionType,
    pub amount_type: AmountType,
    pub amount: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub frequency: Frequency,
    pub day_of_month: Option<u32>,
    pub day_of_week: Option<u32>, // 0 = Sunday
    pub next_occurrence: Option<NaiveDate>,
    pub last_occurrence: Option<NaiveDate>,
    pub is_active: bool,
}

impl RecurringTransaction {
    /// Amount used for forecasting: the fixed amount, or the ceiling of a variable one.
    pub fn projected_amount(&self) -> Decimal {
        self.amount.or(self.amount_max).unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub month: String, // YYYY-MM
    pub status: BudgetStatus,
    pub total_planned_expenses: Decimal,
    pub total_income: Decimal,
    pub unallocated: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    pub id: i64,
    pub budget_id: i64,
    pub kind: BudgetLineKind,
    pub name: String,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: String,
    pub message: String,
    pub balance: Decimal,
}

/// One recurring template that contributed to a day's expected flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFlow {
    pub recurring_id: i64,
    pub name: String,
    pub amount: Decimal,
}

/// How a day's expected expenses were derived from the active budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBasis {
    pub budget_id: i64,
    pub monthly_planned: Decimal,
    pub days_in_month: u32,
    pub daily_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTrackerEntry {
    pub user_id: i64,
    pub date: NaiveDate,
    pub expected_income: Decimal,
    pub expected_debt_payments: Decimal,
    pub expected_expenses: Decimal,
    pub predicted_spend: Decimal,
    pub running_balance: Decimal,
    pub has_alerts: bool,
    pub alerts: Option<Vec<Alert>>,
    pub is_payday: bool,
    pub income_details: Vec<ScheduledFlow>,
    pub debt_details: Vec<ScheduledFlow>,
    pub expense_details: Option<ExpenseBasis>,
}
