// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::LedgerError;

pub const DEFAULT_USER_KEY: &str = "default_user";
pub const CURRENCY_KEY: &str = "currency";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Parses a user-entered money amount: strictly positive, at most two places.
pub fn parse_amount(field: &'static str, s: &str) -> Result<Decimal, LedgerError> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(field, format!("'{}' is not a decimal", s.trim())))?;
    check_amount(field, d)
}

pub fn check_amount(field: &'static str, d: Decimal) -> Result<Decimal, LedgerError> {
    if d <= Decimal::ZERO {
        return Err(LedgerError::validation(field, "must be greater than zero"));
    }
    if d.normalize().scale() > 2 {
        return Err(LedgerError::validation(
            field,
            "must have at most two decimal places",
        ));
    }
    Ok(d.round_dp(2))
}

/// Rounds to cents, midpoint away from zero.
pub fn cents(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-point storage form: exactly two fractional digits.
pub fn money(d: Decimal) -> String {
    format!("{:.2}", cents(d))
}

pub fn opt_money(d: Option<Decimal>) -> Option<String> {
    d.map(money)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 30,
    }
}

pub fn days_in_month_of(date: NaiveDate) -> u32 {
    days_in_month(date.year(), date.month())
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_KEY)?.unwrap_or_else(|| "USD".to_string()))
}

/// Acting user: explicit `--user`, else the `default_user` setting, else 1.
pub fn acting_user(conn: &Connection, m: &clap::ArgMatches) -> Result<i64> {
    if let Some(u) = m.get_one::<i64>("user") {
        return Ok(*u);
    }
    match get_setting(conn, DEFAULT_USER_KEY)? {
        Some(v) => v
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Invalid default_user setting '{}'", v)),
        None => Ok(1),
    }
}

pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .with_context(|| format!("Missing --{}", name))
}

pub fn opt_arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn id_arg(m: &clap::ArgMatches, name: &str) -> Result<i64> {
    let raw = arg(m, name)?;
    raw.parse::<i64>()
        .with_context(|| format!("Invalid id '{}' for --{}", raw, name))
}

pub fn opt_id_arg(m: &clap::ArgMatches, name: &str) -> Result<Option<i64>> {
    opt_arg(m, name)
        .map(|raw| {
            raw.parse::<i64>()
                .with_context(|| format!("Invalid id '{}' for --{}", raw, name))
        })
        .transpose()
}

pub fn opt_date_arg(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    opt_arg(m, name).map(parse_date).transpose()
}

pub fn date_or_today(m: &clap::ArgMatches, name: &str) -> Result<NaiveDate> {
    Ok(opt_date_arg(m, name)?.unwrap_or_else(|| chrono::Local::now().date_naive()))
}

pub fn amount_arg(m: &clap::ArgMatches, name: &'static str) -> Result<Decimal> {
    Ok(parse_amount(name, arg(m, name)?)?)
}

pub fn opt_amount_arg(m: &clap::ArgMatches, name: &'static str) -> Result<Option<Decimal>> {
    Ok(opt_arg(m, name)
        .map(|raw| parse_amount(name, raw))
        .transpose()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_rules() {
        assert_eq!(money(parse_amount("amount", " 12.5 ").unwrap()), "12.50");
        assert!(parse_amount("amount", "0").unwrap_err().is_validation());
        assert!(parse_amount("amount", "-3").unwrap_err().is_validation());
        assert!(parse_amount("amount", "1.005").unwrap_err().is_validation());
        assert!(parse_amount("amount", "abc").unwrap_err().is_validation());
        // trailing zeros beyond two places are harmless
        assert_eq!(money(parse_amount("amount", "4.100").unwrap()), "4.10");
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 4), 30);
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money(Decimal::new(1005, 3)), "1.01");
        assert_eq!(money(Decimal::new(-1005, 3)), "-1.01");
        assert_eq!(money(Decimal::ZERO), "0.00");
    }
}
