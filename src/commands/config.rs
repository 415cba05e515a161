// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{bail, Result};
use rusqlite::Connection;

use crate::utils::{arg, get_setting, pretty_table, set_setting, CURRENCY_KEY, DEFAULT_USER_KEY};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = arg(sub, "key")?;
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = normalize(key, arg(sub, "value")?)?;
            set_setting(conn, key, &value)?;
            println!("Set {} = {}", key, value);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
            let rows = stmt.query_map([], |r| Ok(vec![r.get(0)?, r.get(1)?]))?;
            let data = rows.collect::<rusqlite::Result<Vec<Vec<String>>>>()?;
            println!("{}", pretty_table(&["Key", "Value"], data));
        }
        _ => {}
    }
    Ok(())
}

fn normalize(key: &str, value: &str) -> Result<String> {
    match key {
        DEFAULT_USER_KEY => {
            if value.parse::<i64>().is_err() {
                bail!("default_user must be an integer user id, got '{}'", value);
            }
            Ok(value.to_string())
        }
        CURRENCY_KEY => {
            if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                bail!("currency must be a three-letter code, got '{}'", value);
            }
            Ok(value.to_uppercase())
        }
        _ => bail!("Unknown setting '{}' (use default_user|currency)", key),
    }
}
