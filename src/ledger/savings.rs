// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use super::{
    apply, begin, find_goal, map_contribution, map_goal, AggregateRef, CONTRIBUTION_COLS,
    GOAL_COLS,
};
use crate::error::{LedgerError, Result};
use crate::models::{SavingsContribution, SavingsGoal};
use crate::utils::{check_amount, money, opt_money};

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub current_amount: Decimal,
    pub target_amount: Option<Decimal>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewContribution {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContributionUpdate {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub note: Option<String>,
}

pub fn create_goal(conn: &mut Connection, user_id: i64, input: NewGoal) -> Result<SavingsGoal> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("name", "must not be empty"));
    }
    if input.current_amount < Decimal::ZERO {
        return Err(LedgerError::validation("current_amount", "must not be negative"));
    }
    let target = input
        .target_amount
        .map(|t| check_amount("target_amount", t))
        .transpose()?;
    let tx = begin(conn)?;
    tx.execute(
        "INSERT INTO savings_goals(user_id, name, opening_amount, current_amount, target_amount,
                                   target_date)
         VALUES (?1, ?2, ?3, ?3, ?4, ?5)",
        params![
            user_id,
            input.name.trim(),
            money(input.current_amount),
            opt_money(target),
            input.target_date
        ],
    )?;
    let goal = find_goal(&tx, user_id, tx.last_insert_rowid())?;
    tx.commit()?;
    tracing::info!(id = goal.id, name = %goal.name, "savings goal created");
    Ok(goal)
}

pub fn get_goal(conn: &Connection, user_id: i64, id: i64) -> Result<SavingsGoal> {
    find_goal(conn, user_id, id)
}

pub fn list_goals(conn: &Connection, user_id: i64) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLS} FROM savings_goals WHERE user_id=?1 ORDER BY name, id"
    ))?;
    let rows = stmt.query_map(params![user_id], map_goal)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn find_contribution(conn: &Connection, user_id: i64, id: i64) -> Result<SavingsContribution> {
    conn.query_row(
        &format!(
            "SELECT {CONTRIBUTION_COLS} FROM savings_contributions c
             JOIN savings_goals g ON c.goal_id=g.id
             WHERE c.id=?1 AND g.user_id=?2"
        ),
        params![id, user_id],
        map_contribution,
    )
    .optional()?
    .ok_or(LedgerError::not_found("savings contribution", id))
}

/// Adds to a goal. Reaching the target marks the goal completed; that flag
/// is never cleared by later reductions.
pub fn add_contribution(
    conn: &mut Connection,
    user_id: i64,
    goal_id: i64,
    input: NewContribution,
) -> Result<(SavingsContribution, SavingsGoal)> {
    let amount = check_amount("amount", input.amount)?;
    let tx = begin(conn)?;
    let goal = find_goal(&tx, user_id, goal_id)?;
    tx.execute(
        "INSERT INTO savings_contributions(goal_id, date, amount, note) VALUES (?1, ?2, ?3, ?4)",
        params![goal_id, input.date, money(amount), input.note],
    )?;
    let contribution = find_contribution(&tx, user_id, tx.last_insert_rowid())?;
    let reached = apply(&tx, AggregateRef::Goal(goal_id), amount)?;
    if !goal.is_completed && goal.target_amount.is_some_and(|t| reached >= t) {
        tx.execute(
            "UPDATE savings_goals SET is_completed=1, completed_at=?1 WHERE id=?2",
            params![Utc::now().to_rfc3339(), goal_id],
        )?;
        tracing::info!(goal = goal_id, amount = %reached, "savings goal completed");
    }
    let goal = find_goal(&tx, user_id, goal_id)?;
    tx.commit()?;
    tracing::info!(id = contribution.id, goal = goal_id, amount = %amount, "contribution recorded");
    Ok((contribution, goal))
}

pub fn update_contribution(
    conn: &mut Connection,
    user_id: i64,
    id: i64,
    update: ContributionUpdate,
) -> Result<(SavingsContribution, SavingsGoal)> {
    let new_amount = update
        .amount
        .map(|a| check_amount("amount", a))
        .transpose()?;
    let tx = begin(conn)?;
    let old = find_contribution(&tx, user_id, id)?;
    let amount = new_amount.unwrap_or(old.amount);
    tx.execute(
        "UPDATE savings_contributions SET date=?1, amount=?2, note=?3 WHERE id=?4",
        params![
            update.date.unwrap_or(old.date),
            money(amount),
            update.note.or(old.note),
            id
        ],
    )?;
    if amount != old.amount {
        let target = AggregateRef::Goal(old.goal_id);
        apply(&tx, target, -old.amount)?;
        apply(&tx, target, amount)?;
    }
    let contribution = find_contribution(&tx, user_id, id)?;
    let goal = find_goal(&tx, user_id, old.goal_id)?;
    tx.commit()?;
    tracing::info!(id, goal = goal.id, "contribution updated");
    Ok((contribution, goal))
}

pub fn remove_contribution(conn: &mut Connection, user_id: i64, id: i64) -> Result<SavingsGoal> {
    let tx = begin(conn)?;
    let contribution = find_contribution(&tx, user_id, id)?;
    tx.execute("DELETE FROM savings_contributions WHERE id=?1", params![id])?;
    apply(&tx, AggregateRef::Goal(contribution.goal_id), -contribution.amount)?;
    let goal = find_goal(&tx, user_id, contribution.goal_id)?;
    tx.commit()?;
    tracing::info!(id, goal = goal.id, "contribution removed");
    Ok(goal)
}

pub fn list_contributions(
    conn: &Connection,
    user_id: i64,
    goal_id: i64,
) -> Result<Vec<SavingsContribution>> {
    find_goal(conn, user_id, goal_id)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTRIBUTION_COLS} FROM savings_contributions c WHERE c.goal_id=?1
         ORDER BY c.date, c.id"
    ))?;
    let rows = stmt.query_map(params![goal_id], map_contribution)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
