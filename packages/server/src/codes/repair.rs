//! Batch normalization of machine codes.
//!
//! Planning is pure: it takes the rows and the per-prefix counters and returns
//! the rewrites plus the advanced counters. [`repair_codes`] loads rows,
//! plans, and persists. It must run with no concurrent writers.

use std::collections::{BTreeMap, HashMap};

use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::info;

use super::{RETIRED_PREFIXES, format_code, has_prefix, known_prefixes, parse_number, prefix_for};
use crate::entity::machine;

/// Per-prefix sequence counters, seeded at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCounters(BTreeMap<String, u64>);

impl Default for CodeCounters {
    fn default() -> Self {
        Self(known_prefixes().map(|p| (p.to_string(), 0)).collect())
    }
}

impl CodeCounters {
    pub fn get(&self, prefix: &str) -> u64 {
        self.0.get(prefix).copied().unwrap_or(0)
    }

    fn bump(&mut self, prefix: &str) -> u64 {
        let counter = self.0.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    fn raise_to(&mut self, prefix: &str, number: u64) {
        let counter = self.0.entry(prefix.to_string()).or_insert(0);
        *counter = Ord::max(*counter, number);
    }
}

/// The slice of a machine the repair pass looks at.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CodeRow {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub machine_code: Option<String>,
}

/// Why a code is being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Missing,
    RetiredPrefix,
    WrongPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRewrite {
    pub id: i32,
    pub title: String,
    pub from: Option<String>,
    pub to: String,
    pub reason: StaleReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub id: i32,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairPlan {
    pub rewrites: Vec<CodeRewrite>,
    pub skipped: Vec<SkippedRow>,
    pub counters: CodeCounters,
}

fn stale_reason(code: Option<&str>, prefix: &str) -> Option<StaleReason> {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return Some(StaleReason::Missing);
    };
    if RETIRED_PREFIXES.iter().any(|retired| has_prefix(code, retired)) {
        return Some(StaleReason::RetiredPrefix);
    }
    if !has_prefix(code, prefix) {
        return Some(StaleReason::WrongPrefix);
    }
    None
}

/// Plan code rewrites for `rows`, visited in the given order.
///
/// A fresh code is never one already held by another row; the counter keeps
/// climbing until a free value is found.
pub fn plan_repair(rows: &[CodeRow], mut counters: CodeCounters) -> RepairPlan {
    let mut owners: HashMap<String, i32> = rows
        .iter()
        .filter_map(|r| r.machine_code.clone().map(|code| (code, r.id)))
        .collect();
    let mut rewrites = Vec::new();
    let mut skipped = Vec::new();

    for row in rows {
        let Some(prefix) = prefix_for(&row.category) else {
            skipped.push(SkippedRow {
                id: row.id,
                title: row.title.clone(),
                category: row.category.clone(),
            });
            continue;
        };

        let current = row.machine_code.as_deref();
        match stale_reason(current, prefix) {
            None => {
                if let Some(number) = current.and_then(parse_number) {
                    counters.raise_to(prefix, number);
                }
            }
            Some(reason) => {
                let mut code = format_code(prefix, counters.bump(prefix));
                while owners.get(&code).is_some_and(|owner| *owner != row.id) {
                    code = format_code(prefix, counters.bump(prefix));
                }

                if let Some(old) = current {
                    owners.remove(old);
                }
                owners.insert(code.clone(), row.id);

                rewrites.push(CodeRewrite {
                    id: row.id,
                    title: row.title.clone(),
                    from: current.map(str::to_string),
                    to: code,
                    reason,
                });
            }
        }
    }

    RepairPlan {
        rewrites,
        skipped,
        counters,
    }
}

/// Load every machine, plan the repair, and (unless `dry_run`) persist it.
pub async fn repair_codes(
    db: &DatabaseConnection,
    counters: CodeCounters,
    dry_run: bool,
) -> Result<RepairPlan, DbErr> {
    let rows = machine::Entity::find()
        .select_only()
        .column(machine::Column::Id)
        .column(machine::Column::Title)
        .column(machine::Column::Category)
        .column(machine::Column::MachineCode)
        .order_by_asc(machine::Column::Id)
        .into_model::<CodeRow>()
        .all(db)
        .await?;

    let plan = plan_repair(&rows, counters);

    for row in &plan.skipped {
        info!(
            id = row.id,
            title = %row.title,
            category = %row.category,
            "Skipping machine: category has no code prefix"
        );
    }

    if dry_run {
        for rewrite in &plan.rewrites {
            info!(
                id = rewrite.id,
                from = ?rewrite.from,
                to = %rewrite.to,
                reason = ?rewrite.reason,
                "Would rewrite machine code"
            );
        }
        return Ok(plan);
    }

    // Clear stale codes first so a rewrite never collides with a code that
    // is itself about to move.
    let txn = db.begin().await?;
    let moving: Vec<i32> = plan
        .rewrites
        .iter()
        .filter(|r| r.from.is_some())
        .map(|r| r.id)
        .collect();
    if !moving.is_empty() {
        machine::Entity::update_many()
            .col_expr(machine::Column::MachineCode, Expr::value(Option::<String>::None))
            .filter(machine::Column::Id.is_in(moving))
            .exec(&txn)
            .await?;
    }
    for rewrite in &plan.rewrites {
        machine::Entity::update_many()
            .col_expr(machine::Column::MachineCode, Expr::value(rewrite.to.clone()))
            .filter(machine::Column::Id.eq(rewrite.id))
            .exec(&txn)
            .await?;
        info!(
            id = rewrite.id,
            title = %rewrite.title,
            from = ?rewrite.from,
            to = %rewrite.to,
            "Rewrote machine code"
        );
    }
    txn.commit().await?;

    Ok(plan)
}
