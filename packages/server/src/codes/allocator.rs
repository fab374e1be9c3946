use sea_orm::sea_query::{Expr, Func};
use sea_orm::*;
use tracing::{debug, warn};

use super::{format_code, parse_number, prefix_for};
use crate::entity::machine;
use crate::error::AppError;

/// How many codes creation tries before giving up with a conflict.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 3;

const SCAN_PAGE_SIZE: u64 = 16;

/// Number of the greatest well-formed code for `prefix`, or 0 if none.
///
/// Codes are ranked by length, then text, so `EXE-10000` outranks
/// `EXE-9999`. Codes whose suffix is not a number are passed over.
pub async fn latest_number<C: ConnectionTrait>(db: &C, prefix: &str) -> Result<u64, DbErr> {
    let mut pages = machine::Entity::find()
        .select_only()
        .column(machine::Column::MachineCode)
        .filter(machine::Column::MachineCode.starts_with(format!("{prefix}-")))
        .order_by_desc(Expr::expr(Func::char_length(Expr::col(
            machine::Column::MachineCode,
        ))))
        .order_by_desc(machine::Column::MachineCode)
        .into_tuple::<Option<String>>()
        .paginate(db, SCAN_PAGE_SIZE);

    while let Some(codes) = pages.fetch_and_next().await? {
        if let Some(number) = codes.iter().flatten().find_map(|code| parse_number(code)) {
            return Ok(number);
        }
    }
    Ok(0)
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Insert a new machine, assigning its code from its category.
///
/// Mapped categories always get an allocated code and ignore `supplied`.
/// Unmapped categories keep `supplied` as-is (possibly `None`). The unique
/// index on `machine_code` is the reservation. On a collision the latest code
/// is read again and the next try is above both it and the number that
/// collided; after [`MAX_ALLOCATION_ATTEMPTS`] the caller gets a conflict.
pub async fn insert_machine<C: ConnectionTrait>(
    db: &C,
    draft: machine::ActiveModel,
    category: &str,
    supplied: Option<String>,
) -> Result<machine::Model, AppError> {
    let Some(prefix) = prefix_for(category) else {
        let mut candidate = draft;
        candidate.machine_code = Set(supplied);
        return candidate.insert(db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Machine code is already in use".into())
            } else {
                AppError::from(e)
            }
        });
    };

    if let Some(ref code) = supplied {
        debug!(code, category, "Ignoring client-supplied machine code for mapped category");
    }

    let mut taken = 0;
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let number = Ord::max(latest_number(db, prefix).await?, taken) + 1;
        let code = format_code(prefix, number);
        let mut candidate = draft.clone();
        candidate.machine_code = Set(Some(code.clone()));

        match candidate.insert(db).await {
            Ok(model) => {
                debug!(code, attempt, "Allocated machine code");
                return Ok(model);
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(code, attempt, "Machine code already taken");
                taken = number;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Conflict(format!(
        "Could not allocate a unique {prefix} machine code, please retry"
    )))
}
