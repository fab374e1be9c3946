use std::sync::Arc;

use common::storage::AssetHost;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use super::reconcile::CleanupPlan;
use crate::config::CleanupMode;

/// Outcome of executing a [`CleanupPlan`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    /// The host had nothing under the identifier.
    pub missing: usize,
    pub failed: usize,
}

/// Destroy every identifier in `plan`, concurrently and best effort.
///
/// A failed deletion is logged and never stops the others.
pub async fn execute(host: &dyn AssetHost, plan: &CleanupPlan) -> CleanupReport {
    for url in &plan.skipped {
        debug!(url, "No provider identifier for image, leaving it in storage");
    }

    let outcomes = join_all(plan.public_ids.iter().map(|public_id| async move {
        (public_id, host.destroy(public_id).await)
    }))
    .await;

    let mut report = CleanupReport::default();
    for (public_id, outcome) in outcomes {
        match outcome {
            Ok(true) => {
                debug!(public_id, "Deleted image");
                report.deleted += 1;
            }
            Ok(false) => {
                warn!(public_id, "Image to delete was not found on the asset host");
                report.missing += 1;
            }
            Err(e) => {
                error!(public_id, error = %e, "Failed to delete image");
                report.failed += 1;
            }
        }
    }

    if !plan.public_ids.is_empty() {
        info!(
            deleted = report.deleted,
            missing = report.missing,
            failed = report.failed,
            "Image cleanup finished"
        );
    }
    report
}

/// Run `plan` after a committed mutation, either awaited or on a spawned task.
pub async fn dispatch(host: Arc<dyn AssetHost>, mode: CleanupMode, plan: CleanupPlan) {
    if plan.public_ids.is_empty() && plan.skipped.is_empty() {
        return;
    }
    match mode {
        CleanupMode::Inline => {
            execute(host.as_ref(), &plan).await;
        }
        CleanupMode::Background => {
            tokio::spawn(async move {
                execute(host.as_ref(), &plan).await;
            });
        }
    }
}
