use std::sync::Arc;

use common::storage::AssetHost;
use sea_orm::DatabaseConnection;

use crate::assets::{CleanupPlan, cleanup};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub assets: Arc<dyn AssetHost>,
}

impl AppState {
    /// Storage folder uploads go to and legacy identifiers are derived from.
    pub fn asset_folder(&self) -> &str {
        &self.config.assets.folder
    }

    /// Execute a cleanup plan with the configured mode. Call only after the
    /// mutation that orphaned the images has committed.
    pub async fn cleanup(&self, plan: CleanupPlan) {
        cleanup::dispatch(self.assets.clone(), self.config.assets.cleanup, plan).await;
    }
}
