use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect and bring the schema in line with the entities in [`crate::entity`].
///
/// Schema sync also creates the unique index on `machine.machine_code` that
/// code allocation relies on.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("horizon_server::entity::*")
        .sync(&db)
        .await?;
    info!("Database schema synced");

    Ok(db)
}

/// [`connect`] with default pool settings.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    connect(&DatabaseConfig::new(db_url)).await
}
