use sea_orm::*;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::entity::admin;
use crate::utils::hash;

/// Create the configured admin account if it does not exist yet.
///
/// An existing account is left alone, including its password.
pub async fn seed_admin(db: &DatabaseConnection, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        warn!("auth.admin_email / auth.admin_password not set, skipping admin seeding");
        return Ok(());
    };
    let email = email.trim().to_lowercase();

    let existing = admin::Entity::find()
        .filter(admin::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let hash = hash::hash_password(password)
        .map_err(|e| anyhow::anyhow!("Password hash error: {e}"))?;

    let model = admin::ActiveModel {
        email: Set(email.clone()),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(admin::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(email, "Seeded admin account"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
