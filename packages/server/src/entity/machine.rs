use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "machine")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(indexed)]
    pub category: String,
    /// Listing purpose, e.g. "Rental" or "Sales".
    #[sea_orm(indexed)]
    pub machine_type: String,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub hours: Option<i32>,
    /// Rich-text description.
    #[sea_orm(column_type = "Text")]
    pub condition: String,
    pub status: String,
    pub location: Option<String>,

    /// `<PREFIX>-<NNNN>`; assigned once at creation, never updated by handlers.
    #[sea_orm(unique)]
    pub machine_code: Option<String>,

    /// JSON array of image references (bare URL strings or `{url, public_id}`).
    #[sea_orm(column_type = "JsonBinary")]
    pub images: serde_json::Value,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
