use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub author: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub images: serde_json::Value,

    /// Single image reference, or NULL.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub featured_image: Option<serde_json::Value>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
