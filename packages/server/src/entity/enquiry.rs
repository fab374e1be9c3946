use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enquiry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One of: rental, sales, parts, contact.
    #[sea_orm(indexed)]
    pub enquiry_type: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub mobile: String,
    pub email: Option<String>,

    /// Machine the enquiry was raised from, if any.
    pub machine_id: Option<i32>,
    pub machine_title: Option<String>,

    #[sea_orm(default_value = false, indexed)]
    pub is_read: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
