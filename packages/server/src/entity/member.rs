use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Read-only replica of the member directory. This service never creates or
/// mutates members; rows exist for foreign keys and authorship comparisons.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,
    pub nickname: String,

    #[sea_orm(has_many, via = "member_challenge")]
    pub challenges: HasMany<super::challenge::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
