use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The participation ledger: one row per (challenge, member) pair.
///
/// The composite primary key is the uniqueness guarantee — two concurrent
/// joins for the same pair race on the insert and the loser surfaces a
/// unique-constraint violation.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member_challenge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub challenge_id: i32,
    #[sea_orm(primary_key)]
    pub member_id: i32,
    #[sea_orm(belongs_to, from = "challenge_id", to = "id")]
    pub challenge: BelongsTo<super::challenge::Entity>,
    #[sea_orm(belongs_to, from = "member_id", to = "id")]
    pub member: BelongsTo<super::member::Entity>,

    pub participated_at: DateTimeUtc,

    /// Most recent certification image; older certifications only survive
    /// as `cert_count` / `last_cert_at`.
    pub cert_image_id: Option<Uuid>,
    pub cert_count: i32,
    pub last_cert_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
