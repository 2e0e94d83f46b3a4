use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Owner kind for a challenge's representative image.
pub const OWNER_CHALLENGE_REP: &str = "challenge-rep";
/// Owner kind for a challenge's example images.
pub const OWNER_CHALLENGE_EXAMPLE: &str = "challenge-example";
/// Owner kind for certification photos; `owner_id` is
/// "{challenge_id}:{member_id}" and the image is private to that member.
pub const OWNER_CERTIFICATION: &str = "certification";

/// Bookkeeping row for an upload held in the content-addressed image store.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owner kind: "challenge-rep", "challenge-example" or "certification".
    pub owner_type: String,

    /// Owner ID in canonical string form: the challenge id, or
    /// "{challenge_id}:{member_id}" for certification images.
    pub owner_id: String,

    /// SHA-256 hex hash addressing the bytes in the image store.
    pub content_hash: String,

    /// Original upload filename.
    pub filename: String,

    /// MIME content type.
    pub content_type: Option<String>,

    /// Purposefully denormalized to avoid a store round-trip when serving.
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
