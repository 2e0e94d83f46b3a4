use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "challenge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    /// Category code, 0..=3. See `models::challenge::CATEGORY_RANGE`.
    pub category: i16,
    pub description: String, // in Markdown

    /// Challenge window, inclusive on both ends.
    pub start_date: Date,
    pub end_date: Date,

    /// Representative image, if one was uploaded.
    pub rep_image_id: Option<Uuid>,

    /// Best-effort popularity counter, bumped atomically on every detail read.
    pub view_count: i64,

    /// The creating member; authorship gates update and delete.
    pub author_id: i32,

    #[sea_orm(has_many, via = "member_challenge")]
    pub members: HasMany<super::member::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
