use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, validate_title};
use crate::entity::{challenge, member_challenge};
use crate::error::AppError;

/// Valid challenge category codes: 0 exercise, 1 study, 2 habit, 3 hobby.
pub const CATEGORY_RANGE: std::ops::RangeInclusive<i16> = 0..=3;

pub fn validate_category(category: i16) -> Result<(), AppError> {
    if !CATEGORY_RANGE.contains(&category) {
        return Err(AppError::Validation(format!(
            "Category must be between {} and {}",
            CATEGORY_RANGE.start(),
            CATEGORY_RANGE.end()
        )));
    }
    Ok(())
}

/// Listing order. An absent `sort-by` defaults to popularity; an
/// unrecognized value is a validation error, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Creation time, newest first.
    Newest,
    /// View count, highest first.
    Popularity,
}

impl SortKey {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None => Ok(SortKey::Popularity),
            Some("newest") => Ok(SortKey::Newest),
            Some("popularity") => Ok(SortKey::Popularity),
            Some(other) => Err(AppError::Validation(format!(
                "sort-by must be one of: newest, popularity (got '{other}')"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request DTOs (the JSON parts of the multipart bodies)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateChallengeRequest {
    pub title: String,
    pub category: i16,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize, Default, PartialEq)]
pub struct UpdateChallengeRequest {
    pub title: Option<String>,
    pub category: Option<i16>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChallengeListQuery {
    /// Listing order: `newest` or `popularity` (default).
    #[serde(rename = "sort-by")]
    pub sort_by: Option<String>,
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size, clamped to 1-100.
    pub size: Option<u64>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChallengeSearchQuery {
    /// Case-insensitive substring matched against challenge titles.
    #[serde(rename = "searchTitle")]
    pub search_title: String,
    #[serde(rename = "sort-by")]
    pub sort_by: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Derived participation state. Never stored; recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Active,
    Completed,
    Failed,
}

/// Challenge metadata visible to everyone.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChallengeSummary {
    pub id: i32,
    pub title: String,
    pub category: i16,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rep_image_url: Option<String>,
    pub example_image_urls: Vec<String>,
    pub view_count: i64,
    pub author_id: i32,
    /// Derived from the participation ledger, never stored on the challenge.
    pub participant_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The requesting caller's own certification progress. Never contains
/// another member's data.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MyParticipation {
    pub participated_at: DateTime<Utc>,
    pub cert_image_url: Option<String>,
    pub cert_count: i32,
    pub last_cert_at: Option<DateTime<Utc>>,
    /// Percent of window days certified, capped at 100.
    pub success_rate: u8,
    pub status: ParticipationStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChallengeDetail {
    #[serde(flatten)]
    pub summary: ChallengeSummary,
    pub my_participation: MyParticipation,
}

/// The two visibility-gated projections of a challenge.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum ChallengeView {
    Summary(Box<ChallengeSummary>),
    Detail(Box<ChallengeDetail>),
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ChallengeListItem {
    pub id: i32,
    pub title: String,
    pub category: i16,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rep_image_id: Option<Uuid>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChallengeListResponse {
    pub data: Vec<ChallengeListItem>,
    pub pagination: Pagination,
}

/// Autocomplete entry for the title search box.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ChallengeTitle {
    pub id: i32,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Public URL under which a stored image is served.
pub fn image_url(id: Uuid) -> String {
    format!("/images/{id}")
}

/// Number of days in the challenge window, inclusive on both ends.
pub fn window_days(challenge: &challenge::Model) -> i64 {
    (challenge.end_date - challenge.start_date).num_days() + 1
}

pub fn success_rate(challenge: &challenge::Model, record: &member_challenge::Model) -> u8 {
    let days = window_days(challenge).max(1);
    ((record.cert_count as i64 * 100) / days).min(100) as u8
}

pub fn participation_status(
    challenge: &challenge::Model,
    record: &member_challenge::Model,
    today: NaiveDate,
) -> ParticipationStatus {
    if today <= challenge.end_date {
        ParticipationStatus::Active
    } else if record.cert_count as i64 >= window_days(challenge) {
        ParticipationStatus::Completed
    } else {
        ParticipationStatus::Failed
    }
}

/// The single pure projection behind the visibility gate: a caller with a
/// ledger row for this challenge gets the Detail shape, anyone else the
/// Summary shape. Re-derived on every request, never cached.
pub fn compose_view(
    challenge: &challenge::Model,
    example_image_ids: &[Uuid],
    participant_count: u64,
    viewer: Option<&member_challenge::Model>,
    today: NaiveDate,
) -> ChallengeView {
    let summary = ChallengeSummary {
        id: challenge.id,
        title: challenge.title.clone(),
        category: challenge.category,
        description: challenge.description.clone(),
        start_date: challenge.start_date,
        end_date: challenge.end_date,
        rep_image_url: challenge.rep_image_id.map(image_url),
        example_image_urls: example_image_ids.iter().copied().map(image_url).collect(),
        view_count: challenge.view_count,
        author_id: challenge.author_id,
        participant_count,
        created_at: challenge.created_at,
        updated_at: challenge.updated_at,
    };

    match viewer {
        Some(record) => ChallengeView::Detail(Box::new(ChallengeDetail {
            my_participation: MyParticipation {
                participated_at: record.participated_at,
                cert_image_url: record.cert_image_id.map(image_url),
                cert_count: record.cert_count,
                last_cert_at: record.last_cert_at,
                success_rate: success_rate(challenge, record),
                status: participation_status(challenge, record, today),
            },
            summary,
        })),
        None => ChallengeView::Summary(Box::new(summary)),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.trim().is_empty() || description.len() > 1_000_000 {
        return Err(AppError::Validation(
            "Description must be non-empty and at most 1MB".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_challenge(req: &CreateChallengeRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_category(req.category)?;
    validate_description(&req.description)?;
    if req.end_date < req.start_date {
        return Err(AppError::Validation(
            "end_date must not be before start_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_challenge(req: &UpdateChallengeRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(category) = req.category {
        validate_category(category)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let (Some(start), Some(end)) = (req.start_date, req.end_date) {
        if end < start {
            return Err(AppError::Validation(
                "end_date must not be before start_date".into(),
            ));
        }
    }
    Ok(())
}
