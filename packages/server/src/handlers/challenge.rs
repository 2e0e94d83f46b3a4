use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{NaiveDate, Utc};
use common::storage::{ContentHash, ImageStore};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{challenge, image, member_challenge};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthMember, MaybeAuthMember, resolve_member};
use crate::models::challenge::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::filename::validate_image_filename;

pub fn image_upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024) // 64 MB
}

#[utoipa::path(
    post,
    path = "/challenges",
    tag = "Challenges",
    operation_id = "createChallenge",
    summary = "Create a new challenge",
    description = "Creates a challenge from a multipart body: a `post` JSON part (title, \
        category 0-3, description, start/end dates) plus an optional `rep` representative \
        image and any number of `example` images. Images are persisted to the image store \
        before the challenge row is written, so a failed upload never leaves a partial \
        challenge behind.",
    request_body(content_type = "multipart/form-data", description = "`post` JSON part + optional image parts"),
    responses(
        (status = 201, description = "Challenge created", body = ChallengeView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, IDENTITY_UNRESOLVED)", body = ErrorBody),
        (status = 502, description = "Image store failure (UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, multipart), fields(member_id = auth.member_id))]
pub async fn create_challenge(
    auth: AuthMember,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let parts = read_challenge_parts(&mut multipart, Some("post")).await?;
    let payload: CreateChallengeRequest = parse_data_part(parts.data, "post")?;
    validate_create_challenge(&payload)?;
    let author = resolve_member(&state.db, &auth).await?;

    // Uploads must complete before any challenge row is written.
    let rep = match parts.rep {
        Some(img) => {
            let hash = state.images.put(&img.bytes).await?;
            Some((img, hash))
        }
        None => None,
    };
    let mut examples = Vec::with_capacity(parts.examples.len());
    for img in parts.examples {
        let hash = state.images.put(&img.bytes).await?;
        examples.push((img, hash));
    }

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let mut model = challenge::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        category: Set(payload.category),
        description: Set(payload.description),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        view_count: Set(0),
        author_id: Set(author.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let owner_id = model.id.to_string();
    if let Some((img, hash)) = rep {
        let row =
            insert_image_row(&txn, image::OWNER_CHALLENGE_REP, &owner_id, &img, &hash).await?;
        let mut active: challenge::ActiveModel = model.into();
        active.rep_image_id = Set(Some(row.id));
        model = active.update(&txn).await?;
    }
    let mut example_ids = Vec::with_capacity(examples.len());
    for (img, hash) in &examples {
        let row =
            insert_image_row(&txn, image::OWNER_CHALLENGE_EXAMPLE, &owner_id, img, hash).await?;
        example_ids.push(row.id);
    }

    txn.commit().await?;

    tracing::info!(challenge_id = model.id, author_id = author.id, "Created challenge");

    let view = compose_view(&model, &example_ids, 0, None, today());
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    patch,
    path = "/challenges/{challenge_id}",
    tag = "Challenges",
    operation_id = "updateChallenge",
    summary = "Update an existing challenge",
    description = "Partially updates a challenge using PATCH semantics: only fields present \
        in the `patch` JSON part are applied, and rep/example images are replaced only when \
        new files are supplied. Only the author may update a challenge. Cross-field date \
        validation merges the patch with stored values.",
    params(("challenge_id" = i32, Path, description = "Challenge ID")),
    request_body(content_type = "multipart/form-data", description = "`patch` JSON part + optional image parts"),
    responses(
        (status = 200, description = "Challenge updated", body = ChallengeView),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, multipart), fields(challenge_id, member_id = auth.member_id))]
pub async fn update_challenge(
    auth: AuthMember,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ChallengeView>, AppError> {
    let parts = read_challenge_parts(&mut multipart, Some("patch")).await?;
    let payload: UpdateChallengeRequest = parse_data_part(parts.data, "patch")?;
    validate_update_challenge(&payload)?;

    let existing = find_challenge(&state.db, challenge_id).await?;
    require_author(&auth, &existing)?;

    // Uploads complete before the transaction opens.
    let rep = match parts.rep {
        Some(img) => {
            let hash = state.images.put(&img.bytes).await?;
            Some((img, hash))
        }
        None => None,
    };
    let mut examples = Vec::with_capacity(parts.examples.len());
    for img in parts.examples {
        let hash = state.images.put(&img.bytes).await?;
        examples.push((img, hash));
    }

    let txn = state.db.begin().await?;
    let existing = find_challenge_for_update(&txn, challenge_id).await?;

    // Cross-field date validation against stored values.
    let effective_start = payload.start_date.unwrap_or(existing.start_date);
    let effective_end = payload.end_date.unwrap_or(existing.end_date);
    if effective_end < effective_start {
        return Err(AppError::Validation(
            "end_date must not be before start_date".into(),
        ));
    }

    let owner_id = existing.id.to_string();
    let old_rep = existing.rep_image_id;
    let mut active: challenge::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(start_date) = payload.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = payload.end_date {
        active.end_date = Set(end_date);
    }

    if let Some((img, hash)) = rep {
        let row =
            insert_image_row(&txn, image::OWNER_CHALLENGE_REP, &owner_id, &img, &hash).await?;
        if let Some(old) = old_rep {
            image::Entity::delete_by_id(old).exec(&txn).await?;
        }
        active.rep_image_id = Set(Some(row.id));
    }

    if !examples.is_empty() {
        image::Entity::delete_many()
            .filter(image::Column::OwnerType.eq(image::OWNER_CHALLENGE_EXAMPLE))
            .filter(image::Column::OwnerId.eq(&owner_id))
            .exec(&txn)
            .await?;
        for (img, hash) in &examples {
            insert_image_row(&txn, image::OWNER_CHALLENGE_EXAMPLE, &owner_id, img, hash).await?;
        }
    }

    active.updated_at = Set(Utc::now());
    let model = active.update(&txn).await?;
    let example_ids = example_image_ids(&txn, model.id).await?;
    txn.commit().await?;

    let count = participant_count(&state.db, model.id).await?;
    Ok(Json(compose_view(&model, &example_ids, count, None, today())))
}

#[utoipa::path(
    post,
    path = "/challenges/participate/{challenge_id}",
    tag = "Challenges",
    operation_id = "participateChallenge",
    summary = "Join a challenge",
    description = "Creates the caller's participation record for the challenge. The \
        (challenge, member) pair is unique at the store level; joining twice returns 409. \
        Joining a challenge whose window has ended is rejected.",
    params(("challenge_id" = i32, Path, description = "Challenge ID")),
    responses(
        (status = 201, description = "Joined; detail view for the new participant", body = ChallengeView),
        (status = 400, description = "Challenge has ended (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, IDENTITY_UNRESOLVED)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already participating (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth), fields(challenge_id, member_id = auth.member_id))]
pub async fn participate_challenge(
    auth: AuthMember,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let member = resolve_member(&state.db, &auth).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let challenge_model = find_challenge_for_update(&txn, challenge_id).await?;

    if today() > challenge_model.end_date {
        return Err(AppError::Validation("Challenge has already ended".into()));
    }

    let new_record = member_challenge::ActiveModel {
        challenge_id: Set(challenge_id),
        member_id: Set(member.id),
        participated_at: Set(now),
        cert_image_id: Set(None),
        cert_count: Set(0),
        last_cert_at: Set(None),
    };

    let record = match new_record.insert(&txn).await {
        Ok(record) => record,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(
                "Already participating in this challenge".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };
    txn.commit().await?;

    tracing::info!(challenge_id, member_id = member.id, "Member joined challenge");

    let example_ids = example_image_ids(&state.db, challenge_id).await?;
    let count = participant_count(&state.db, challenge_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(compose_view(
            &challenge_model,
            &example_ids,
            count,
            Some(&record),
            today(),
        )),
    ))
}

#[utoipa::path(
    patch,
    path = "/challenges/cert/{challenge_id}",
    tag = "Challenges",
    operation_id = "certifyChallenge",
    summary = "Submit certification evidence",
    description = "Records a certification photo (`cert` multipart part) against the \
        caller's participation record. Only participants may certify; the membership check \
        precedes the upload. The record keeps the most recent image plus a running count \
        and timestamp.",
    params(("challenge_id" = i32, Path, description = "Challenge ID")),
    request_body(content_type = "multipart/form-data", description = "`cert` image part"),
    responses(
        (status = 201, description = "Certification recorded; detail view", body = ChallengeView),
        (status = 400, description = "Missing or invalid image (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID, IDENTITY_UNRESOLVED)", body = ErrorBody),
        (status = 403, description = "Caller is not a participant (NOT_PARTICIPANT)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Image store failure (UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth, multipart), fields(challenge_id, member_id = auth.member_id))]
pub async fn certify_challenge(
    auth: AuthMember,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let parts = read_challenge_parts(&mut multipart, None).await?;
    let cert = parts
        .cert
        .ok_or_else(|| AppError::Validation("Missing 'cert' image".into()))?;

    let member = resolve_member(&state.db, &auth).await?;
    let challenge_model = find_challenge(&state.db, challenge_id).await?;

    // Membership gate precedes the upload so non-participants cannot write
    // to the image store.
    member_challenge::Entity::find_by_id((challenge_id, member.id))
        .one(&state.db)
        .await?
        .ok_or(AppError::NotParticipant)?;

    let hash = state.images.put(&cert.bytes).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let record = find_participation_for_update(&txn, challenge_id, member.id).await?;

    let cert_owner = format!("{challenge_id}:{}", member.id);
    let row = insert_image_row(&txn, image::OWNER_CERTIFICATION, &cert_owner, &cert, &hash).await?;

    let old_image = record.cert_image_id;
    let cert_count = record.cert_count;
    let mut active: member_challenge::ActiveModel = record.into();
    active.cert_image_id = Set(Some(row.id));
    active.cert_count = Set(cert_count + 1);
    active.last_cert_at = Set(Some(now));
    let record = active.update(&txn).await?;

    // Only the most recent certification reference is kept.
    if let Some(old) = old_image {
        image::Entity::delete_by_id(old).exec(&txn).await?;
    }
    txn.commit().await?;

    tracing::info!(
        challenge_id,
        member_id = record.member_id,
        cert_count = record.cert_count,
        "Recorded certification"
    );

    let example_ids = example_image_ids(&state.db, challenge_id).await?;
    let count = participant_count(&state.db, challenge_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(compose_view(
            &challenge_model,
            &example_ids,
            count,
            Some(&record),
            today(),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/challenges/{challenge_id}",
    tag = "Challenges",
    operation_id = "getChallenge",
    summary = "Fetch a challenge, visibility-gated",
    description = "Returns the Summary shape for anonymous callers and non-participants, \
        and the Detail shape — scoped strictly to the caller's own certification data — \
        for participants. Every read bumps the view counter with a store-level atomic \
        increment (best-effort, no per-viewer dedup).",
    params(("challenge_id" = i32, Path, description = "Challenge ID")),
    responses(
        (status = 200, description = "Challenge view", body = ChallengeView),
        (status = 401, description = "Invalid credential (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(challenge_id))]
pub async fn get_challenge(
    viewer: MaybeAuthMember,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
) -> Result<Json<ChallengeView>, AppError> {
    // Bump first; the read below then observes its own increment. Zero rows
    // affected means the challenge does not exist.
    let bumped = challenge::Entity::update_many()
        .col_expr(
            challenge::Column::ViewCount,
            Expr::col(challenge::Column::ViewCount).add(1),
        )
        .filter(challenge::Column::Id.eq(challenge_id))
        .exec(&state.db)
        .await?;
    if bumped.rows_affected == 0 {
        return Err(AppError::NotFound("Challenge not found".into()));
    }

    let challenge_model = find_challenge(&state.db, challenge_id).await?;
    let example_ids = example_image_ids(&state.db, challenge_id).await?;
    let count = participant_count(&state.db, challenge_id).await?;

    let participation = match &viewer.0 {
        Some(auth) => {
            member_challenge::Entity::find_by_id((challenge_id, auth.member_id))
                .one(&state.db)
                .await?
        }
        None => None,
    };

    Ok(Json(compose_view(
        &challenge_model,
        &example_ids,
        count,
        participation.as_ref(),
        today(),
    )))
}

#[utoipa::path(
    delete,
    path = "/challenges/{challenge_id}",
    tag = "Challenges",
    operation_id = "deleteChallenge",
    summary = "Delete a challenge",
    description = "Permanently deletes a challenge and cascade-deletes its participation \
        records and image bookkeeping rows. Only the author may delete.",
    params(("challenge_id" = i32, Path, description = "Challenge ID")),
    responses(
        (status = 204, description = "Challenge deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Caller is not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Challenge not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth), fields(challenge_id, member_id = auth.member_id))]
pub async fn delete_challenge(
    auth: AuthMember,
    State(state): State<AppState>,
    Path(challenge_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let challenge_model = find_challenge_for_update(&txn, challenge_id).await?;
    require_author(&auth, &challenge_model)?;

    let owner_id = challenge_id.to_string();
    image::Entity::delete_many()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(image::Column::OwnerType.is_in([
                            image::OWNER_CHALLENGE_REP,
                            image::OWNER_CHALLENGE_EXAMPLE,
                        ]))
                        .add(image::Column::OwnerId.eq(&owner_id)),
                )
                .add(
                    Condition::all()
                        .add(image::Column::OwnerType.eq(image::OWNER_CERTIFICATION))
                        .add(image::Column::OwnerId.starts_with(format!("{challenge_id}:"))),
                ),
        )
        .exec(&txn)
        .await?;
    member_challenge::Entity::delete_many()
        .filter(member_challenge::Column::ChallengeId.eq(challenge_id))
        .exec(&txn)
        .await?;
    challenge::Entity::delete_by_id(challenge_id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(challenge_id, member_id = auth.member_id, "Deleted challenge");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/challenges/all/{category_id}",
    tag = "Challenges",
    operation_id = "listChallengesInCategory",
    summary = "List challenges in a category",
    description = "Paginated listing of all challenges in a category (0-3). `sort-by` is \
        `newest` or `popularity` (default); an unrecognized value is a validation error. \
        Out-of-range pages return an empty list, not an error.",
    params(
        ("category_id" = i16, Path, description = "Category code (0-3)"),
        ChallengeListQuery,
    ),
    responses(
        (status = 200, description = "Page of challenges", body = ChallengeListResponse),
        (status = 400, description = "Invalid category or sort key (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(category_id))]
pub async fn list_challenges_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<i16>,
    Query(query): Query<ChallengeListQuery>,
) -> Result<Json<ChallengeListResponse>, AppError> {
    validate_category(category_id)?;
    let sort = SortKey::parse(query.sort_by.as_deref())?;
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.size.unwrap_or(10).clamp(1, 100);

    let select = challenge::Entity::find().filter(challenge::Column::Category.eq(category_id));
    let response = page_challenges(&state.db, select, sort, page, per_page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/challenges/search",
    tag = "Challenges",
    operation_id = "searchChallenges",
    summary = "Search challenges by title",
    description = "Case-insensitive substring search on challenge titles with the same \
        sorting and pagination contract as the category listing. An empty result set is an \
        empty page, not an error.",
    params(ChallengeSearchQuery),
    responses(
        (status = 200, description = "Page of matching challenges", body = ChallengeListResponse),
        (status = 400, description = "Invalid sort key (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn search_challenges(
    State(state): State<AppState>,
    Query(query): Query<ChallengeSearchQuery>,
) -> Result<Json<ChallengeListResponse>, AppError> {
    let sort = SortKey::parse(query.sort_by.as_deref())?;
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.size.unwrap_or(10).clamp(1, 100);

    let mut select = challenge::Entity::find();
    let term = escape_like(query.search_title.trim());
    if !term.is_empty() {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(challenge::Column::Title)))
                .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
        );
    }

    let response = page_challenges(&state.db, select, sort, page, per_page).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/challenges/titles",
    tag = "Challenges",
    operation_id = "listChallengeTitles",
    summary = "List all challenge titles",
    description = "Unpaginated id+title list backing the search box autocomplete.",
    responses(
        (status = 200, description = "All challenge titles", body = Vec<ChallengeTitle>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_challenge_titles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChallengeTitle>>, AppError> {
    let titles = challenge::Entity::find()
        .select_only()
        .column(challenge::Column::Id)
        .column(challenge::Column::Title)
        .into_model::<ChallengeTitle>()
        .all(&state.db)
        .await?;
    Ok(Json(titles))
}

// ---------------------------------------------------------------------------
// Multipart plumbing
// ---------------------------------------------------------------------------

struct UploadedImage {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ChallengeParts {
    /// The JSON data part (`post` or `patch`), when one was requested.
    data: Option<String>,
    rep: Option<UploadedImage>,
    examples: Vec<UploadedImage>,
    cert: Option<UploadedImage>,
}

async fn read_challenge_parts(
    multipart: &mut Multipart,
    data_part: Option<&str>,
) -> Result<ChallengeParts, AppError> {
    let mut parts = ChallengeParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(name) if Some(name) == data_part => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read '{name}' part: {e}"))
                })?;
                parts.data = Some(text);
            }
            Some("rep") => parts.rep = Some(read_image_field(field).await?),
            Some("example") => parts.examples.push(read_image_field(field).await?),
            Some("cert") => parts.cert = Some(read_image_field(field).await?),
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(parts)
}

async fn read_image_field(field: Field<'_>) -> Result<UploadedImage, AppError> {
    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Validation("Image field must have a filename".into()))?;
    let filename = validate_image_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    let content_type = mime_guess::from_path(&filename)
        .first()
        .map(|m| m.to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read image '{filename}': {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("Image '{filename}' is empty")));
    }

    Ok(UploadedImage {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn parse_data_part<T: serde::de::DeserializeOwned>(
    raw: Option<String>,
    part: &str,
) -> Result<T, AppError> {
    let raw = raw.ok_or_else(|| AppError::Validation(format!("Missing '{part}' part")))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Validation(format!("Malformed '{part}' part: {e}")))
}

// ---------------------------------------------------------------------------
// Shared lifecycle helpers
// ---------------------------------------------------------------------------

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The single authorship predicate behind update and delete.
fn require_author(auth: &AuthMember, challenge: &challenge::Model) -> Result<(), AppError> {
    if challenge.author_id == auth.member_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

async fn find_challenge<C: ConnectionTrait>(db: &C, id: i32) -> Result<challenge::Model, AppError> {
    challenge::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))
}

async fn find_challenge_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<challenge::Model, AppError> {
    use sea_orm::sea_query::LockType;
    challenge::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".into()))
}

async fn find_participation_for_update(
    txn: &DatabaseTransaction,
    challenge_id: i32,
    member_id: i32,
) -> Result<member_challenge::Model, AppError> {
    use sea_orm::sea_query::LockType;
    member_challenge::Entity::find_by_id((challenge_id, member_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::NotParticipant)
}

async fn insert_image_row<C: ConnectionTrait>(
    db: &C,
    owner_type: &str,
    owner_id: &str,
    img: &UploadedImage,
    hash: &ContentHash,
) -> Result<image::Model, AppError> {
    let row = image::ActiveModel {
        id: Set(Uuid::now_v7()),
        owner_type: Set(owner_type.to_string()),
        owner_id: Set(owner_id.to_string()),
        content_hash: Set(hash.to_hex()),
        filename: Set(img.filename.clone()),
        content_type: Set(img.content_type.clone()),
        size: Set(img.bytes.len() as i64),
        created_at: Set(Utc::now()),
    };
    Ok(row.insert(db).await?)
}

/// IDs of a challenge's example images, in upload order.
async fn example_image_ids<C: ConnectionTrait>(
    db: &C,
    challenge_id: i32,
) -> Result<Vec<Uuid>, AppError> {
    let ids = image::Entity::find()
        .filter(image::Column::OwnerType.eq(image::OWNER_CHALLENGE_EXAMPLE))
        .filter(image::Column::OwnerId.eq(challenge_id.to_string()))
        .order_by_asc(image::Column::CreatedAt)
        .select_only()
        .column(image::Column::Id)
        .into_tuple::<Uuid>()
        .all(db)
        .await?;
    Ok(ids)
}

/// Participant count is derived from the ledger, never stored on the
/// challenge, so it cannot drift.
async fn participant_count<C: ConnectionTrait>(
    db: &C,
    challenge_id: i32,
) -> Result<u64, AppError> {
    let count = member_challenge::Entity::find()
        .filter(member_challenge::Column::ChallengeId.eq(challenge_id))
        .count(db)
        .await?;
    Ok(count)
}

async fn page_challenges(
    db: &DatabaseConnection,
    select: Select<challenge::Entity>,
    sort: SortKey,
    page: u64,
    per_page: u64,
) -> Result<ChallengeListResponse, AppError> {
    let total = select
        .clone()
        .paginate(db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let select = match sort {
        SortKey::Newest => select.order_by_desc(challenge::Column::CreatedAt),
        SortKey::Popularity => select.order_by_desc(challenge::Column::ViewCount),
    };

    let data = select
        .select_only()
        .column(challenge::Column::Id)
        .column(challenge::Column::Title)
        .column(challenge::Column::Category)
        .column(challenge::Column::StartDate)
        .column(challenge::Column::EndDate)
        .column(challenge::Column::RepImageId)
        .column(challenge::Column::ViewCount)
        .column(challenge::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ChallengeListItem>()
        .all(db)
        .await?;

    Ok(ChallengeListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}
