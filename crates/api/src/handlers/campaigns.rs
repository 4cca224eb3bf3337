//! Handlers for the `/campaigns` resource.
//!
//! Responses carry a `phase` computed against the request time.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::campaigns::{validate_campaign, CampaignType};
use backoffice_core::error::CoreError;
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::campaign::{
    Campaign, CampaignListParams, CampaignView, CreateCampaign, UpdateCampaign,
};
use backoffice_db::repositories::CampaignRepo;
use chrono::Utc;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/campaigns
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CampaignListParams>,
) -> AppResult<Json<PaginatedResponse<CampaignView>>> {
    auth.require(Resource::Campaigns, Action::View)?;

    let now = Utc::now();
    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let (campaigns, total) =
        CampaignRepo::list(&state.pool, params.running, now, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: campaigns
            .into_iter()
            .map(|c| CampaignView::at(c, now))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CampaignView>>> {
    auth.require(Resource::Campaigns, Action::View)?;
    let campaign = find_campaign(&state, id).await?;
    Ok(Json(DataResponse::new(CampaignView::at(campaign, Utc::now()))))
}

/// POST /api/v1/campaigns
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCampaign>,
) -> AppResult<(StatusCode, Json<DataResponse<CampaignView>>)> {
    auth.require(Resource::Campaigns, Action::Create)?;
    validate_input(&input)?;
    CampaignType::parse(&input.campaign_type)?;
    validate_campaign(input.starts_at, input.ends_at, input.discount_percent)?;

    let campaign = CampaignRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, campaign_id = campaign.id, "Campaign created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(CampaignView::at(campaign, Utc::now()))),
    ))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<Json<DataResponse<CampaignView>>> {
    auth.require(Resource::Campaigns, Action::Update)?;
    validate_input(&input)?;
    if let Some(campaign_type) = input.campaign_type.as_deref() {
        CampaignType::parse(campaign_type)?;
    }

    let existing = find_campaign(&state, id).await?;
    validate_campaign(
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.unwrap_or(existing.ends_at),
        input.discount_percent.or(existing.discount_percent),
    )?;

    let campaign = CampaignRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Campaign", id })?;

    tracing::info!(user_id = auth.user_id, campaign_id = id, "Campaign updated");
    Ok(Json(DataResponse::new(CampaignView::at(campaign, Utc::now()))))
}

/// DELETE /api/v1/campaigns/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Campaigns, Action::Delete)?;

    if CampaignRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, campaign_id = id, "Campaign deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Campaign", id }.into())
    }
}

async fn find_campaign(state: &AppState, id: DbId) -> AppResult<Campaign> {
    Ok(CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Campaign", id })?)
}
