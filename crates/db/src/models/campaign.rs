//! Campaign entity model and DTOs.

use backoffice_core::campaigns::CampaignPhase;
use backoffice_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A campaign row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub campaign_type: String,
    pub discount_percent: Option<i32>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_active: bool,
    pub budget: Option<Money>,
    pub banner_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Campaign with its phase computed against the request time.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub phase: CampaignPhase,
}

impl CampaignView {
    pub fn at(campaign: Campaign, now: Timestamp) -> Self {
        let phase = CampaignPhase::at(
            campaign.starts_at,
            campaign.ends_at,
            campaign.is_active,
            now,
        );
        Self { campaign, phase }
    }
}

/// DTO for creating a new campaign.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampaign {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub campaign_type: String,
    pub discount_percent: Option<i32>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Budget must not be negative"))]
    pub budget: Option<Money>,
    #[validate(url(message = "Banner must be a valid URL"))]
    pub banner_url: Option<String>,
}

/// DTO for updating an existing campaign. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCampaign {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub campaign_type: Option<String>,
    pub discount_percent: Option<i32>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, message = "Budget must not be negative"))]
    pub budget: Option<Money>,
    #[validate(url(message = "Banner must be a valid URL"))]
    pub banner_url: Option<String>,
}

/// Query parameters for `GET /campaigns`.
#[derive(Debug, Default, Deserialize)]
pub struct CampaignListParams {
    /// Only campaigns whose window contains now and are active.
    #[serde(default)]
    pub running: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
