//! Marketing campaign types and scheduling phase.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignType {
    Sale,
    Promotion,
    Seasonal,
    FlashSale,
}

impl CampaignType {
    pub const fn as_str(self) -> &'static str {
        match self {
            CampaignType::Sale => "SALE",
            CampaignType::Promotion => "PROMOTION",
            CampaignType::Seasonal => "SEASONAL",
            CampaignType::FlashSale => "FLASH_SALE",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "SALE" => Ok(CampaignType::Sale),
            "PROMOTION" => Ok(CampaignType::Promotion),
            "SEASONAL" => Ok(CampaignType::Seasonal),
            "FLASH_SALE" => Ok(CampaignType::FlashSale),
            other => Err(CoreError::validation(format!(
                "Unknown campaign type '{other}'"
            ))),
        }
    }
}

/// Where a campaign sits relative to "now". Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignPhase {
    Scheduled,
    Running,
    Ended,
    Disabled,
}

impl CampaignPhase {
    pub fn at(starts_at: Timestamp, ends_at: Timestamp, is_active: bool, now: Timestamp) -> Self {
        if !is_active {
            CampaignPhase::Disabled
        } else if now < starts_at {
            CampaignPhase::Scheduled
        } else if now > ends_at {
            CampaignPhase::Ended
        } else {
            CampaignPhase::Running
        }
    }
}

/// A campaign must end after it starts and discount 0..=100 percent.
pub fn validate_campaign(
    starts_at: Timestamp,
    ends_at: Timestamp,
    discount_percent: Option<i32>,
) -> Result<(), CoreError> {
    if ends_at <= starts_at {
        return Err(CoreError::validation("Campaign end must be after its start"));
    }
    if let Some(pct) = discount_percent {
        if !(0..=100).contains(&pct) {
            return Err(CoreError::validation(
                "Campaign discount must be between 0 and 100 percent",
            ));
        }
    }
    Ok(())
}
