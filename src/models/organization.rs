//! Organization (tenant) model

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityStatus;

/// Billing plan of an organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationPlan {
    #[default]
    Free,
    Pro,
}

impl std::str::FromStr for OrganizationPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(OrganizationPlan::Free),
            "pro" => Ok(OrganizationPlan::Pro),
            _ => Err(format!("Invalid plan: {}", s)),
        }
    }
}

/// Organization: the billing and isolation boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub credits: BigDecimal,
    pub plan: OrganizationPlan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub auto_top_up_enabled: bool,
    pub auto_top_up_threshold: Option<BigDecimal>,
    pub auto_top_up_amount: Option<BigDecimal>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row granting a user membership in an organization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Credit balance view of an organization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub organization_id: Uuid,
    pub credits: BigDecimal,
    pub plan: OrganizationPlan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub auto_top_up_enabled: bool,
    pub auto_top_up_threshold: Option<BigDecimal>,
    pub auto_top_up_amount: Option<BigDecimal>,
}

impl From<&Organization> for CreditBalance {
    fn from(org: &Organization) -> Self {
        Self {
            organization_id: org.id,
            credits: org.credits.clone(),
            plan: org.plan,
            plan_expires_at: org.plan_expires_at,
            auto_top_up_enabled: org.auto_top_up_enabled,
            auto_top_up_threshold: org.auto_top_up_threshold.clone(),
            auto_top_up_amount: org.auto_top_up_amount.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationListResponse {
    pub organizations: Vec<Organization>,
}
