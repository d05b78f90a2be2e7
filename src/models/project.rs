//! Project model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityStatus;

/// How requests made through a project are paid for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectMode {
    Credits,
    ApiKeys,
    #[default]
    Hybrid,
}

impl std::str::FromStr for ProjectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credits" => Ok(ProjectMode::Credits),
            "api-keys" => Ok(ProjectMode::ApiKeys),
            "hybrid" => Ok(ProjectMode::Hybrid),
            _ => Err(format!("Invalid project mode: {}", s)),
        }
    }
}

/// Workspace inside exactly one organization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
    pub mode: ProjectMode,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}
