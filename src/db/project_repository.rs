//! Project repository

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::{EntityStatus, Project, ProjectMode};

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    organization_id: String,
    mode: String,
    status: String,
    created_at: String,
    updated_at: String,
}

pub struct ProjectRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProjectRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, organization_id, mode, status, created_at, updated_at
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get project")?;

        row.map(row_to_project).transpose()
    }

    pub async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, organization_id, mode, status, created_at, updated_at
            FROM projects
            WHERE organization_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(organization_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list projects for organization")?;

        rows.into_iter().map(row_to_project).collect()
    }

    /// Projects in every organization the user is a member of
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.name, p.organization_id, p.mode, p.status, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN user_organizations uo ON uo.organization_id = p.organization_id
            WHERE uo.user_id = ?
            ORDER BY p.created_at
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list projects for user")?;

        rows.into_iter().map(row_to_project).collect()
    }

    /// A project, but only when the user is a member of its organization
    pub async fn get_accessible(&self, id: Uuid, user_id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT p.id, p.name, p.organization_id, p.mode, p.status, p.created_at, p.updated_at
            FROM projects p
            INNER JOIN user_organizations uo ON uo.organization_id = p.organization_id
            WHERE p.id = ? AND uo.user_id = ?
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get accessible project")?;

        row.map(row_to_project).transpose()
    }
}

fn row_to_project(row: ProjectRow) -> Result<Project> {
    Ok(Project {
        id: parse_uuid(&row.id, "project")?,
        name: row.name,
        organization_id: parse_uuid(&row.organization_id, "organization")?,
        mode: ProjectMode::from_str(&row.mode).map_err(anyhow::Error::msg)?,
        status: EntityStatus::from_str(&row.status).map_err(anyhow::Error::msg)?,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}
