//! Organization (tenant) and membership repository

use std::str::FromStr;

use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_db_timestamp, parse_uuid};
use crate::models::{EntityStatus, Membership, Organization, OrganizationPlan};

const ORGANIZATION_COLUMNS: &str = "o.id, o.name, o.credits, o.plan, o.plan_expires_at, \
     o.auto_top_up_enabled, o.auto_top_up_threshold, o.auto_top_up_amount, o.status, \
     o.created_at, o.updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    name: String,
    credits: String,
    plan: String,
    plan_expires_at: Option<String>,
    auto_top_up_enabled: bool,
    auto_top_up_threshold: Option<String>,
    auto_top_up_amount: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MembershipRow {
    id: String,
    user_id: String,
    organization_id: String,
    created_at: String,
}

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {} FROM organizations o WHERE o.id = ?",
            ORGANIZATION_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get organization")?;

        row.map(row_to_org).transpose()
    }

    /// Organizations the user is a member of, excluding deleted ones
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(&format!(
            r#"
            SELECT {}
            FROM organizations o
            INNER JOIN user_organizations uo ON uo.organization_id = o.id
            WHERE uo.user_id = ? AND o.status != 'deleted'
            ORDER BY o.created_at
            "#,
            ORGANIZATION_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list organizations for user")?;

        rows.into_iter().map(row_to_org).collect()
    }

    pub async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, user_id, organization_id, created_at
            FROM user_organizations
            WHERE user_id = ? AND organization_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(organization_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get organization membership")?;

        row.map(|row| {
            Ok(Membership {
                id: parse_uuid(&row.id, "membership")?,
                user_id: parse_uuid(&row.user_id, "user")?,
                organization_id: parse_uuid(&row.organization_id, "organization")?,
                created_at: parse_db_timestamp(&row.created_at),
            })
        })
        .transpose()
    }
}

fn parse_decimal(value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value).with_context(|| format!("Invalid decimal value: {}", value))
}

fn row_to_org(row: OrganizationRow) -> Result<Organization> {
    Ok(Organization {
        id: parse_uuid(&row.id, "organization")?,
        name: row.name,
        credits: parse_decimal(&row.credits)?,
        plan: OrganizationPlan::from_str(&row.plan).map_err(anyhow::Error::msg)?,
        plan_expires_at: row.plan_expires_at.as_deref().map(parse_db_timestamp),
        auto_top_up_enabled: row.auto_top_up_enabled,
        auto_top_up_threshold: row
            .auto_top_up_threshold
            .as_deref()
            .map(parse_decimal)
            .transpose()?,
        auto_top_up_amount: row
            .auto_top_up_amount
            .as_deref()
            .map(parse_decimal)
            .transpose()?,
        status: EntityStatus::from_str(&row.status).map_err(anyhow::Error::msg)?,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}
