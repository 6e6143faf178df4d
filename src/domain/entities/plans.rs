use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::{
    domain::value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
    infrastructure::postgres::schema::plans,
};

/// A diet or workout plan. `client_id` is only set on old-format rows, where
/// the plan document itself carries the client it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntity {
    pub id: DocumentId,
    pub kind: PlanKind,
    pub name: String,
    pub description: Option<String>,
    pub content: Value,
    pub is_template: bool,
    pub client_id: Option<DocumentId>,
    pub created_by: Option<DocumentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanRow {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub content: Value,
    pub is_template: bool,
    pub client_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for PlanEntity {
    type Error = anyhow::Error;

    fn try_from(value: PlanRow) -> Result<Self> {
        let client_id = value
            .client_id
            .as_deref()
            .map(DocumentId::parse)
            .transpose()
            .context("stored plan client id")?;
        let created_by = value
            .created_by
            .as_deref()
            .and_then(|raw| DocumentId::parse(raw).ok());

        Ok(Self {
            id: DocumentId::parse(&value.id).context("stored plan id")?,
            kind: PlanKind::try_from(value.kind.as_str())?,
            name: value.name,
            description: value.description,
            content: value.content,
            is_template: value.is_template,
            client_id,
            created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plans)]
pub struct InsertPlanRow {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub content: Value,
    pub is_template: bool,
    pub client_id: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PlanEntity> for InsertPlanRow {
    fn from(value: &PlanEntity) -> Self {
        Self {
            id: value.id.to_string(),
            kind: value.kind.to_string(),
            name: value.name.clone(),
            description: value.description.clone(),
            content: value.content.clone(),
            is_template: value.is_template,
            client_id: value.client_id.map(|id| id.to_string()),
            created_by: value.created_by.map(|id| id.to_string()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
