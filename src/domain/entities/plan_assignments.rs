use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
    infrastructure::postgres::schema::plan_assignments,
};

/// Join record linking one plan to one client.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanAssignmentEntity {
    pub id: DocumentId,
    pub kind: PlanKind,
    pub plan_id: DocumentId,
    pub client_id: DocumentId,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<DocumentId>,
}

impl PlanAssignmentEntity {
    pub fn new(
        kind: PlanKind,
        plan_id: DocumentId,
        client_id: DocumentId,
        assigned_at: DateTime<Utc>,
        assigned_by: Option<DocumentId>,
    ) -> Self {
        Self {
            id: DocumentId::generate(),
            kind,
            plan_id,
            client_id,
            assigned_at,
            assigned_by,
        }
    }
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_assignments)]
pub struct PlanAssignmentRow {
    pub id: String,
    pub kind: String,
    pub plan_id: String,
    pub client_id: String,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<String>,
}

impl TryFrom<PlanAssignmentRow> for PlanAssignmentEntity {
    type Error = anyhow::Error;

    fn try_from(value: PlanAssignmentRow) -> Result<Self> {
        Ok(Self {
            id: DocumentId::parse(&value.id).context("stored assignment id")?,
            kind: PlanKind::try_from(value.kind.as_str())?,
            plan_id: DocumentId::parse(&value.plan_id).context("stored assignment plan id")?,
            client_id: DocumentId::parse(&value.client_id)
                .context("stored assignment client id")?,
            assigned_at: value.assigned_at,
            assigned_by: value
                .assigned_by
                .as_deref()
                .and_then(|raw| DocumentId::parse(raw).ok()),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plan_assignments)]
pub struct InsertPlanAssignmentRow {
    pub id: String,
    pub kind: String,
    pub plan_id: String,
    pub client_id: String,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<String>,
}

impl From<&PlanAssignmentEntity> for InsertPlanAssignmentRow {
    fn from(value: &PlanAssignmentEntity) -> Self {
        Self {
            id: value.id.to_string(),
            kind: value.kind.to_string(),
            plan_id: value.plan_id.to_string(),
            client_id: value.client_id.to_string(),
            assigned_at: value.assigned_at,
            assigned_by: value.assigned_by.map(|id| id.to_string()),
        }
    }
}
