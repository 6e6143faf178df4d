use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    entities::plans::PlanEntity,
    value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanDto {
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

impl From<PlanEntity> for PlanDto {
    fn from(value: PlanEntity) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            name: value.name,
            description: value.description,
            content: value.content,
            is_template: value.is_template,
            client_id: value.client_id,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Body of `POST /plans/{kind}/assign`. Identifiers stay raw so malformed
/// values are reported as invalid identifiers instead of a JSON error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPlanModel {
    #[serde(alias = "planId")]
    pub plan_id: String,
    #[serde(alias = "clientId")]
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default, alias = "isTemplate")]
    pub is_template: bool,
}

impl CreatePlanModel {
    pub fn to_entity(&self, kind: PlanKind, created_by: DocumentId) -> PlanEntity {
        let now = Utc::now();
        let content = self
            .content
            .clone()
            .unwrap_or_else(|| serde_json::json!({ (kind.content_key()): [] }));

        PlanEntity {
            id: DocumentId::generate(),
            kind,
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            content,
            is_template: self.is_template,
            client_id: None,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LegacyMigrationReport {
    pub kind: PlanKind,
    pub scanned: usize,
    pub migrated: usize,
    pub cleared: usize,
}
