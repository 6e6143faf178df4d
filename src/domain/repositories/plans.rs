use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::plans::PlanEntity,
    value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
};

#[automock]
#[async_trait]
pub trait PlanRepository {
    async fn find_by_id(&self, kind: PlanKind, plan_id: DocumentId) -> Result<Option<PlanEntity>>;

    /// Old-format plans: non-template rows carrying `client_id` themselves.
    async fn find_legacy_for_client(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<PlanEntity>>;

    /// Deletes old-format plans of the client except `keep_plan_id`. Templates are never touched.
    /// A plan some assignment still points at only loses its embedded client id.
    /// Returns the number of plans deleted.
    async fn delete_legacy_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize>;

    /// Every old-format plan of a kind, newest first.
    async fn find_legacy(&self, kind: PlanKind) -> Result<Vec<PlanEntity>>;

    async fn clear_legacy_client(&self, kind: PlanKind, plan_id: DocumentId) -> Result<()>;

    async fn list_templates(&self, kind: PlanKind) -> Result<Vec<PlanEntity>>;

    async fn insert(&self, plan: PlanEntity) -> Result<()>;
}
