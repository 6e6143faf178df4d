use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::{plan_assignments::PlanAssignmentEntity, plans::PlanEntity},
    value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
};

#[automock]
#[async_trait]
pub trait PlanAssignmentRepository {
    async fn find_one(
        &self,
        kind: PlanKind,
        plan_id: DocumentId,
        client_id: DocumentId,
    ) -> Result<Option<PlanAssignmentEntity>>;

    /// Deletes the client's assignments of this kind whose plan is not `keep_plan_id`.
    async fn delete_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize>;

    /// Fails with `StoreError::Conflict` when the client already holds an assignment of this kind.
    async fn insert(&self, assignment: PlanAssignmentEntity) -> Result<()>;

    async fn find_for_client_with_plans(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<(PlanAssignmentEntity, PlanEntity)>>;

    async fn exists_for_client(&self, kind: PlanKind, client_id: DocumentId) -> Result<bool>;
}
