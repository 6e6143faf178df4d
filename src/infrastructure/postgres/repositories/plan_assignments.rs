use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{delete, dsl::exists, insert_into, prelude::*, select};

use crate::{
    domain::{
        entities::{
            plan_assignments::{InsertPlanAssignmentRow, PlanAssignmentEntity, PlanAssignmentRow},
            plans::{PlanEntity, PlanRow},
        },
        repositories::plan_assignments::PlanAssignmentRepository,
        value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
    },
    infrastructure::postgres::{
        postgres_connection::{PgPoolSquad, checkout, classify_diesel_error},
        schema::{plan_assignments, plans},
    },
};

pub struct PlanAssignmentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanAssignmentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanAssignmentRepository for PlanAssignmentPostgres {
    async fn find_one(
        &self,
        kind: PlanKind,
        plan_id: DocumentId,
        client_id: DocumentId,
    ) -> Result<Option<PlanAssignmentEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let row = plan_assignments::table
            .filter(plan_assignments::kind.eq(kind.as_str()))
            .filter(plan_assignments::plan_id.eq(plan_id.to_string()))
            .filter(plan_assignments::client_id.eq(client_id.to_string()))
            .select(PlanAssignmentRow::as_select())
            .first::<PlanAssignmentRow>(&mut conn)
            .optional()
            .map_err(classify_diesel_error)?;

        row.map(PlanAssignmentEntity::try_from).transpose()
    }

    async fn delete_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize> {
        let mut conn = checkout(&self.db_pool)?;

        let removed = delete(
            plan_assignments::table
                .filter(plan_assignments::kind.eq(kind.as_str()))
                .filter(plan_assignments::client_id.eq(client_id.to_string()))
                .filter(plan_assignments::plan_id.ne(keep_plan_id.to_string())),
        )
        .execute(&mut conn)
        .map_err(classify_diesel_error)?;

        Ok(removed)
    }

    async fn insert(&self, assignment: PlanAssignmentEntity) -> Result<()> {
        let mut conn = checkout(&self.db_pool)?;

        insert_into(plan_assignments::table)
            .values(InsertPlanAssignmentRow::from(&assignment))
            .execute(&mut conn)
            .map_err(classify_diesel_error)?;

        Ok(())
    }

    async fn find_for_client_with_plans(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<(PlanAssignmentEntity, PlanEntity)>> {
        let mut conn = checkout(&self.db_pool)?;

        let rows = plan_assignments::table
            .inner_join(plans::table)
            .filter(plan_assignments::kind.eq(kind.as_str()))
            .filter(plan_assignments::client_id.eq(client_id.to_string()))
            .order(plan_assignments::assigned_at.desc())
            .select((PlanAssignmentRow::as_select(), PlanRow::as_select()))
            .load::<(PlanAssignmentRow, PlanRow)>(&mut conn)
            .map_err(classify_diesel_error)?;

        rows.into_iter()
            .map(|(assignment, plan)| {
                Ok((
                    PlanAssignmentEntity::try_from(assignment)?,
                    PlanEntity::try_from(plan)?,
                ))
            })
            .collect()
    }

    async fn exists_for_client(&self, kind: PlanKind, client_id: DocumentId) -> Result<bool> {
        let mut conn = checkout(&self.db_pool)?;

        let found = select(exists(
            plan_assignments::table
                .filter(plan_assignments::kind.eq(kind.as_str()))
                .filter(plan_assignments::client_id.eq(client_id.to_string())),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(classify_diesel_error)?;

        Ok(found)
    }
}
