use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{delete, insert_into, prelude::*, update};

use crate::{
    domain::{
        entities::plans::{InsertPlanRow, PlanEntity, PlanRow},
        repositories::plans::PlanRepository,
        value_objects::{document_id::DocumentId, enums::plan_kinds::PlanKind},
    },
    infrastructure::postgres::{
        postgres_connection::{PgPoolSquad, checkout, classify_diesel_error},
        schema::{plan_assignments, plans},
    },
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_entities(rows: Vec<PlanRow>) -> Result<Vec<PlanEntity>> {
    rows.into_iter().map(PlanEntity::try_from).collect()
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn find_by_id(&self, kind: PlanKind, plan_id: DocumentId) -> Result<Option<PlanEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let row = plans::table
            .find(plan_id.to_string())
            .filter(plans::kind.eq(kind.as_str()))
            .select(PlanRow::as_select())
            .first::<PlanRow>(&mut conn)
            .optional()
            .map_err(classify_diesel_error)?;

        row.map(PlanEntity::try_from).transpose()
    }

    async fn find_legacy_for_client(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<PlanEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let rows = plans::table
            .filter(plans::kind.eq(kind.as_str()))
            .filter(plans::is_template.eq(false))
            .filter(plans::client_id.eq(client_id.to_string()))
            .order(plans::created_at.desc())
            .select(PlanRow::as_select())
            .load::<PlanRow>(&mut conn)
            .map_err(classify_diesel_error)?;

        into_entities(rows)
    }

    async fn delete_legacy_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize> {
        let mut conn = checkout(&self.db_pool)?;

        let client_id = client_id.to_string();
        let keep_plan_id = keep_plan_id.to_string();

        let removed = conn
            .transaction::<usize, diesel::result::Error, _>(|tx| {
                // Deleting a plan cascades to its assignments, so plans another
                // client is assigned to are unlinked instead.
                update(
                    plans::table
                        .filter(plans::kind.eq(kind.as_str()))
                        .filter(plans::is_template.eq(false))
                        .filter(plans::client_id.eq(&client_id))
                        .filter(plans::id.ne(&keep_plan_id))
                        .filter(
                            plans::id.eq_any(plan_assignments::table.select(plan_assignments::plan_id)),
                        ),
                )
                .set((
                    plans::client_id.eq(None::<String>),
                    plans::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

                delete(
                    plans::table
                        .filter(plans::kind.eq(kind.as_str()))
                        .filter(plans::is_template.eq(false))
                        .filter(plans::client_id.eq(&client_id))
                        .filter(plans::id.ne(&keep_plan_id)),
                )
                .execute(tx)
            })
            .map_err(classify_diesel_error)?;

        Ok(removed)
    }

    async fn find_legacy(&self, kind: PlanKind) -> Result<Vec<PlanEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let rows = plans::table
            .filter(plans::kind.eq(kind.as_str()))
            .filter(plans::is_template.eq(false))
            .filter(plans::client_id.is_not_null())
            .order((plans::created_at.desc(), plans::id.desc()))
            .select(PlanRow::as_select())
            .load::<PlanRow>(&mut conn)
            .map_err(classify_diesel_error)?;

        into_entities(rows)
    }

    async fn clear_legacy_client(&self, kind: PlanKind, plan_id: DocumentId) -> Result<()> {
        let mut conn = checkout(&self.db_pool)?;

        update(
            plans::table
                .find(plan_id.to_string())
                .filter(plans::kind.eq(kind.as_str())),
        )
        .set((
            plans::client_id.eq(None::<String>),
            plans::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .map_err(classify_diesel_error)?;

        Ok(())
    }

    async fn list_templates(&self, kind: PlanKind) -> Result<Vec<PlanEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let rows = plans::table
            .filter(plans::kind.eq(kind.as_str()))
            .filter(plans::is_template.eq(true))
            .order(plans::created_at.desc())
            .select(PlanRow::as_select())
            .load::<PlanRow>(&mut conn)
            .map_err(classify_diesel_error)?;

        into_entities(rows)
    }

    async fn insert(&self, plan: PlanEntity) -> Result<()> {
        let mut conn = checkout(&self.db_pool)?;

        insert_into(plans::table)
            .values(InsertPlanRow::from(&plan))
            .execute(&mut conn)
            .map_err(classify_diesel_error)?;

        Ok(())
    }
}
