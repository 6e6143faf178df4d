use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    application::usecases::{is_store_conflict, is_store_unavailable},
    domain::{
        entities::{clients::ClientEntity, plan_assignments::PlanAssignmentEntity, plans::PlanEntity},
        repositories::{
            clients::ClientRepository, plan_assignments::PlanAssignmentRepository,
            plans::PlanRepository,
        },
        value_objects::{
            document_id::{DocumentId, InvalidDocumentId},
            enums::plan_kinds::PlanKind,
            iam::Actor,
            plans::{AssignPlanModel, CreatePlanModel, LegacyMigrationReport, PlanDto},
        },
    },
};

#[derive(Debug, Error)]
pub enum PlanAssignmentError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidDocumentId),
    #[error("{0}")]
    BadRequest(String),
    #[error("not allowed to {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("the client's plan changed concurrently, retry the request")]
    ConflictRace,
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl PlanAssignmentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PlanAssignmentError::InvalidIdentifier(_) | PlanAssignmentError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            PlanAssignmentError::Forbidden(_) => StatusCode::FORBIDDEN,
            PlanAssignmentError::NotFound(_) => StatusCode::NOT_FOUND,
            PlanAssignmentError::ConflictRace => StatusCode::CONFLICT,
            PlanAssignmentError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PlanAssignmentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_store(err: anyhow::Error) -> Self {
        if is_store_unavailable(&err) {
            PlanAssignmentError::StoreUnavailable(err)
        } else {
            PlanAssignmentError::Internal(err)
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PlanAssignmentError>;

/// Keeps exactly one current plan per client and kind across the assignment
/// table and the old format where the plan row itself names the client.
pub struct PlanAssignmentUseCase<C, P, A>
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    client_repo: Arc<C>,
    plan_repo: Arc<P>,
    assignment_repo: Arc<A>,
}

impl<C, P, A> PlanAssignmentUseCase<C, P, A>
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    pub fn new(client_repo: Arc<C>, plan_repo: Arc<P>, assignment_repo: Arc<A>) -> Self {
        Self {
            client_repo,
            plan_repo,
            assignment_repo,
        }
    }

    pub async fn assign_plan(
        &self,
        kind: PlanKind,
        assign_plan_model: AssignPlanModel,
        actor: Actor,
    ) -> UseCaseResult<PlanDto> {
        let plan_id = DocumentId::parse(assign_plan_model.plan_id.trim())?;
        let client_id = DocumentId::parse(assign_plan_model.client_id.trim())?;
        info!(
            kind = %kind,
            %plan_id,
            %client_id,
            actor_id = %actor.user_id,
            "plans: assign requested"
        );

        if !actor.is_staff() {
            warn!(actor_id = %actor.user_id, role = %actor.role, "plans: assign rejected for role");
            return Err(PlanAssignmentError::Forbidden("assign plans"));
        }

        self.load_plan(kind, plan_id).await?;
        let client = self.load_client(client_id).await?;
        if !actor.can_manage_client(&client) {
            warn!(
                actor_id = %actor.user_id,
                %client_id,
                "plans: trainer is not assigned to this client"
            );
            return Err(PlanAssignmentError::Forbidden("assign plans to this client"));
        }

        // Cleanup is best-effort; the assignment itself must still happen.
        let superseded_removed = match self
            .assignment_repo
            .delete_for_client_except(kind, client_id, plan_id)
            .await
        {
            Ok(removed) => {
                debug!(kind = %kind, %client_id, removed, "plans: superseded assignments removed");
                true
            }
            Err(err) => {
                warn!(
                    kind = %kind,
                    %client_id,
                    error = ?err,
                    "plans: failed to remove superseded assignments"
                );
                false
            }
        };

        match self
            .plan_repo
            .delete_legacy_for_client_except(kind, client_id, plan_id)
            .await
        {
            Ok(removed) => debug!(kind = %kind, %client_id, removed, "plans: legacy plans removed"),
            Err(err) => warn!(
                kind = %kind,
                %client_id,
                error = ?err,
                "plans: failed to remove legacy plans"
            ),
        }

        let existing = self
            .assignment_repo
            .find_one(kind, plan_id, client_id)
            .await
            .map_err(|err| {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to look up assignment");
                PlanAssignmentError::from_store(err)
            })?;

        if existing.is_some() {
            debug!(kind = %kind, %plan_id, %client_id, "plans: plan already assigned");
        } else {
            let assignment =
                PlanAssignmentEntity::new(kind, plan_id, client_id, Utc::now(), Some(actor.user_id));
            self.insert_assignment(assignment, superseded_removed).await?;
            info!(kind = %kind, %plan_id, %client_id, "plans: plan assigned");
        }

        let plan = self.load_plan(kind, plan_id).await?;
        Ok(PlanDto::from(plan))
    }

    /// Plans currently linked to a client, newest first, whichever format
    /// they are stored in.
    pub async fn get_client_plans(
        &self,
        kind: PlanKind,
        client_id: &str,
        actor: Actor,
    ) -> UseCaseResult<Vec<PlanDto>> {
        let client_id = DocumentId::parse(client_id.trim())?;
        let client = self.load_client(client_id).await?;
        if !actor.can_view_client(&client) {
            warn!(actor_id = %actor.user_id, %client_id, "plans: client plans access denied");
            return Err(PlanAssignmentError::Forbidden("view this client's plans"));
        }

        let assigned = self
            .assignment_repo
            .find_for_client_with_plans(kind, client_id)
            .await
            .map_err(|err| {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to load assigned plans");
                PlanAssignmentError::from_store(err)
            })?;
        let legacy = self
            .plan_repo
            .find_legacy_for_client(kind, client_id)
            .await
            .map_err(|err| {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to load legacy plans");
                PlanAssignmentError::from_store(err)
            })?;

        let plans = merge_client_plans(assigned.into_iter().map(|(_, plan)| plan), legacy);
        debug!(kind = %kind, %client_id, plan_count = plans.len(), "plans: client plans loaded");
        Ok(plans.into_iter().map(PlanDto::from).collect())
    }

    pub async fn create_plan(
        &self,
        kind: PlanKind,
        create_plan_model: CreatePlanModel,
        actor: Actor,
    ) -> UseCaseResult<PlanDto> {
        if !actor.is_staff() {
            return Err(PlanAssignmentError::Forbidden("create plans"));
        }
        if create_plan_model.name.trim().is_empty() {
            return Err(PlanAssignmentError::BadRequest("plan name is required".to_string()));
        }
        if create_plan_model
            .content
            .as_ref()
            .is_some_and(|content| !content.is_object())
        {
            return Err(PlanAssignmentError::BadRequest(
                "plan content must be a JSON object".to_string(),
            ));
        }

        let plan = create_plan_model.to_entity(kind, actor.user_id);
        self.plan_repo.insert(plan.clone()).await.map_err(|err| {
            error!(kind = %kind, db_error = ?err, "plans: failed to insert plan");
            PlanAssignmentError::from_store(err)
        })?;
        info!(kind = %kind, plan_id = %plan.id, is_template = plan.is_template, "plans: plan created");

        Ok(PlanDto::from(plan))
    }

    pub async fn list_templates(&self, kind: PlanKind, actor: Actor) -> UseCaseResult<Vec<PlanDto>> {
        if !actor.is_staff() {
            return Err(PlanAssignmentError::Forbidden("browse plan templates"));
        }
        let templates = self.plan_repo.list_templates(kind).await.map_err(|err| {
            error!(kind = %kind, db_error = ?err, "plans: failed to list templates");
            PlanAssignmentError::from_store(err)
        })?;
        Ok(templates.into_iter().map(PlanDto::from).collect())
    }

    pub async fn migrate_legacy_as(
        &self,
        kind: PlanKind,
        actor: Actor,
    ) -> UseCaseResult<LegacyMigrationReport> {
        if !actor.is_admin() {
            return Err(PlanAssignmentError::Forbidden("migrate legacy plans"));
        }
        self.migrate_legacy_assignments(kind).await
    }

    /// Moves old-format links into the assignment table. The newest legacy
    /// plan of a client without an assignment becomes that assignment; every
    /// legacy plan visited loses its embedded client id. Safe to rerun.
    pub async fn migrate_legacy_assignments(
        &self,
        kind: PlanKind,
    ) -> UseCaseResult<LegacyMigrationReport> {
        info!(kind = %kind, "plans: legacy migration started");
        let legacy = self.plan_repo.find_legacy(kind).await.map_err(|err| {
            error!(kind = %kind, db_error = ?err, "plans: failed to load legacy plans");
            PlanAssignmentError::from_store(err)
        })?;

        let mut report = LegacyMigrationReport {
            kind,
            scanned: 0,
            migrated: 0,
            cleared: 0,
        };
        let mut visited_clients = HashSet::new();

        for plan in legacy {
            let Some(client_id) = plan.client_id else {
                continue;
            };
            report.scanned += 1;

            if visited_clients.insert(client_id) && self.migrate_newest(kind, &plan, client_id).await? {
                report.migrated += 1;
            }

            self.plan_repo
                .clear_legacy_client(kind, plan.id)
                .await
                .map_err(|err| {
                    error!(kind = %kind, plan_id = %plan.id, db_error = ?err, "plans: failed to clear legacy client");
                    PlanAssignmentError::from_store(err)
                })?;
            report.cleared += 1;
        }

        info!(
            kind = %kind,
            scanned = report.scanned,
            migrated = report.migrated,
            cleared = report.cleared,
            "plans: legacy migration finished"
        );
        Ok(report)
    }

    async fn migrate_newest(
        &self,
        kind: PlanKind,
        plan: &PlanEntity,
        client_id: DocumentId,
    ) -> UseCaseResult<bool> {
        let assigned = self
            .assignment_repo
            .exists_for_client(kind, client_id)
            .await
            .map_err(PlanAssignmentError::from_store)?;
        if assigned {
            debug!(kind = %kind, %client_id, "plans: client already has an assignment");
            return Ok(false);
        }

        let assignment =
            PlanAssignmentEntity::new(kind, plan.id, client_id, plan.created_at, plan.created_by);
        match self.assignment_repo.insert(assignment).await {
            Ok(()) => Ok(true),
            Err(err) if is_store_conflict(&err) => {
                debug!(kind = %kind, %client_id, "plans: assignment appeared during migration");
                Ok(false)
            }
            Err(err) => {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to migrate legacy plan");
                Err(PlanAssignmentError::from_store(err))
            }
        }
    }

    /// A unique violation after a failed cleanup usually means the superseded
    /// row is still there, so the cleanup is retried once before the violation
    /// is reported as a race.
    async fn insert_assignment(
        &self,
        assignment: PlanAssignmentEntity,
        superseded_removed: bool,
    ) -> UseCaseResult<()> {
        let (kind, plan_id, client_id) = (assignment.kind, assignment.plan_id, assignment.client_id);

        let err = match self.assignment_repo.insert(assignment.clone()).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if !is_store_conflict(&err) {
            error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to insert assignment");
            return Err(PlanAssignmentError::from_store(err));
        }
        if superseded_removed {
            warn!(kind = %kind, %client_id, "plans: concurrent assignment detected");
            return Err(PlanAssignmentError::ConflictRace);
        }

        warn!(
            kind = %kind,
            %client_id,
            "plans: assignment blocked by a superseded row, retrying cleanup"
        );
        self.assignment_repo
            .delete_for_client_except(kind, client_id, plan_id)
            .await
            .map_err(|err| {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: superseded assignment could not be removed");
                PlanAssignmentError::from_store(err)
            })?;

        self.assignment_repo.insert(assignment).await.map_err(|err| {
            if is_store_conflict(&err) {
                warn!(kind = %kind, %client_id, "plans: concurrent assignment detected");
                PlanAssignmentError::ConflictRace
            } else {
                error!(kind = %kind, %client_id, db_error = ?err, "plans: failed to insert assignment");
                PlanAssignmentError::from_store(err)
            }
        })
    }

    async fn load_plan(&self, kind: PlanKind, plan_id: DocumentId) -> UseCaseResult<PlanEntity> {
        self.plan_repo
            .find_by_id(kind, plan_id)
            .await
            .map_err(|err| {
                error!(kind = %kind, %plan_id, db_error = ?err, "plans: failed to load plan");
                PlanAssignmentError::from_store(err)
            })?
            .ok_or(PlanAssignmentError::NotFound("plan"))
    }

    async fn load_client(&self, client_id: DocumentId) -> UseCaseResult<ClientEntity> {
        self.client_repo
            .find_by_id(client_id)
            .await
            .map_err(|err| {
                error!(%client_id, db_error = ?err, "plans: failed to load client");
                PlanAssignmentError::from_store(err)
            })?
            .ok_or(PlanAssignmentError::NotFound("client"))
    }
}

/// Union of both storage formats keyed by plan id; an assigned plan wins over
/// the same plan seen through its legacy link.
fn merge_client_plans(
    assigned: impl IntoIterator<Item = PlanEntity>,
    legacy: impl IntoIterator<Item = PlanEntity>,
) -> Vec<PlanEntity> {
    let mut seen = HashSet::new();
    let mut plans: Vec<PlanEntity> = assigned
        .into_iter()
        .chain(legacy)
        .filter(|plan| seen.insert(plan.id))
        .collect();
    plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    plans
}
