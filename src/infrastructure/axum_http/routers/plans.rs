use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;

use crate::{
    application::usecases::plan_assignment::PlanAssignmentUseCase,
    domain::{
        repositories::{
            clients::ClientRepository, plan_assignments::PlanAssignmentRepository,
            plans::PlanRepository,
        },
        value_objects::plans::{AssignPlanModel, CreatePlanModel},
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::AppError, routers::parse_kind},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{
                clients::ClientPostgres, plan_assignments::PlanAssignmentPostgres,
                plans::PlanPostgres,
            },
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let client_repository = ClientPostgres::new(Arc::clone(&db_pool));
    let plan_repository = PlanPostgres::new(Arc::clone(&db_pool));
    let assignment_repository = PlanAssignmentPostgres::new(Arc::clone(&db_pool));

    let usecase = PlanAssignmentUseCase::new(
        Arc::new(client_repository),
        Arc::new(plan_repository),
        Arc::new(assignment_repository),
    );

    router(Arc::new(usecase))
}

pub fn router<C, P, A>(usecase: Arc<PlanAssignmentUseCase<C, P, A>>) -> Router
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/plans/:kind", post(create_plan::<C, P, A>))
        .route("/plans/:kind/assign", post(assign_plan::<C, P, A>))
        .route("/plans/:kind/templates", get(list_templates::<C, P, A>))
        .route("/plans/:kind/migrate-legacy", post(migrate_legacy::<C, P, A>))
        .route(
            "/clients/:client_id/plans/:kind",
            get(get_client_plans::<C, P, A>),
        )
        .with_state(usecase)
}

pub async fn assign_plan<C, P, A>(
    State(usecase): State<Arc<PlanAssignmentUseCase<C, P, A>>>,
    auth: AuthUser,
    Path(kind): Path<String>,
    payload: Result<Json<AssignPlanModel>, JsonRejection>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(err) => return err.into_response(),
    };
    let Json(assign_plan_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::BadRequest(rejection.body_text()).into_response(),
    };

    match usecase.assign_plan(kind, assign_plan_model, auth.actor()).await {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn create_plan<C, P, A>(
    State(usecase): State<Arc<PlanAssignmentUseCase<C, P, A>>>,
    auth: AuthUser,
    Path(kind): Path<String>,
    payload: Result<Json<CreatePlanModel>, JsonRejection>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(err) => return err.into_response(),
    };
    let Json(create_plan_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::BadRequest(rejection.body_text()).into_response(),
    };

    match usecase.create_plan(kind, create_plan_model, auth.actor()).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn list_templates<C, P, A>(
    State(usecase): State<Arc<PlanAssignmentUseCase<C, P, A>>>,
    auth: AuthUser,
    Path(kind): Path<String>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(err) => return err.into_response(),
    };

    match usecase.list_templates(kind, auth.actor()).await {
        Ok(templates) => (StatusCode::OK, Json(templates)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn migrate_legacy<C, P, A>(
    State(usecase): State<Arc<PlanAssignmentUseCase<C, P, A>>>,
    auth: AuthUser,
    Path(kind): Path<String>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(err) => return err.into_response(),
    };
    info!(user_id = %auth.user_id, kind = %kind, "plans: legacy migration requested");

    match usecase.migrate_legacy_as(kind, auth.actor()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn get_client_plans<C, P, A>(
    State(usecase): State<Arc<PlanAssignmentUseCase<C, P, A>>>,
    auth: AuthUser,
    Path((client_id, kind)): Path<(String, String)>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    P: PlanRepository + Send + Sync + 'static,
    A: PlanAssignmentRepository + Send + Sync + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(err) => return err.into_response(),
    };

    match usecase.get_client_plans(kind, &client_id, auth.actor()).await {
        Ok(plans) => (StatusCode::OK, Json(plans)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
