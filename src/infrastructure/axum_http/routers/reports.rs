use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use crate::{
    application::usecases::revenue_reports::RevenueReportUseCase,
    domain::{
        repositories::{clients::ClientRepository, packages::PackageRepository},
        value_objects::revenue::RevenueQuery,
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::AppError},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{clients::ClientPostgres, packages::PackagePostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, max_trend_months: u32) -> Router {
    let client_repository = ClientPostgres::new(Arc::clone(&db_pool));
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool));

    let usecase = RevenueReportUseCase::new(
        Arc::new(client_repository),
        Arc::new(package_repository),
        max_trend_months,
    );

    router(Arc::new(usecase))
}

pub fn router<C, K>(usecase: Arc<RevenueReportUseCase<C, K>>) -> Router
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/reports/revenue", get(revenue::<C, K>))
        .route("/reports/overview", get(overview::<C, K>))
        .with_state(usecase)
}

pub async fn revenue<C, K>(
    State(usecase): State<Arc<RevenueReportUseCase<C, K>>>,
    auth: AuthUser,
    query: Result<Query<RevenueQuery>, QueryRejection>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return AppError::BadRequest(rejection.body_text()).into_response(),
    };

    match usecase.revenue_report(query, auth.actor(), Utc::now()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn overview<C, K>(
    State(usecase): State<Arc<RevenueReportUseCase<C, K>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    match usecase.overview(auth.actor(), Utc::now()).await {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
