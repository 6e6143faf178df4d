use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};

use crate::{
    application::usecases::packages::PackageUseCase,
    domain::repositories::packages::PackageRepository,
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::AppError},
        postgres::{postgres_connection::PgPoolSquad, repositories::packages::PackagePostgres},
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool));
    let usecase = PackageUseCase::new(Arc::new(package_repository));

    router(Arc::new(usecase))
}

pub fn router<K>(usecase: Arc<PackageUseCase<K>>) -> Router
where
    K: PackageRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/packages", get(list_packages::<K>))
        .with_state(usecase)
}

pub async fn list_packages<K>(
    State(usecase): State<Arc<PackageUseCase<K>>>,
    auth: AuthUser,
) -> impl IntoResponse
where
    K: PackageRepository + Send + Sync + 'static,
{
    match usecase.list_packages(auth.actor()).await {
        Ok(packages) => (StatusCode::OK, Json(packages)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            entities::packages::PackageEntity,
            value_objects::{
                document_id::DocumentId, enums::user_roles::UserRole, packages::PackageFeatures,
            },
        },
        infrastructure::{axum_http::auth::test_support::bearer, in_memory::InMemoryStore},
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn clients_only_see_active_packages() {
        let store = InMemoryStore::new();
        for (raw, price, is_active) in [
            ("65a000000000000000000e01", 2500.0, true),
            ("65a000000000000000000e02", 9000.0, false),
        ] {
            store.seed_package(PackageEntity {
                id: DocumentId::parse(raw).unwrap(),
                name: "Plan".to_string(),
                price,
                features: PackageFeatures::default(),
                live_sessions_per_month: 0,
                is_active,
            });
        }
        let app = router(Arc::new(PackageUseCase::new(Arc::new(store))));

        let request = Request::builder()
            .uri("/packages")
            .header(
                header::AUTHORIZATION,
                bearer(DocumentId::generate(), UserRole::Client),
            )
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], "65a000000000000000000e01");
    }
}
