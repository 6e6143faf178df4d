use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::{JsonRejection, QueryRejection}},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use tracing::info;

use crate::{
    application::usecases::clients::ClientUseCase,
    domain::{
        repositories::{clients::ClientRepository, packages::PackageRepository},
        value_objects::clients::{ListClientsQuery, RenewSubscriptionModel},
    },
    infrastructure::{
        axum_http::{auth::AuthUser, error_responses::AppError},
        postgres::{
            postgres_connection::PgPoolSquad,
            repositories::{clients::ClientPostgres, packages::PackagePostgres},
        },
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let client_repository = ClientPostgres::new(Arc::clone(&db_pool));
    let package_repository = PackagePostgres::new(Arc::clone(&db_pool));

    let usecase = ClientUseCase::new(Arc::new(client_repository), Arc::new(package_repository));

    router(Arc::new(usecase))
}

pub fn router<C, K>(usecase: Arc<ClientUseCase<C, K>>) -> Router
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/clients", get(list_clients::<C, K>))
        .route("/clients/:client_id", get(get_client::<C, K>))
        .route(
            "/clients/:client_id/subscription",
            patch(renew_subscription::<C, K>),
        )
        .with_state(usecase)
}

pub async fn list_clients<C, K>(
    State(usecase): State<Arc<ClientUseCase<C, K>>>,
    auth: AuthUser,
    query: Result<Query<ListClientsQuery>, QueryRejection>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return AppError::BadRequest(rejection.body_text()).into_response(),
    };

    match usecase.list_clients(query, auth.actor()).await {
        Ok(clients) => (StatusCode::OK, Json(clients)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn get_client<C, K>(
    State(usecase): State<Arc<ClientUseCase<C, K>>>,
    auth: AuthUser,
    Path(client_id): Path<String>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    match usecase.get_client(&client_id, auth.actor()).await {
        Ok(client) => (StatusCode::OK, Json(client)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub async fn renew_subscription<C, K>(
    State(usecase): State<Arc<ClientUseCase<C, K>>>,
    auth: AuthUser,
    Path(client_id): Path<String>,
    payload: Result<Json<RenewSubscriptionModel>, JsonRejection>,
) -> impl IntoResponse
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    let Json(renew_subscription_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return AppError::BadRequest(rejection.body_text()).into_response(),
    };
    info!(user_id = %auth.user_id, %client_id, "clients: subscription renewal requested");

    match usecase
        .renew_subscription(&client_id, renew_subscription_model, auth.actor())
        .await
    {
        Ok(client) => (StatusCode::OK, Json(client)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            entities::clients::{ClientEntity, SubscriptionWindow},
            value_objects::{
                document_id::DocumentId,
                enums::{client_statuses::ClientStatus, user_roles::UserRole},
            },
        },
        infrastructure::{axum_http::auth::test_support::bearer, in_memory::InMemoryStore},
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const TRAINER_ID: &str = "65a0000000000000000000b1";

    fn id(raw: &str) -> DocumentId {
        DocumentId::parse(raw).unwrap()
    }

    fn app() -> Router {
        let store = InMemoryStore::new();
        for (raw, trainer) in [
            ("65a000000000000000000c01", TRAINER_ID),
            ("65a000000000000000000c02", "65a0000000000000000000b2"),
        ] {
            store.seed_client(ClientEntity {
                id: id(raw),
                name: "Dev".to_string(),
                email: "dev@example.com".to_string(),
                package_id: None,
                trainer_id: Some(id(trainer)),
                package_duration: None,
                status: ClientStatus::Active,
                subscription: SubscriptionWindow::default(),
                created_at: None,
            });
        }
        router(Arc::new(ClientUseCase::new(
            Arc::new(store.clone()),
            Arc::new(store),
        )))
    }

    async fn send(app: Router, method: Method, uri: &str, auth: String, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn trainer_listing_is_scoped_to_their_clients() {
        let trainer = bearer(id(TRAINER_ID), UserRole::Trainer);
        let (status, body) = send(app(), Method::GET, "/clients?status=active", trainer, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["id"], "65a000000000000000000c01");
        assert_eq!(body[0]["package_duration"], 4);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let admin = bearer(id("65a0000000000000000000a1"), UserRole::Admin);
        let (status, body) = send(app(), Method::GET, "/clients/65a000000000000000000cff", admin, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "client not found");
    }

    #[tokio::test]
    async fn admin_renews_a_subscription() {
        let admin = bearer(id("65a0000000000000000000a1"), UserRole::Admin);
        let (status, body) = send(
            app(),
            Method::PATCH,
            "/clients/65a000000000000000000c02/subscription",
            admin,
            Some(json!({ "startDate": "2024-03-01T00:00:00Z", "packageDuration": 12 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscription"]["renewal_count"], 1);
        assert_eq!(body["subscription"]["end_date"], "2024-05-24T00:00:00Z");
        assert_eq!(body["package_duration"], 12);
    }
}
