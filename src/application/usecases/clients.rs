use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    application::usecases::is_store_unavailable,
    domain::{
        entities::clients::{ClientEntity, PACKAGE_DURATIONS_WEEKS},
        repositories::{clients::ClientRepository, packages::PackageRepository},
        value_objects::{
            clients::{ClientDto, ListClientsFilter, ListClientsQuery, RenewSubscriptionModel},
            document_id::{DocumentId, InvalidDocumentId},
            enums::{client_statuses::ClientStatus, user_roles::UserRole},
            iam::Actor,
        },
    },
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidDocumentId),
    #[error("{0}")]
    BadRequest(String),
    #[error("not allowed to {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ClientError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ClientError::InvalidIdentifier(_) | ClientError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ClientError::Forbidden(_) => StatusCode::FORBIDDEN,
            ClientError::NotFound(_) => StatusCode::NOT_FOUND,
            ClientError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClientError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_store(err: anyhow::Error) -> Self {
        if is_store_unavailable(&err) {
            ClientError::StoreUnavailable(err)
        } else {
            ClientError::Internal(err)
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ClientError>;

pub struct ClientUseCase<C, K>
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    client_repo: Arc<C>,
    package_repo: Arc<K>,
}

impl<C, K> ClientUseCase<C, K>
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    pub fn new(client_repo: Arc<C>, package_repo: Arc<K>) -> Self {
        Self {
            client_repo,
            package_repo,
        }
    }

    pub async fn get_client(&self, client_id: &str, actor: Actor) -> UseCaseResult<ClientDto> {
        let client_id = DocumentId::parse(client_id.trim())?;
        let client = self.load_client(client_id).await?;
        if !actor.can_view_client(&client) {
            warn!(actor_id = %actor.user_id, %client_id, "clients: access denied");
            return Err(ClientError::Forbidden("view this client"));
        }
        Ok(ClientDto::from(client))
    }

    /// Trainers always see their own roster, whatever trainer they asked for.
    pub async fn list_clients(
        &self,
        query: ListClientsQuery,
        actor: Actor,
    ) -> UseCaseResult<Vec<ClientDto>> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(ClientStatus::parse(raw).ok_or_else(|| {
                ClientError::BadRequest(format!("unknown client status: {raw}"))
            })?),
        };
        let requested_trainer = match query.trainer_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(DocumentId::parse(raw)?),
        };

        let filter = match actor.role {
            UserRole::Admin => ListClientsFilter {
                status,
                trainer_id: requested_trainer,
            },
            UserRole::Trainer => ListClientsFilter {
                status,
                trainer_id: Some(actor.user_id),
            },
            UserRole::Client => return Err(ClientError::Forbidden("list clients")),
        };

        let clients = self.client_repo.find_all(filter).await.map_err(|err| {
            error!(actor_id = %actor.user_id, db_error = ?err, "clients: failed to list clients");
            ClientError::from_store(err)
        })?;
        Ok(clients.into_iter().map(ClientDto::from).collect())
    }

    pub async fn renew_subscription(
        &self,
        client_id: &str,
        renew_subscription_model: RenewSubscriptionModel,
        actor: Actor,
    ) -> UseCaseResult<ClientDto> {
        let client_id = DocumentId::parse(client_id.trim())?;
        if !actor.is_admin() {
            return Err(ClientError::Forbidden("renew subscriptions"));
        }
        if renew_subscription_model
            .package_duration
            .is_some_and(|weeks| !PACKAGE_DURATIONS_WEEKS.contains(&weeks))
        {
            return Err(ClientError::BadRequest(
                "package_duration must be 4, 8 or 12 weeks".to_string(),
            ));
        }
        if renew_subscription_model
            .end_date
            .is_some_and(|end| end <= renew_subscription_model.start_date)
        {
            return Err(ClientError::BadRequest(
                "end_date must be after start_date".to_string(),
            ));
        }

        let client = self.load_client(client_id).await?;
        if let Some(package_id) = renew_subscription_model.package_id {
            let package = self
                .package_repo
                .find_by_id(package_id)
                .await
                .map_err(|err| {
                    error!(%package_id, db_error = ?err, "clients: failed to load package");
                    ClientError::from_store(err)
                })?;
            if package.is_none() {
                return Err(ClientError::NotFound("package"));
            }
        }

        let renewal = renew_subscription_model
            .to_entity(client.package_duration)
            .map_err(|err| {
                warn!(%client_id, error = ?err, "clients: renewal window rejected");
                ClientError::BadRequest(err.to_string())
            })?;
        let renewed = self
            .client_repo
            .update_subscription(client_id, renewal)
            .await
            .map_err(|err| {
                error!(%client_id, db_error = ?err, "clients: failed to renew subscription");
                ClientError::from_store(err)
            })?
            .ok_or(ClientError::NotFound("client"))?;

        info!(
            %client_id,
            renewal_count = renewed.subscription.renewal_count,
            "clients: subscription renewed"
        );
        Ok(ClientDto::from(renewed))
    }

    async fn load_client(&self, client_id: DocumentId) -> UseCaseResult<ClientEntity> {
        self.client_repo
            .find_by_id(client_id)
            .await
            .map_err(|err| {
                error!(%client_id, db_error = ?err, "clients: failed to load client");
                ClientError::from_store(err)
            })?
            .ok_or(ClientError::NotFound("client"))
    }
}
