use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::clients::{ClientEntity, SubscriptionRenewalEntity},
    value_objects::{clients::ListClientsFilter, document_id::DocumentId},
};

#[automock]
#[async_trait]
pub trait ClientRepository {
    async fn find_by_id(&self, client_id: DocumentId) -> Result<Option<ClientEntity>>;
    async fn find_all(&self, filter: ListClientsFilter) -> Result<Vec<ClientEntity>>;
    /// Applies the renewal and bumps the renewal counter. `None` when the client is gone.
    async fn update_subscription(
        &self,
        client_id: DocumentId,
        renewal: SubscriptionRenewalEntity,
    ) -> Result<Option<ClientEntity>>;
}
