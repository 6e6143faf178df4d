use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{prelude::*, update};

use crate::{
    domain::{
        entities::clients::{ClientEntity, ClientRow, SubscriptionRenewalEntity},
        repositories::clients::ClientRepository,
        value_objects::{clients::ListClientsFilter, document_id::DocumentId},
    },
    infrastructure::postgres::{
        postgres_connection::{PgPoolSquad, checkout, classify_diesel_error},
        schema::clients,
    },
};

pub struct ClientPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ClientPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ClientRepository for ClientPostgres {
    async fn find_by_id(&self, client_id: DocumentId) -> Result<Option<ClientEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let row = clients::table
            .find(client_id.to_string())
            .select(ClientRow::as_select())
            .first::<ClientRow>(&mut conn)
            .optional()
            .map_err(classify_diesel_error)?;

        row.map(ClientEntity::try_from).transpose()
    }

    async fn find_all(&self, filter: ListClientsFilter) -> Result<Vec<ClientEntity>> {
        let mut conn = checkout(&self.db_pool)?;
        let mut query = clients::table
            .select(ClientRow::as_select())
            .into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(clients::status.eq(status.to_string()));
        }

        if let Some(trainer_id) = filter.trainer_id {
            query = query.filter(clients::trainer_id.eq(trainer_id.to_string()));
        }

        let rows = query
            .order(clients::created_at.desc())
            .load::<ClientRow>(&mut conn)
            .map_err(classify_diesel_error)?;

        rows.into_iter().map(ClientEntity::try_from).collect()
    }

    async fn update_subscription(
        &self,
        client_id: DocumentId,
        renewal: SubscriptionRenewalEntity,
    ) -> Result<Option<ClientEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let row = update(clients::table.find(client_id.to_string()))
            .set((&renewal, clients::renewal_count.eq(clients::renewal_count + 1)))
            .returning(ClientRow::as_returning())
            .get_result::<ClientRow>(&mut conn)
            .optional()
            .map_err(classify_diesel_error)?;

        row.map(ClientEntity::try_from).transpose()
    }
}
