use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;

use crate::{
    domain::{
        entities::packages::{PackageEntity, PackageRow},
        repositories::packages::PackageRepository,
        value_objects::document_id::DocumentId,
    },
    infrastructure::postgres::{
        postgres_connection::{PgPoolSquad, checkout, classify_diesel_error},
        schema::packages,
    },
};

pub struct PackagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PackagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PackageRepository for PackagePostgres {
    async fn find_by_id(&self, package_id: DocumentId) -> Result<Option<PackageEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let row = packages::table
            .find(package_id.to_string())
            .select(PackageRow::as_select())
            .first::<PackageRow>(&mut conn)
            .optional()
            .map_err(classify_diesel_error)?;

        row.map(PackageEntity::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<PackageEntity>> {
        let mut conn = checkout(&self.db_pool)?;

        let rows = packages::table
            .select(PackageRow::as_select())
            .order((packages::price.asc(), packages::created_at.asc()))
            .load::<PackageRow>(&mut conn)
            .map_err(classify_diesel_error)?;

        rows.into_iter().map(PackageEntity::try_from).collect()
    }
}
