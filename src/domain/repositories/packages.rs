use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{entities::packages::PackageEntity, value_objects::document_id::DocumentId};

#[automock]
#[async_trait]
pub trait PackageRepository {
    async fn find_by_id(&self, package_id: DocumentId) -> Result<Option<PackageEntity>>;
    async fn find_all(&self) -> Result<Vec<PackageEntity>>;
}
