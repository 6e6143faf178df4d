use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    application::usecases::is_store_unavailable,
    domain::{
        repositories::packages::PackageRepository,
        value_objects::{iam::Actor, packages::PackageDto},
    },
};

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl PackageError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PackageError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            PackageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct PackageUseCase<K>
where
    K: PackageRepository + Send + Sync + 'static,
{
    package_repo: Arc<K>,
}

impl<K> PackageUseCase<K>
where
    K: PackageRepository + Send + Sync + 'static,
{
    pub fn new(package_repo: Arc<K>) -> Self {
        Self { package_repo }
    }

    /// Admins also see archived packages.
    pub async fn list_packages(&self, actor: Actor) -> Result<Vec<PackageDto>, PackageError> {
        info!(actor_id = %actor.user_id, "packages: listing packages");
        let packages = self.package_repo.find_all().await.map_err(|err| {
            error!(db_error = ?err, "packages: failed to list packages");
            if is_store_unavailable(&err) {
                PackageError::StoreUnavailable(err)
            } else {
                PackageError::Internal(err)
            }
        })?;

        Ok(packages
            .into_iter()
            .filter(|package| package.is_active || actor.is_admin())
            .map(PackageDto::from)
            .collect())
    }
}
