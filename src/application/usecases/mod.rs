use crate::domain::errors::StoreError;

pub mod clients;
pub mod packages;
pub mod plan_assignment;
pub mod revenue_reports;

pub(crate) fn is_store_unavailable(err: &anyhow::Error) -> bool {
    matches!(StoreError::classify(err), Some(StoreError::Unavailable(_)))
}

pub(crate) fn is_store_conflict(err: &anyhow::Error) -> bool {
    matches!(StoreError::classify(err), Some(StoreError::Conflict(_)))
}
