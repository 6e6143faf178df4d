use crate::{
    domain::value_objects::enums::plan_kinds::PlanKind,
    infrastructure::axum_http::error_responses::AppError,
};

pub mod clients;
pub mod packages;
pub mod plans;
pub mod reports;

/// `{kind}` path segment of the plan routes.
pub fn parse_kind(raw: &str) -> Result<PlanKind, AppError> {
    PlanKind::try_from(raw).map_err(|err| AppError::BadRequest(err.to_string()))
}
