pub mod clients;
pub mod packages;
pub mod plan_assignments;
pub mod plans;
