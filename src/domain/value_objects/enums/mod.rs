pub mod client_statuses;
pub mod plan_kinds;
pub mod user_roles;
