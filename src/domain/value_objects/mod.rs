pub mod clients;
pub mod document_id;
pub mod enums;
pub mod iam;
pub mod packages;
pub mod plans;
pub mod revenue;
