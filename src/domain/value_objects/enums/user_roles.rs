use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Trainer,
    Client,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            UserRole::Admin => "admin",
            UserRole::Trainer => "trainer",
            UserRole::Client => "client",
        };
        write!(f, "{}", role)
    }
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "trainer" => Some(UserRole::Trainer),
            "client" => Some(UserRole::Client),
            _ => None,
        }
    }
}
