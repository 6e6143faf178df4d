use crate::domain::{
    entities::clients::ClientEntity,
    value_objects::{document_id::DocumentId, enums::user_roles::UserRole},
};

/// The authenticated caller as seen by the use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DocumentId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: DocumentId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins and trainers.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Trainer)
    }

    /// Admins manage every client, trainers only the clients assigned to them.
    pub fn can_manage_client(&self, client: &ClientEntity) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Trainer => client.trainer_id == Some(self.user_id),
            UserRole::Client => false,
        }
    }

    /// Managers of a client plus the client themself.
    pub fn can_view_client(&self, client: &ClientEntity) -> bool {
        match self.role {
            UserRole::Client => client.id == self.user_id,
            _ => self.can_manage_client(client),
        }
    }
}
