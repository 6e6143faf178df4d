//! Process-local repositories used by the use case and router tests.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{
    entities::{
        clients::{ClientEntity, SubscriptionRenewalEntity},
        packages::PackageEntity,
        plan_assignments::PlanAssignmentEntity,
        plans::PlanEntity,
    },
    errors::StoreError,
    repositories::{
        clients::ClientRepository, packages::PackageRepository,
        plan_assignments::PlanAssignmentRepository, plans::PlanRepository,
    },
    value_objects::{
        clients::ListClientsFilter,
        document_id::DocumentId,
        enums::{client_statuses::ClientStatus, plan_kinds::PlanKind},
    },
};

/// One store backing all four repository traits, so the assignment join can
/// see the plans table. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    clients: RwLock<HashMap<DocumentId, ClientEntity>>,
    packages: RwLock<HashMap<DocumentId, PackageEntity>>,
    plans: RwLock<HashMap<DocumentId, PlanEntity>>,
    assignments: RwLock<HashMap<DocumentId, PlanAssignmentEntity>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_client(&self, client: ClientEntity) {
        self.inner.clients.write().unwrap().insert(client.id, client);
    }

    pub fn seed_package(&self, package: PackageEntity) {
        self.inner.packages.write().unwrap().insert(package.id, package);
    }

    pub fn seed_plan(&self, plan: PlanEntity) {
        self.inner.plans.write().unwrap().insert(plan.id, plan);
    }

    pub fn seed_assignment(&self, assignment: PlanAssignmentEntity) {
        self.inner
            .assignments
            .write()
            .unwrap()
            .insert(assignment.id, assignment);
    }

    pub fn plan(&self, plan_id: DocumentId) -> Option<PlanEntity> {
        self.inner.plans.read().unwrap().get(&plan_id).cloned()
    }

    pub fn assignments_for(&self, kind: PlanKind, client_id: DocumentId) -> Vec<PlanAssignmentEntity> {
        self.inner
            .assignments
            .read()
            .unwrap()
            .values()
            .filter(|a| a.kind == kind && a.client_id == client_id)
            .cloned()
            .collect()
    }

    pub fn legacy_plans_for(&self, kind: PlanKind, client_id: DocumentId) -> Vec<PlanEntity> {
        self.inner
            .plans
            .read()
            .unwrap()
            .values()
            .filter(|p| is_legacy_of(p, kind, client_id))
            .cloned()
            .collect()
    }
}

fn is_legacy_of(plan: &PlanEntity, kind: PlanKind, client_id: DocumentId) -> bool {
    plan.kind == kind && !plan.is_template && plan.client_id == Some(client_id)
}

fn newest_first(plans: &mut [PlanEntity]) {
    plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn find_by_id(&self, client_id: DocumentId) -> Result<Option<ClientEntity>> {
        Ok(self.inner.clients.read().unwrap().get(&client_id).cloned())
    }

    async fn find_all(&self, filter: ListClientsFilter) -> Result<Vec<ClientEntity>> {
        let mut clients: Vec<ClientEntity> = self
            .inner
            .clients
            .read()
            .unwrap()
            .values()
            .filter(|c| filter.status.is_none_or(|status| c.status == status))
            .filter(|c| filter.trainer_id.is_none_or(|trainer| c.trainer_id == Some(trainer)))
            .cloned()
            .collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }

    async fn update_subscription(
        &self,
        client_id: DocumentId,
        renewal: SubscriptionRenewalEntity,
    ) -> Result<Option<ClientEntity>> {
        let mut clients = self.inner.clients.write().unwrap();
        let Some(client) = clients.get_mut(&client_id) else {
            return Ok(None);
        };

        client.subscription.start_date = renewal.subscription_start_date;
        client.subscription.end_date = renewal.subscription_end_date;
        client.subscription.renewal_count += 1;
        client.subscription.last_renewed_at = renewal.last_renewed_at;
        if let Some(package_id) = renewal.package_id.as_deref() {
            client.package_id = DocumentId::parse(package_id).ok();
        }
        if renewal.package_duration.is_some() {
            client.package_duration = renewal.package_duration;
        }
        client.status = ClientStatus::parse(&renewal.status).unwrap_or_default();

        Ok(Some(client.clone()))
    }
}

#[async_trait]
impl PackageRepository for InMemoryStore {
    async fn find_by_id(&self, package_id: DocumentId) -> Result<Option<PackageEntity>> {
        Ok(self.inner.packages.read().unwrap().get(&package_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<PackageEntity>> {
        let mut packages: Vec<PackageEntity> =
            self.inner.packages.read().unwrap().values().cloned().collect();
        packages.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(packages)
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn find_by_id(&self, kind: PlanKind, plan_id: DocumentId) -> Result<Option<PlanEntity>> {
        Ok(self
            .inner
            .plans
            .read()
            .unwrap()
            .get(&plan_id)
            .filter(|p| p.kind == kind)
            .cloned())
    }

    async fn find_legacy_for_client(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<PlanEntity>> {
        let mut plans = self.legacy_plans_for(kind, client_id);
        newest_first(&mut plans);
        Ok(plans)
    }

    async fn delete_legacy_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize> {
        let mut plans = self.inner.plans.write().unwrap();
        let mut assignments = self.inner.assignments.write().unwrap();

        let mut removed = Vec::new();
        for (plan_id, plan) in plans.iter_mut() {
            if *plan_id == keep_plan_id || !is_legacy_of(plan, kind, client_id) {
                continue;
            }
            if assignments.values().any(|a| a.plan_id == *plan_id) {
                plan.client_id = None;
            } else {
                removed.push(*plan_id);
            }
        }
        for plan_id in &removed {
            plans.remove(plan_id);
        }
        // Mirrors ON DELETE CASCADE on plan_assignments.plan_id.
        assignments.retain(|_, a| !removed.contains(&a.plan_id));

        Ok(removed.len())
    }

    async fn find_legacy(&self, kind: PlanKind) -> Result<Vec<PlanEntity>> {
        let mut plans: Vec<PlanEntity> = self
            .inner
            .plans
            .read()
            .unwrap()
            .values()
            .filter(|p| p.kind == kind && !p.is_template && p.client_id.is_some())
            .cloned()
            .collect();
        newest_first(&mut plans);
        Ok(plans)
    }

    async fn clear_legacy_client(&self, kind: PlanKind, plan_id: DocumentId) -> Result<()> {
        if let Some(plan) = self
            .inner
            .plans
            .write()
            .unwrap()
            .get_mut(&plan_id)
            .filter(|p| p.kind == kind)
        {
            plan.client_id = None;
        }
        Ok(())
    }

    async fn list_templates(&self, kind: PlanKind) -> Result<Vec<PlanEntity>> {
        let mut plans: Vec<PlanEntity> = self
            .inner
            .plans
            .read()
            .unwrap()
            .values()
            .filter(|p| p.kind == kind && p.is_template)
            .cloned()
            .collect();
        newest_first(&mut plans);
        Ok(plans)
    }

    async fn insert(&self, plan: PlanEntity) -> Result<()> {
        self.seed_plan(plan);
        Ok(())
    }
}

#[async_trait]
impl PlanAssignmentRepository for InMemoryStore {
    async fn find_one(
        &self,
        kind: PlanKind,
        plan_id: DocumentId,
        client_id: DocumentId,
    ) -> Result<Option<PlanAssignmentEntity>> {
        Ok(self
            .assignments_for(kind, client_id)
            .into_iter()
            .find(|a| a.plan_id == plan_id))
    }

    async fn delete_for_client_except(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
        keep_plan_id: DocumentId,
    ) -> Result<usize> {
        let mut assignments = self.inner.assignments.write().unwrap();
        let before = assignments.len();
        assignments
            .retain(|_, a| !(a.kind == kind && a.client_id == client_id && a.plan_id != keep_plan_id));
        Ok(before - assignments.len())
    }

    async fn insert(&self, assignment: PlanAssignmentEntity) -> Result<()> {
        let mut assignments = self.inner.assignments.write().unwrap();
        // Mirrors the (client_id, kind) unique index.
        if assignments
            .values()
            .any(|a| a.kind == assignment.kind && a.client_id == assignment.client_id)
        {
            return Err(StoreError::Conflict("plan_assignments_client_kind_key".to_string()).into());
        }
        assignments.insert(assignment.id, assignment);
        Ok(())
    }

    async fn find_for_client_with_plans(
        &self,
        kind: PlanKind,
        client_id: DocumentId,
    ) -> Result<Vec<(PlanAssignmentEntity, PlanEntity)>> {
        let plans = self.inner.plans.read().unwrap();
        Ok(self
            .assignments_for(kind, client_id)
            .into_iter()
            .filter_map(|a| plans.get(&a.plan_id).cloned().map(|plan| (a, plan)))
            .collect())
    }

    async fn exists_for_client(&self, kind: PlanKind, client_id: DocumentId) -> Result<bool> {
        Ok(!self.assignments_for(kind, client_id).is_empty())
    }
}
