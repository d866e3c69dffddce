//! In-memory collaborators for unit tests.

use crate::core::credentials::{CredentialError, CredentialHasher};
use crate::core::relation_store::{RelationError, RelationStore};
use crate::core::service::{
    PackageError, PackageManager, PackageState, ServiceAction, ServiceError, ServiceManager,
};
use crate::models::relation::RelationId;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

/// Deterministic hasher: `plain$<password>`.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${}", plaintext))
    }
}

#[derive(Default)]
struct RelationsInner {
    relations: Vec<(RelationId, BTreeMap<String, String>)>,
    password_writes: HashMap<u32, usize>,
    failing: HashSet<u32>,
    listing_fails: bool,
}

/// Shared-state relation store; clones observe the same data.
#[derive(Clone, Default)]
pub struct MemoryRelationStore {
    inner: Rc<RefCell<RelationsInner>>,
}

impl MemoryRelationStore {
    pub fn with_relations(relations: impl IntoIterator<Item = RelationId>) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().relations = relations
            .into_iter()
            .map(|r| (r, BTreeMap::new()))
            .collect();
        store
    }

    /// Seed a value without counting it as a write.
    pub fn preset(&mut self, id: u32, key: &str, value: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some((_, data)) = inner.relations.iter_mut().find(|(r, _)| r.id == id) {
            data.insert(key.to_string(), value.to_string());
        }
    }

    pub fn value(&self, id: u32, key: &str) -> Option<String> {
        let inner = self.inner.borrow();
        inner
            .relations
            .iter()
            .find(|(r, _)| r.id == id)
            .and_then(|(_, data)| data.get(key).cloned())
    }

    pub fn password_writes(&self, id: u32) -> usize {
        self.inner
            .borrow()
            .password_writes
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_listed(&self, id: u32) -> bool {
        self.inner.borrow().relations.iter().any(|(r, _)| r.id == id)
    }

    pub fn fail_relation(&mut self, id: u32) {
        self.inner.borrow_mut().failing.insert(id);
    }

    pub fn fail_listing(&mut self) {
        self.inner.borrow_mut().listing_fails = true;
    }
}

impl RelationStore for MemoryRelationStore {
    fn relations(&self) -> Result<Vec<RelationId>, RelationError> {
        let inner = self.inner.borrow();
        if inner.listing_fails {
            return Err(RelationError::Unavailable("listing disabled".into()));
        }
        Ok(inner.relations.iter().map(|(r, _)| r.clone()).collect())
    }

    fn get(&self, relation: &RelationId, key: &str) -> Result<Option<String>, RelationError> {
        let inner = self.inner.borrow();
        if inner.failing.contains(&relation.id) {
            return Err(RelationError::Unavailable(format!("{} unreachable", relation)));
        }
        inner
            .relations
            .iter()
            .find(|(r, _)| r.id == relation.id)
            .map(|(_, data)| data.get(key).cloned())
            .ok_or_else(|| RelationError::NotFound(relation.clone()))
    }

    fn set(&mut self, relation: &RelationId, key: &str, value: &str) -> Result<(), RelationError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing.contains(&relation.id) {
            return Err(RelationError::Unavailable(format!("{} unreachable", relation)));
        }
        let data = inner
            .relations
            .iter_mut()
            .find(|(r, _)| r.id == relation.id)
            .map(|(_, data)| data)
            .ok_or_else(|| RelationError::NotFound(relation.clone()))?;
        data.insert(key.to_string(), value.to_string());
        if key == crate::constants::RELATION_PASSWORD_KEY {
            *inner.password_writes.entry(relation.id).or_insert(0) += 1;
        }
        Ok(())
    }

    fn remove(&mut self, relation: &RelationId) -> Result<bool, RelationError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing.contains(&relation.id) {
            return Err(RelationError::Unavailable(format!("{} unreachable", relation)));
        }
        let before = inner.relations.len();
        inner.relations.retain(|(r, _)| r.id != relation.id);
        Ok(inner.relations.len() != before)
    }
}

#[derive(Default)]
struct PackagesInner {
    calls: Vec<(String, PackageState)>,
}

#[derive(Clone, Default)]
pub struct FakePackages {
    inner: Rc<RefCell<PackagesInner>>,
    fail: bool,
}

impl FakePackages {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, PackageState)> {
        self.inner.borrow().calls.clone()
    }
}

impl PackageManager for FakePackages {
    fn ensure(&self, package: &str, state: PackageState) -> Result<(), PackageError> {
        self.inner
            .borrow_mut()
            .calls
            .push((package.to_string(), state));
        if self.fail {
            return Err(PackageError {
                package: package.to_string(),
                state,
                reason: "E: Unable to locate package".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Enable,
    Disable,
    Reload { restart_on_failure: bool },
}

#[derive(Default)]
struct ServiceInner {
    calls: Vec<Call>,
    running: bool,
    failed: bool,
}

#[derive(Clone, Default)]
pub struct FakeService {
    inner: Rc<RefCell<ServiceInner>>,
    fail: bool,
}

impl FakeService {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn set_state(&self, running: bool, failed: bool) {
        let mut inner = self.inner.borrow_mut();
        inner.running = running;
        inner.failed = failed;
    }

    fn record(&self, service: &str, call: Call, action: ServiceAction) -> Result<(), ServiceError> {
        self.inner.borrow_mut().calls.push(call);
        if self.fail {
            return Err(ServiceError {
                service: service.to_string(),
                action,
                reason: "Job failed".into(),
            });
        }
        Ok(())
    }
}

impl ServiceManager for FakeService {
    fn enable(&self, service: &str) -> Result<(), ServiceError> {
        self.record(service, Call::Enable, ServiceAction::Enable)
    }

    fn disable(&self, service: &str) -> Result<(), ServiceError> {
        self.record(service, Call::Disable, ServiceAction::Disable)
    }

    fn reload(&self, service: &str, restart_on_failure: bool) -> Result<(), ServiceError> {
        self.record(
            service,
            Call::Reload { restart_on_failure },
            ServiceAction::Reload,
        )
    }

    fn is_running(&self, _service: &str) -> bool {
        self.inner.borrow().running
    }

    fn is_failed(&self, _service: &str) -> bool {
        self.inner.borrow().failed
    }
}
