//! Stores for exercising failure paths.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::model::{Actor, Position, Profile, ProfileId, Relationship, Scope};
use crate::store::{BackendKind, LocalStore, MemoryStorage, WhakapapaStore};

fn refused() -> StoreError {
	StoreError::Status {
		status: 503,
		message: "unavailable".into(),
	}
}

/// Every call fails.
#[derive(Default)]
pub struct FailingStore;

#[async_trait(?Send)]
impl WhakapapaStore for FailingStore {
	fn kind(&self) -> BackendKind {
		BackendKind::Hosted
	}

	async fn list_members(&self, _: &Scope) -> StoreResult<Vec<ProfileId>> {
		Err(refused())
	}

	async fn list_relationships(&self, _: &Scope) -> StoreResult<Vec<Relationship>> {
		Err(refused())
	}

	async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
		Err(refused())
	}

	async fn add_member(&self, _: &Scope, _: &ProfileId) -> StoreResult<()> {
		Err(refused())
	}

	async fn add_relationship(&self, _: &Scope, _: &Relationship) -> StoreResult<()> {
		Err(refused())
	}

	async fn load_positions(&self, _: &Scope) -> StoreResult<HashMap<ProfileId, Position>> {
		Err(refused())
	}

	async fn save_position(&self, _: &Scope, _: &Position) -> StoreResult<()> {
		Err(refused())
	}

	async fn is_authorized(&self, _: &Actor) -> StoreResult<bool> {
		Err(refused())
	}
}

/// In-memory store that counts writes, can reject chosen position saves and
/// reports itself as any backend kind.
pub struct RecordingStore {
	inner: LocalStore<MemoryStorage>,
	pub kind: BackendKind,
	pub admin: bool,
	pub writes: Cell<usize>,
	pub reject_positions: RefCell<HashSet<ProfileId>>,
}

impl RecordingStore {
	pub fn new(kind: BackendKind) -> Self {
		Self {
			inner: LocalStore::new(MemoryStorage::default()),
			kind,
			admin: false,
			writes: Cell::new(0),
			reject_positions: RefCell::new(HashSet::new()),
		}
	}
}

#[async_trait(?Send)]
impl WhakapapaStore for RecordingStore {
	fn kind(&self) -> BackendKind {
		self.kind
	}

	async fn list_members(&self, scope: &Scope) -> StoreResult<Vec<ProfileId>> {
		self.inner.list_members(scope).await
	}

	async fn list_relationships(&self, scope: &Scope) -> StoreResult<Vec<Relationship>> {
		self.inner.list_relationships(scope).await
	}

	async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
		self.inner.list_profiles().await
	}

	async fn add_member(&self, scope: &Scope, profile_id: &ProfileId) -> StoreResult<()> {
		self.writes.set(self.writes.get() + 1);
		self.inner.add_member(scope, profile_id).await
	}

	async fn add_relationship(&self, scope: &Scope, rel: &Relationship) -> StoreResult<()> {
		self.writes.set(self.writes.get() + 1);
		self.inner.add_relationship(scope, rel).await
	}

	async fn load_positions(&self, scope: &Scope) -> StoreResult<HashMap<ProfileId, Position>> {
		self.inner.load_positions(scope).await
	}

	async fn save_position(&self, scope: &Scope, position: &Position) -> StoreResult<()> {
		self.writes.set(self.writes.get() + 1);
		if self.reject_positions.borrow().contains(&position.profile_id) {
			return Err(refused());
		}
		self.inner.save_position(scope, position).await
	}

	async fn is_authorized(&self, actor: &Actor) -> StoreResult<bool> {
		Ok(self.admin && actor.is_signed_in())
	}
}
