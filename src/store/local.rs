use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{BackendKind, WhakapapaStore};
use crate::error::{StoreError, StoreResult};
use crate::model::{Actor, Position, Profile, ProfileId, Relationship, Scope};

const MEMBERS_KEY: &str = "whakapapa.members.v1";
const RELATIONS_KEY: &str = "whakapapa.relations.v1";
const POSITIONS_KEY: &str = "whakapapa.positions.v1";
const PROFILES_KEY: &str = "whakapapa.profiles.v1";

/// String key/value storage, e.g. `window.localStorage`.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> StoreResult<Option<String>>;
	fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// `window.localStorage`.
pub struct BrowserStorage(web_sys::Storage);

impl BrowserStorage {
	pub fn open() -> Option<Self> {
		web_sys::window()?
			.local_storage()
			.ok()
			.flatten()
			.map(Self)
	}
}

impl KeyValueStore for BrowserStorage {
	fn get(&self, key: &str) -> StoreResult<Option<String>> {
		self.0
			.get_item(key)
			.map_err(|e| StoreError::Storage(format!("{e:?}")))
	}

	fn set(&self, key: &str, value: &str) -> StoreResult<()> {
		self.0
			.set_item(key, value)
			.map_err(|e| StoreError::Storage(format!("{e:?}")))
	}
}

/// Process-local storage used when the browser offers none.
#[derive(Default)]
pub struct MemoryStorage(RefCell<HashMap<String, String>>);

impl KeyValueStore for MemoryStorage {
	fn get(&self, key: &str) -> StoreResult<Option<String>> {
		Ok(self.0.borrow().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> StoreResult<()> {
		self.0.borrow_mut().insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Offline store: JSON documents in key/value storage, one per scope and kind.
pub struct LocalStore<S> {
	storage: S,
}

impl<S: KeyValueStore> LocalStore<S> {
	pub fn new(storage: S) -> Self {
		Self { storage }
	}

	/// Replaces the cached profile directory.
	pub fn put_profiles(&self, profiles: &[Profile]) -> StoreResult<()> {
		self.write(PROFILES_KEY, &profiles)
	}

	fn scoped(base: &str, scope: &Scope) -> String {
		format!("{base}:{scope}")
	}

	/// Missing or unreadable documents read as empty.
	fn read<T: DeserializeOwned + Default>(&self, key: &str) -> StoreResult<T> {
		let Some(raw) = self.storage.get(key)? else {
			return Ok(T::default());
		};
		match serde_json::from_str(&raw) {
			Ok(value) => Ok(value),
			Err(err) => {
				warn!("Ignoring corrupt local data at {key}: {err}");
				Ok(T::default())
			}
		}
	}

	fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
		let raw = serde_json::to_string(value)?;
		self.storage.set(key, &raw)
	}
}

#[async_trait(?Send)]
impl<S: KeyValueStore> WhakapapaStore for LocalStore<S> {
	fn kind(&self) -> BackendKind {
		BackendKind::Local
	}

	async fn list_members(&self, scope: &Scope) -> StoreResult<Vec<ProfileId>> {
		self.read(&Self::scoped(MEMBERS_KEY, scope))
	}

	async fn list_relationships(&self, scope: &Scope) -> StoreResult<Vec<Relationship>> {
		self.read(&Self::scoped(RELATIONS_KEY, scope))
	}

	async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
		self.read(PROFILES_KEY)
	}

	async fn add_member(&self, scope: &Scope, profile_id: &ProfileId) -> StoreResult<()> {
		let key = Self::scoped(MEMBERS_KEY, scope);
		let mut members: Vec<ProfileId> = self.read(&key)?;
		if members.contains(profile_id) {
			return Ok(());
		}
		members.push(profile_id.clone());
		self.write(&key, &members)
	}

	async fn add_relationship(&self, scope: &Scope, rel: &Relationship) -> StoreResult<()> {
		let key = Self::scoped(RELATIONS_KEY, scope);
		let mut rels: Vec<Relationship> = self.read(&key)?;
		rels.push(rel.clone());
		self.write(&key, &rels)
	}

	async fn load_positions(&self, scope: &Scope) -> StoreResult<HashMap<ProfileId, Position>> {
		let saved: Vec<Position> = self.read(&Self::scoped(POSITIONS_KEY, scope))?;
		Ok(saved
			.into_iter()
			.map(|p| (p.profile_id.clone(), p))
			.collect())
	}

	async fn save_position(&self, scope: &Scope, position: &Position) -> StoreResult<()> {
		let key = Self::scoped(POSITIONS_KEY, scope);
		let mut saved: Vec<Position> = self.read(&key)?;
		match saved
			.iter_mut()
			.find(|p| p.profile_id == position.profile_id)
		{
			Some(existing) => *existing = position.clone(),
			None => saved.push(position.clone()),
		}
		self.write(&key, &saved)
	}

	async fn is_authorized(&self, _actor: &Actor) -> StoreResult<bool> {
		// Local mode has no accounts; whoever holds the browser edits the tree.
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::model::RelationKind;

	fn store() -> LocalStore<MemoryStorage> {
		LocalStore::new(MemoryStorage::default())
	}

	#[test]
	fn add_member_twice_keeps_one_entry() {
		let store = store();
		let scope = Scope::shared();
		let id = ProfileId::new("a");
		block_on(store.add_member(&scope, &id)).unwrap();
		block_on(store.add_member(&scope, &id)).unwrap();
		assert_eq!(block_on(store.list_members(&scope)).unwrap(), vec![id]);
	}

	#[test]
	fn scopes_are_isolated() {
		let store = store();
		block_on(store.add_member(&Scope::shared(), &"a".into())).unwrap();
		let other = Scope::from("kainga".to_string());
		assert!(block_on(store.list_members(&other)).unwrap().is_empty());
	}

	#[test]
	fn relationships_are_append_only() {
		let store = store();
		let scope = Scope::shared();
		let rel = Relationship::new("a", "b", RelationKind::Parent);
		block_on(store.add_relationship(&scope, &rel)).unwrap();
		block_on(store.add_relationship(&scope, &rel)).unwrap();
		assert_eq!(
			block_on(store.list_relationships(&scope)).unwrap(),
			vec![rel.clone(), rel]
		);
	}

	#[test]
	fn save_position_upserts_by_id() {
		let store = store();
		let scope = Scope::shared();
		block_on(store.save_position(&scope, &Position::now("a".into(), 1.0, 2.0))).unwrap();
		block_on(store.save_position(&scope, &Position::now("b".into(), 5.0, 5.0))).unwrap();
		block_on(store.save_position(&scope, &Position::now("a".into(), 3.0, 4.0))).unwrap();
		let positions = block_on(store.load_positions(&scope)).unwrap();
		assert_eq!(positions.len(), 2);
		let a = &positions[&ProfileId::new("a")];
		assert_eq!((a.x, a.y), (3.0, 4.0));
	}

	#[test]
	fn corrupt_document_reads_as_empty() {
		let storage = MemoryStorage::default();
		storage
			.set("whakapapa.members.v1:shared", "{not json")
			.unwrap();
		let store = LocalStore::new(storage);
		assert!(block_on(store.list_members(&Scope::shared())).unwrap().is_empty());
	}

	#[test]
	fn profiles_round_trip_through_directory_cache() {
		let store = store();
		let profiles = vec![Profile::new("a", Some("Aroha")).with_avatar("a.png")];
		store.put_profiles(&profiles).unwrap();
		assert_eq!(block_on(store.list_profiles()).unwrap(), profiles);
	}
}
