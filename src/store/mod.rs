//! Persistence for members, relationships and saved positions.
//!
//! The page talks to one [`WhakapapaStore`], picked once by [`connect`] from
//! the page configuration. Both implementations share the same semantics:
//! member and relationship lists only grow, positions are upserted by
//! profile id.

use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use log::{info, warn};

use crate::config::{AppConfig, BackendConfig};
use crate::error::StoreResult;
use crate::model::{Actor, Position, Profile, ProfileId, Relationship, Scope};
use crate::session::Session;

mod hosted;
mod local;

pub use hosted::HostedStore;
pub use local::{BrowserStorage, KeyValueStore, LocalStore, MemoryStorage};

/// Which persistence a store uses; shown in status text and used to decide
/// whether writes need a signed-in actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
	/// Browser local storage, no accounts.
	Local,
	/// The hosted REST backend.
	Hosted,
}

/// Async CRUD surface the tree page needs. All calls are scoped explicitly.
#[async_trait(?Send)]
pub trait WhakapapaStore {
	/// Backend behind this store.
	fn kind(&self) -> BackendKind;

	/// Profile ids in the scope's tree, in the order they were added.
	async fn list_members(&self, scope: &Scope) -> StoreResult<Vec<ProfileId>>;

	/// Every stored relationship, duplicates included.
	async fn list_relationships(&self, scope: &Scope) -> StoreResult<Vec<Relationship>>;

	/// The whole profile directory.
	async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;

	/// Appends a member to the scope.
	async fn add_member(&self, scope: &Scope, profile_id: &ProfileId) -> StoreResult<()>;

	/// Appends a relationship to the scope.
	async fn add_relationship(&self, scope: &Scope, rel: &Relationship) -> StoreResult<()>;

	/// Saved positions keyed by profile id.
	async fn load_positions(&self, scope: &Scope) -> StoreResult<HashMap<ProfileId, Position>>;

	/// Insert or overwrite the position stored for `position.profile_id`.
	async fn save_position(&self, scope: &Scope, position: &Position) -> StoreResult<()>;

	/// Administrative check; the email allow-list is applied by the caller.
	async fn is_authorized(&self, actor: &Actor) -> StoreResult<bool>;
}

/// Builds the store named by the configuration.
pub fn connect(config: &AppConfig, session: &Session) -> Rc<dyn WhakapapaStore> {
	match &config.backend {
		BackendConfig::Hosted { url, anon_key } => {
			info!("Using hosted store at {url}");
			Rc::new(HostedStore::new(
				url,
				anon_key,
				session.access_token.clone(),
			))
		}
		BackendConfig::Local => match BrowserStorage::open() {
			Some(storage) => {
				info!("Using browser local storage");
				Rc::new(seeded(LocalStore::new(storage), &config.profiles))
			}
			None => {
				warn!("Local storage unavailable; tree changes will not persist");
				Rc::new(seeded(
					LocalStore::new(MemoryStorage::default()),
					&config.profiles,
				))
			}
		},
	}
}

fn seeded<S: KeyValueStore>(store: LocalStore<S>, profiles: &[Profile]) -> LocalStore<S> {
	if !profiles.is_empty() {
		if let Err(err) = store.put_profiles(profiles) {
			warn!("Could not cache configured profiles: {err}");
		}
	}
	store
}
