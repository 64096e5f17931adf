use std::collections::HashMap;

use log::{error, info};

use crate::error::StoreResult;
use crate::model::{Position, Profile, ProfileId, Relationship, Scope};
use crate::store::{BackendKind, WhakapapaStore};

const PROFILES_FAILED: &str = "Kāore e taea te tiki kōtaha / Cannot load profiles.";
const TREE_FAILED: &str = "Kāore i taea te uta te rākau whakapapa / Unable to load family tree.";
const POSITIONS_FAILED: &str = "Kāore i taea te uta te tūranga / Saved layout unavailable; arranging automatically.";
const EMPTY_TREE: &str = "Kōwhiria ngā kōtaha ki te tāpiri ki te rākau / Select profiles to add to the tree.";
const LOCAL_NO_PROFILES: &str = "Local mode: no profile directory configured.";

/// Everything the page needs to draw one scope's tree.
#[derive(Clone, Debug, Default)]
pub struct LoadedTree {
	/// Profile directory keyed by id.
	pub profiles: HashMap<ProfileId, Profile>,
	/// Members in the order they were added.
	pub member_ids: Vec<ProfileId>,
	/// Stored relationships; the graph builder removes duplicates.
	pub relationships: Vec<Relationship>,
	/// Saved layout, possibly covering only some members.
	pub positions: HashMap<ProfileId, Position>,
	/// User-facing notes about failures or an empty tree.
	pub status: Vec<String>,
}

/// Drops the "select profiles" prompt once the tree has members.
pub fn refresh_status(status: &mut Vec<String>, members: &[ProfileId]) {
	if !members.is_empty() {
		status.retain(|line| line != EMPTY_TREE);
	}
}

fn or_empty<T: Default>(result: StoreResult<T>, what: &str, message: &str, status: &mut Vec<String>) -> T {
	match result {
		Ok(value) => value,
		Err(err) => {
			error!("Loading {what} failed: {err}");
			if !status.iter().any(|s| s == message) {
				status.push(message.to_string());
			}
			T::default()
		}
	}
}

/// Reads profiles, members, relationships and positions concurrently.
/// Failures leave that collection empty and add a status line; this never
/// fails as a whole.
pub async fn load_tree(store: &dyn WhakapapaStore, scope: &Scope) -> LoadedTree {
	let (profiles, members, relationships, positions) = futures::join!(
		store.list_profiles(),
		store.list_members(scope),
		store.list_relationships(scope),
		store.load_positions(scope),
	);

	let mut status = Vec::new();
	let profiles = or_empty(profiles, "profiles", PROFILES_FAILED, &mut status);
	let member_ids = or_empty(members, "members", TREE_FAILED, &mut status);
	let relationships = or_empty(relationships, "relationships", TREE_FAILED, &mut status);
	let positions = or_empty(positions, "positions", POSITIONS_FAILED, &mut status);

	if status.is_empty() {
		if profiles.is_empty() && store.kind() == BackendKind::Local {
			status.push(LOCAL_NO_PROFILES.to_string());
		} else if member_ids.is_empty() {
			status.push(EMPTY_TREE.to_string());
		}
	}

	info!(
		"Loaded scope {scope}: {} profiles, {} members, {} relationships, {} positions",
		profiles.len(),
		member_ids.len(),
		relationships.len(),
		positions.len()
	);

	LoadedTree {
		profiles: profiles
			.into_iter()
			.map(|p| (p.id.clone(), p))
			.collect(),
		member_ids,
		relationships,
		positions,
		status,
	}
}
