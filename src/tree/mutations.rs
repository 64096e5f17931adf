//! Add-member and add-relationship submissions. Validation happens before
//! the store is touched; a rejected submission issues no request.

use std::collections::HashMap;

use log::{error, info};

use super::context::TreeContext;
use crate::error::{MutationError, ValidationError};
use crate::model::{Profile, ProfileId, RelationKind, Relationship};
use crate::store::WhakapapaStore;

/// Profiles that can still be added, sorted by label.
pub fn candidate_profiles(
	profiles: &HashMap<ProfileId, Profile>,
	members: &[ProfileId],
) -> Vec<Profile> {
	let mut out: Vec<Profile> = profiles
		.values()
		.filter(|p| !members.contains(&p.id))
		.cloned()
		.collect();
	out.sort_by(|a, b| {
		a.label()
			.to_lowercase()
			.cmp(&b.label().to_lowercase())
			.then_with(|| a.id.cmp(&b.id))
	});
	out
}

/// Appends a newly added member unless it is already listed. Overlapping
/// submissions of one profile can both succeed at the store.
pub fn record_member(members: &mut Vec<ProfileId>, id: &ProfileId) -> bool {
	if members.contains(id) {
		return false;
	}
	members.push(id.clone());
	true
}

fn check_editor(ctx: &TreeContext) -> Result<(), ValidationError> {
	if ctx.needs_sign_in() {
		return Err(ValidationError::NotSignedIn);
	}
	if !ctx.authorized {
		return Err(ValidationError::NotAuthorized);
	}
	Ok(())
}

pub fn validate_member(
	ctx: &TreeContext,
	members: &[ProfileId],
	profile_id: &str,
) -> Result<ProfileId, ValidationError> {
	check_editor(ctx)?;
	let profile_id = profile_id.trim();
	if profile_id.is_empty() {
		return Err(ValidationError::MissingProfile);
	}
	let id = ProfileId::new(profile_id);
	if members.contains(&id) {
		return Err(ValidationError::AlreadyMember);
	}
	Ok(id)
}

pub fn validate_relationship(
	ctx: &TreeContext,
	members: &[ProfileId],
	from: &str,
	to: &str,
	kind: &str,
) -> Result<Relationship, ValidationError> {
	let (from, to, kind) = (from.trim(), to.trim(), kind.trim());
	if from.is_empty() || to.is_empty() || kind.is_empty() {
		return Err(ValidationError::MissingRelationFields);
	}
	if from == to {
		return Err(ValidationError::SelfRelationship);
	}
	for id in [from, to] {
		if !members.iter().any(|m| m.as_str() == id) {
			return Err(ValidationError::NotAMember(id.to_string()));
		}
	}
	check_editor(ctx)?;
	Ok(Relationship::new(from, to, RelationKind::parse(kind)))
}

/// Adds a profile to the scope. The caller appends the node to the live
/// graph on success.
pub async fn add_member(
	store: &dyn WhakapapaStore,
	ctx: &TreeContext,
	members: &[ProfileId],
	profile_id: &str,
) -> Result<ProfileId, MutationError> {
	let id = validate_member(ctx, members, profile_id)?;
	store.add_member(&ctx.scope, &id).await.map_err(|err| {
		error!("Adding member {id} failed: {err}");
		err
	})?;
	info!("Added member {id} to {}", ctx.scope);
	Ok(id)
}

/// Records a relationship between two members.
pub async fn add_relationship(
	store: &dyn WhakapapaStore,
	ctx: &TreeContext,
	members: &[ProfileId],
	from: &str,
	to: &str,
	kind: &str,
) -> Result<Relationship, MutationError> {
	let rel = validate_relationship(ctx, members, from, to, kind)?;
	store
		.add_relationship(&ctx.scope, &rel)
		.await
		.map_err(|err| {
			error!("Adding relationship {} -> {} failed: {err}", rel.from_id, rel.to_id);
			err
		})?;
	info!("Added {} relationship {} -> {}", rel.kind, rel.from_id, rel.to_id);
	Ok(rel)
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::model::{Actor, Scope};
	use crate::store::BackendKind;
	use crate::tree::test_support::{FailingStore, RecordingStore};

	fn editor(backend: BackendKind) -> TreeContext {
		TreeContext {
			scope: Scope::shared(),
			actor: Actor {
				id: Some("u1".into()),
				email: None,
			},
			backend,
			authorized: true,
		}
	}

	fn ids(raw: &[&str]) -> Vec<ProfileId> {
		raw.iter().map(|&id| ProfileId::new(id)).collect()
	}

	fn rejected(result: Result<impl std::fmt::Debug, MutationError>) -> ValidationError {
		match result {
			Err(MutationError::Validation(v)) => v,
			other => panic!("expected validation error, got {other:?}"),
		}
	}

	#[test]
	fn adding_same_member_twice_keeps_one() {
		let store = RecordingStore::new(BackendKind::Local);
		let ctx = editor(BackendKind::Local);
		let mut members = Vec::new();

		let id = block_on(add_member(&store, &ctx, &members, "A")).unwrap();
		members.push(id);
		let second = rejected(block_on(add_member(&store, &ctx, &members, "A")));

		assert_eq!(second, ValidationError::AlreadyMember);
		assert_eq!(store.writes.get(), 1);
		assert_eq!(
			block_on(store.list_members(&ctx.scope)).unwrap(),
			ids(&["A"])
		);
	}

	#[test]
	fn overlapping_submissions_record_the_member_once() {
		let store = RecordingStore::new(BackendKind::Local);
		let ctx = editor(BackendKind::Local);
		let (first, second) = block_on(async {
			futures::join!(
				add_member(&store, &ctx, &[], "A"),
				add_member(&store, &ctx, &[], "A")
			)
		});

		let mut members = Vec::new();
		assert!(record_member(&mut members, &first.unwrap()));
		assert!(!record_member(&mut members, &second.unwrap()));
		assert_eq!(members, ids(&["A"]));
		assert_eq!(
			block_on(store.list_members(&ctx.scope)).unwrap(),
			ids(&["A"])
		);
	}

	#[test]
	fn blank_selection_is_rejected() {
		let store = RecordingStore::new(BackendKind::Local);
		let err = rejected(block_on(add_member(
			&store,
			&editor(BackendKind::Local),
			&[],
			"  ",
		)));
		assert_eq!(err, ValidationError::MissingProfile);
		assert_eq!(store.writes.get(), 0);
	}

	#[test]
	fn hosted_writes_need_a_signed_in_actor() {
		let store = RecordingStore::new(BackendKind::Hosted);
		let mut ctx = editor(BackendKind::Hosted);
		ctx.actor = Actor::anonymous();
		let err = rejected(block_on(add_member(&store, &ctx, &[], "A")));
		assert_eq!(err, ValidationError::NotSignedIn);
		assert_eq!(store.writes.get(), 0);
	}

	#[test]
	fn visitors_cannot_add() {
		let store = RecordingStore::new(BackendKind::Hosted);
		let mut ctx = editor(BackendKind::Hosted);
		ctx.authorized = false;
		let members = ids(&["A", "B"]);
		assert_eq!(
			rejected(block_on(add_member(&store, &ctx, &members, "C"))),
			ValidationError::NotAuthorized
		);
		assert_eq!(
			rejected(block_on(add_relationship(
				&store, &ctx, &members, "A", "B", "parent"
			))),
			ValidationError::NotAuthorized
		);
		assert_eq!(store.writes.get(), 0);
	}

	#[test]
	fn self_relationship_never_reaches_the_store() {
		let store = RecordingStore::new(BackendKind::Local);
		let err = rejected(block_on(add_relationship(
			&store,
			&editor(BackendKind::Local),
			&ids(&["A"]),
			"A",
			"A",
			"parent",
		)));
		assert_eq!(err, ValidationError::SelfRelationship);
		assert_eq!(store.writes.get(), 0);
	}

	#[test]
	fn relationship_fields_are_required() {
		let store = RecordingStore::new(BackendKind::Local);
		let ctx = editor(BackendKind::Local);
		let members = ids(&["A", "B"]);
		for (from, to, kind) in [("", "B", "parent"), ("A", "", "parent"), ("A", "B", " ")] {
			let err = rejected(block_on(add_relationship(
				&store, &ctx, &members, from, to, kind,
			)));
			assert_eq!(err, ValidationError::MissingRelationFields);
		}
		assert_eq!(store.writes.get(), 0);
	}

	#[test]
	fn relationship_endpoints_must_be_members() {
		let store = RecordingStore::new(BackendKind::Local);
		let err = rejected(block_on(add_relationship(
			&store,
			&editor(BackendKind::Local),
			&ids(&["A"]),
			"A",
			"Z",
			"spouse",
		)));
		assert_eq!(err, ValidationError::NotAMember("Z".into()));
	}

	#[test]
	fn relationship_kind_is_normalised() {
		let store = RecordingStore::new(BackendKind::Local);
		let ctx = editor(BackendKind::Local);
		let rel = block_on(add_relationship(
			&store,
			&ctx,
			&ids(&["A", "B"]),
			"A",
			"B",
			"Spouse",
		))
		.unwrap();
		assert_eq!(rel.kind, RelationKind::Spouse);
		assert_eq!(
			block_on(store.list_relationships(&ctx.scope)).unwrap(),
			vec![rel]
		);
	}

	#[test]
	fn store_failure_is_reported() {
		let err = block_on(add_member(
			&FailingStore,
			&editor(BackendKind::Hosted),
			&[],
			"A",
		))
		.unwrap_err();
		assert!(matches!(err, MutationError::Store(_)));
		assert!(err.to_string().starts_with("Hapa tāpiri"));
	}

	#[test]
	fn candidates_exclude_members_and_sort_by_label() {
		let profiles: HashMap<_, _> = [
			Profile::new("1", Some("rangi")),
			Profile::new("2", Some("Aroha")),
			Profile::new("3", Some("Mere")),
		]
		.into_iter()
		.map(|p| (p.id.clone(), p))
		.collect();
		let labels: Vec<_> = candidate_profiles(&profiles, &ids(&["3"]))
			.iter()
			.map(|p| p.label().to_string())
			.collect();
		assert_eq!(labels, vec!["Aroha", "rangi"]);
	}
}
