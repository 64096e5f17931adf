use log::{info, warn};

use crate::config::AppConfig;
use crate::model::{Actor, Scope};
use crate::session::Session;
use crate::store::{BackendKind, WhakapapaStore};

/// Who is looking at which tree, resolved once per page load and passed
/// explicitly to every operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeContext {
	pub scope: Scope,
	pub actor: Actor,
	pub backend: BackendKind,
	/// May add members, add relationships and arrange the layout.
	pub authorized: bool,
}

impl TreeContext {
	/// Resolves who is acting and whether they may edit. Never fails; a
	/// failed admin lookup reads as "not authorized".
	pub async fn resolve(config: &AppConfig, store: &dyn WhakapapaStore, session: &Session) -> Self {
		let actor = session.actor.clone();
		let backend = store.kind();
		let authorized = match backend {
			BackendKind::Hosted if !actor.is_signed_in() => false,
			_ => {
				let listed = actor
					.email
					.as_deref()
					.is_some_and(|email| config.is_admin_email(email));
				listed
					|| store.is_authorized(&actor).await.unwrap_or_else(|err| {
						warn!("Admin check failed: {err}");
						false
					})
			}
		};
		info!(
			"Tree context: scope={} actor={:?} authorized={authorized}",
			config.scope(),
			actor.id
		);
		Self {
			scope: config.scope(),
			actor,
			backend,
			authorized,
		}
	}

	/// Hosted writes need a signed-in actor; local writes never do.
	pub fn needs_sign_in(&self) -> bool {
		self.backend == BackendKind::Hosted && !self.actor.is_signed_in()
	}
}
