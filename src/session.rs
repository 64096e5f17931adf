//! The signed-in actor, restored once per page load.
//!
//! The hosted backend's auth client persists its session in local storage
//! under `sb-<project-ref>-auth-token`; we only read it.

use log::{debug, warn};
use serde::Deserialize;

use crate::config::{AppConfig, BackendConfig};
use crate::model::Actor;

#[derive(Deserialize)]
struct StoredUser {
	id: String,
	#[serde(default)]
	email: Option<String>,
}

#[derive(Deserialize)]
struct StoredSession {
	access_token: String,
	user: StoredUser,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
	pub actor: Actor,
	/// Bearer token for hosted requests made on the actor's behalf.
	pub access_token: Option<String>,
}

impl Session {
	/// Parses the auth client's persisted session document.
	pub fn from_auth_json(raw: &str) -> Option<Self> {
		let stored: StoredSession = serde_json::from_str(raw).ok()?;
		Some(Self {
			actor: Actor {
				id: Some(stored.user.id),
				email: stored.user.email,
			},
			access_token: Some(stored.access_token),
		})
	}

	/// Reads the hosted session from local storage; local mode is anonymous.
	pub fn restore(config: &AppConfig) -> Self {
		let BackendConfig::Hosted { url, .. } = &config.backend else {
			return Self::default();
		};
		let Some(key) = auth_storage_key(url) else {
			warn!("Cannot derive auth storage key from {url}");
			return Self::default();
		};
		let raw = web_sys::window()
			.and_then(|w| w.local_storage().ok().flatten())
			.and_then(|s| s.get_item(&key).ok().flatten());
		match raw.as_deref().and_then(Self::from_auth_json) {
			Some(session) => {
				debug!("Restored session for {:?}", session.actor.id);
				session
			}
			None => Self::default(),
		}
	}
}

/// `https://<ref>.supabase.co` → `sb-<ref>-auth-token`.
pub fn auth_storage_key(url: &str) -> Option<String> {
	let host = url
		.split("://")
		.nth(1)
		.unwrap_or(url)
		.split(['/', ':'])
		.next()?;
	let project_ref = host.split('.').next().filter(|r| !r.is_empty())?;
	Some(format!("sb-{project_ref}-auth-token"))
}
