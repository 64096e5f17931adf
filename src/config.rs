//! Page configuration read from `window.WHAKAPAPA_CONFIG`.

use log::warn;
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::ConfigError;
use crate::model::{Profile, ProfileId, Scope};

const CONFIG_GLOBAL: &str = "WHAKAPAPA_CONFIG";

/// Which persistence backend the page talks to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
	/// Browser local storage only.
	#[default]
	Local,
	/// PostgREST-style hosted backend.
	Hosted {
		/// Project base URL, e.g. `https://abc.supabase.co`
		url: String,
		/// Public anonymous API key
		#[serde(alias = "anonKey")]
		anon_key: String,
	},
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	pub backend: BackendConfig,
	/// Emails that may edit the tree regardless of the `admin_users` table.
	pub admin_emails: Vec<String>,
	/// Where clicking a node goes for read-only visitors; `{id}` is replaced.
	pub profile_url: String,
	pub scope: Option<String>,
	/// Profile directory for local mode, which has no profile store of its own.
	pub profiles: Vec<Profile>,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			backend: BackendConfig::default(),
			admin_emails: Vec::new(),
			profile_url: "profile.html?id={id}".to_string(),
			scope: None,
			profiles: Vec::new(),
		}
	}
}

impl AppConfig {
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Reads the page global, falling back to defaults on any problem.
	pub fn from_window() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let value = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
			.unwrap_or(JsValue::UNDEFINED);
		if value.is_undefined() || value.is_null() {
			return Self::default();
		}
		let parsed = js_sys::JSON::stringify(&value)
			.ok()
			.and_then(|s| s.as_string())
			.ok_or(ConfigError::NotSerializable)
			.and_then(|raw| Self::from_json(&raw));
		parsed.unwrap_or_else(|err| {
			warn!("{CONFIG_GLOBAL}: {err}; using local defaults");
			Self::default()
		})
	}

	pub fn scope(&self) -> Scope {
		self.scope
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|s| Scope::from(s.to_string()))
			.unwrap_or_default()
	}

	pub fn is_admin_email(&self, email: &str) -> bool {
		let email = email.trim();
		self.admin_emails
			.iter()
			.any(|admin| admin.trim().eq_ignore_ascii_case(email))
	}

	pub fn profile_link(&self, id: &ProfileId) -> String {
		self.profile_url.replace("{id}", id.as_str())
	}
}
