//! Records shared by the store, the loader and the graph view.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used when a profile has no usable name.
pub const UNNAMED: &str = "—";

/// Opaque id of a profile in the external profile store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

impl ProfileId {
	/// Wraps a raw id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ProfileId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ProfileId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

/// Partition key for members, relationships and positions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
	/// Name of the shared scope.
	pub const SHARED: &'static str = "shared";

	/// The single admin-curated tree everyone sees.
	pub fn shared() -> Self {
		Self(Self::SHARED.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Default for Scope {
	fn default() -> Self {
		Self::shared()
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<String> for Scope {
	fn from(scope: String) -> Self {
		Self(scope)
	}
}

/// A person from the profile directory. Read-only here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	pub id: ProfileId,
	/// `full_name` in the profile store.
	#[serde(rename = "full_name", alias = "name", default)]
	pub display_name: Option<String>,
	#[serde(
		default,
		alias = "photo_url",
		alias = "image_url",
		alias = "avatar"
	)]
	pub avatar_url: Option<String>,
	/// Shown when the profile has no name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

impl Profile {
	/// A profile with no avatar or email.
	pub fn new(id: impl Into<String>, display_name: Option<&str>) -> Self {
		Self {
			id: ProfileId::new(id),
			display_name: display_name.map(str::to_string),
			avatar_url: None,
			email: None,
		}
	}

	pub fn with_avatar(mut self, url: &str) -> Self {
		self.avatar_url = Some(url.to_string());
		self
	}

	pub fn with_email(mut self, email: &str) -> Self {
		self.email = Some(email.to_string());
		self
	}

	/// Display name, then email, then [`UNNAMED`]. Blank values are skipped.
	pub fn label(&self) -> &str {
		[self.display_name.as_deref(), self.email.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.find(|name| !name.is_empty())
			.unwrap_or(UNNAMED)
	}

	/// Avatar URL, if one is set and not blank.
	pub fn avatar(&self) -> Option<&str> {
		self.avatar_url
			.as_deref()
			.map(str::trim)
			.filter(|url| !url.is_empty())
	}
}

/// A profile's presence in one scope's tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
	pub scope: Scope,
	pub profile_id: ProfileId,
}

/// Kind of a family link.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
	Parent,
	Mother,
	Father,
	Spouse,
	Partner,
	Other(String),
}

impl RelationKind {
	/// Kinds offered by the add-relationship form.
	pub const CHOICES: [RelationKind; 5] = [
		RelationKind::Parent,
		RelationKind::Mother,
		RelationKind::Father,
		RelationKind::Spouse,
		RelationKind::Partner,
	];

	/// Case-insensitive parse; unknown strings are kept as [`RelationKind::Other`].
	pub fn parse(raw: &str) -> Self {
		let trimmed = raw.trim();
		match trimmed.to_ascii_lowercase().as_str() {
			"parent" => Self::Parent,
			"mother" => Self::Mother,
			"father" => Self::Father,
			"spouse" => Self::Spouse,
			"partner" => Self::Partner,
			_ => Self::Other(trimmed.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			Self::Parent => "parent",
			Self::Mother => "mother",
			Self::Father => "father",
			Self::Spouse => "spouse",
			Self::Partner => "partner",
			Self::Other(raw) => raw,
		}
	}

	pub fn is_parental(&self) -> bool {
		matches!(self, Self::Parent | Self::Mother | Self::Father)
	}

	pub fn is_spousal(&self) -> bool {
		matches!(self, Self::Spouse | Self::Partner)
	}
}

impl fmt::Display for RelationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Serialize for RelationKind {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de> Deserialize<'de> for RelationKind {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Self::parse(&raw))
	}
}

/// Directed, typed link between two members.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
	pub from_id: ProfileId,
	pub to_id: ProfileId,
	#[serde(rename = "type")]
	pub kind: RelationKind,
}

impl Relationship {
	pub fn new(from: &str, to: &str, kind: RelationKind) -> Self {
		Self {
			from_id: ProfileId::new(from),
			to_id: ProfileId::new(to),
			kind,
		}
	}
}

/// Saved canvas coordinates of one member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub profile_id: ProfileId,
	pub x: f64,
	pub y: f64,
	pub updated_at: DateTime<Utc>,
}

impl Position {
	/// A position stamped with the current time.
	pub fn now(profile_id: ProfileId, x: f64, y: f64) -> Self {
		Self {
			profile_id,
			x,
			y,
			updated_at: Utc::now(),
		}
	}
}

/// The person acting on the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Actor {
	/// Auth user id; `None` when nobody is signed in.
	pub id: Option<String>,
	pub email: Option<String>,
}

impl Actor {
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn is_signed_in(&self) -> bool {
		self.id.is_some()
	}
}
