use std::collections::HashMap;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{BackendKind, WhakapapaStore};
use crate::error::{StoreError, StoreResult};
use crate::model::{Actor, Membership, Position, Profile, ProfileId, Relationship, Scope};

const PEOPLE_TABLE: &str = "whakapapa_people";
const RELATIONS_TABLE: &str = "whakapapa_relations";
const POSITIONS_TABLE: &str = "whakapapa_positions";
const PROFILES_TABLE: &str = "profiles";
const ADMINS_TABLE: &str = "admin_users";

#[derive(Deserialize)]
struct MemberRow {
	profile_id: Option<ProfileId>,
}

#[derive(Serialize)]
struct ScopedRelation<'a> {
	scope: &'a Scope,
	#[serde(flatten)]
	rel: &'a Relationship,
}

#[derive(Serialize)]
struct ScopedPosition<'a> {
	scope: &'a Scope,
	#[serde(flatten)]
	position: &'a Position,
}

/// Store backed by a PostgREST endpoint (`<url>/rest/v1/<table>`).
pub struct HostedStore {
	client: Client,
	rest_url: String,
	anon_key: String,
	access_token: Option<String>,
}

impl HostedStore {
	pub fn new(url: &str, anon_key: &str, access_token: Option<String>) -> Self {
		Self {
			client: Client::new(),
			rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
			anon_key: anon_key.to_string(),
			access_token,
		}
	}

	fn table_url(&self, table: &str) -> String {
		format!("{}/{table}", self.rest_url)
	}

	fn authed(&self, req: RequestBuilder) -> RequestBuilder {
		let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
		req.header("apikey", &self.anon_key).bearer_auth(bearer)
	}

	async fn select<T: DeserializeOwned>(
		&self,
		table: &str,
		columns: &str,
		filters: &[(&str, String)],
	) -> StoreResult<Vec<T>> {
		debug!("select {columns} from {table}");
		let req = self
			.client
			.get(self.table_url(table))
			.query(&[("select", columns)])
			.query(filters);
		let resp = checked(self.authed(req).send().await?).await?;
		Ok(resp.json().await?)
	}

	async fn insert<T: Serialize + ?Sized>(
		&self,
		table: &str,
		rows: &T,
		on_conflict: Option<(&str, &str)>,
	) -> StoreResult<()> {
		debug!("insert into {table}");
		let mut req = self.client.post(self.table_url(table)).json(rows);
		let mut prefer = String::from("return=minimal");
		if let Some((columns, resolution)) = on_conflict {
			req = req.query(&[("on_conflict", columns)]);
			prefer.push_str(",resolution=");
			prefer.push_str(resolution);
		}
		checked(self.authed(req.header("Prefer", prefer)).send().await?).await?;
		Ok(())
	}
}

/// Maps non-2xx responses to [`StoreError::Status`].
async fn checked(resp: Response) -> StoreResult<Response> {
	let status = resp.status();
	if status.is_success() {
		return Ok(resp);
	}
	let message = resp.text().await.unwrap_or_default();
	Err(StoreError::Status {
		status: status.as_u16(),
		message,
	})
}

fn eq(value: &str) -> String {
	format!("eq.{value}")
}

#[async_trait(?Send)]
impl WhakapapaStore for HostedStore {
	fn kind(&self) -> BackendKind {
		BackendKind::Hosted
	}

	async fn list_members(&self, scope: &Scope) -> StoreResult<Vec<ProfileId>> {
		let rows: Vec<MemberRow> = self
			.select(PEOPLE_TABLE, "profile_id", &[("scope", eq(scope.as_str()))])
			.await?;
		Ok(rows.into_iter().filter_map(|r| r.profile_id).collect())
	}

	async fn list_relationships(&self, scope: &Scope) -> StoreResult<Vec<Relationship>> {
		self.select(
			RELATIONS_TABLE,
			"from_id,to_id,type",
			&[("scope", eq(scope.as_str()))],
		)
		.await
	}

	async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
		self.select(PROFILES_TABLE, "id,full_name,avatar_url", &[])
			.await
	}

	async fn add_member(&self, scope: &Scope, profile_id: &ProfileId) -> StoreResult<()> {
		let row = Membership {
			scope: scope.clone(),
			profile_id: profile_id.clone(),
		};
		self.insert(
			PEOPLE_TABLE,
			&[row],
			Some(("scope,profile_id", "ignore-duplicates")),
		)
		.await
	}

	async fn add_relationship(&self, scope: &Scope, rel: &Relationship) -> StoreResult<()> {
		self.insert(RELATIONS_TABLE, &[ScopedRelation { scope, rel }], None)
			.await
	}

	async fn load_positions(&self, scope: &Scope) -> StoreResult<HashMap<ProfileId, Position>> {
		let rows: Vec<Position> = self
			.select(
				POSITIONS_TABLE,
				"profile_id,x,y,updated_at",
				&[("scope", eq(scope.as_str()))],
			)
			.await?;
		Ok(rows
			.into_iter()
			.map(|p| (p.profile_id.clone(), p))
			.collect())
	}

	async fn save_position(&self, scope: &Scope, position: &Position) -> StoreResult<()> {
		self.insert(
			POSITIONS_TABLE,
			&[ScopedPosition { scope, position }],
			Some(("scope,profile_id", "merge-duplicates")),
		)
		.await
	}

	async fn is_authorized(&self, actor: &Actor) -> StoreResult<bool> {
		let Some(id) = actor.id.as_deref() else {
			return Ok(false);
		};
		let rows: Vec<serde_json::Value> = self
			.select(ADMINS_TABLE, "user_id", &[("user_id", eq(id))])
			.await?;
		Ok(!rows.is_empty())
	}
}
