use std::collections::HashMap;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::family_graph::{
	FamilyGraphCanvas, GraphData, GraphHandle, LayoutPhase, build_graph, link_for, node_for,
};
use crate::config::AppConfig;
use crate::model::{Position, Profile, ProfileId, RelationKind};
use crate::session::Session;
use crate::store;
use crate::tree::{
	TreeContext, add_member, add_relationship, candidate_profiles, load_tree, record_member,
	refresh_status, save_layout,
};

const DEFAULT_DEPTH: usize = 3;
const ADDED: &str = "Kua tāpirihia / Added.";

/// The shared whakapapa page: tree canvas, filters and editor forms.
#[component]
pub fn Whakapapa() -> impl IntoView {
	let config = AppConfig::from_window();
	let session = Session::restore(&config);
	let store = StoredValue::new_local(store::connect(&config, &session));
	let config = StoredValue::new(config);
	let handle = StoredValue::new_local(GraphHandle::default());

	let tree_ctx = RwSignal::new(None::<TreeContext>);
	let profiles = RwSignal::new(HashMap::<ProfileId, Profile>::new());
	let members = RwSignal::new(Vec::<ProfileId>::new());
	let graph = RwSignal::new(GraphData::default());
	let initial = RwSignal::new(None::<(GraphData, HashMap<ProfileId, Position>)>);
	let phase = RwSignal::new(LayoutPhase::Loading);
	let dirty = RwSignal::new(false);
	let busy = RwSignal::new(true);
	let status = RwSignal::new(Vec::<String>::new());

	let root = RwSignal::new(None::<ProfileId>);
	let only_connected = RwSignal::new(false);
	let depth = RwSignal::new(DEFAULT_DEPTH);

	spawn_local(async move {
		let store = store.get_value();
		let config = config.get_value();
		let ctx = TreeContext::resolve(&config, store.as_ref(), &session).await;
		let tree = load_tree(store.as_ref(), &ctx.scope).await;
		let data = build_graph(&tree.profiles, &tree.member_ids, &tree.relationships);

		let own = ctx.actor.id.as_deref().map(ProfileId::new);
		root.set(
			own.filter(|id| data.contains(id))
				.or_else(|| data.nodes.first().map(|n| n.id.clone())),
		);
		status.set(tree.status.clone());
		profiles.set(tree.profiles);
		members.set(tree.member_ids);
		graph.set(data.clone());
		tree_ctx.set(Some(ctx));
		initial.set(Some((data, tree.positions)));
		busy.set(false);
	});

	// Neighbourhood filter; re-applied once the canvas reports its first phase.
	Effect::new(move |_| {
		let _ = phase.get();
		let visible = match (only_connected.get(), root.get()) {
			(true, Some(r)) => Some(graph.with(|g| g.neighbors_within(&r, depth.get()))),
			_ => None,
		};
		handle.with_value(|h| {
			h.set_visible(visible);
			if let Some(r) = root.get_untracked() {
				h.focus(&r);
			}
		});
	});

	let shown = Memo::new(move |_| match (only_connected.get(), root.get()) {
		(true, Some(r)) => graph.with(|g| g.filtered(&r, depth.get()).nodes.len()),
		_ => graph.with(|g| g.nodes.len()),
	});

	let editable = move || tree_ctx.with(|c| c.as_ref().is_some_and(|c| c.authorized));

	let on_node_click = Callback::new(move |id: ProfileId| {
		let url = config.with_value(|c| c.profile_link(&id));
		if let Some(window) = web_sys::window() {
			let _ = window.location().set_href(&url);
		}
	});

	// Add member
	let member_choice = RwSignal::new(String::new());
	let member_msg = RwSignal::new(String::new());
	let adding = RwSignal::new(false);
	let candidates = Memo::new(move |_| candidate_profiles(&profiles.get(), &members.get()));

	let on_add_member = move |ev: SubmitEvent| {
		ev.prevent_default();
		if adding.get_untracked() {
			return;
		}
		member_msg.set(String::new());
		let Some(ctx) = tree_ctx.get_untracked() else {
			return;
		};
		let (chosen, current, store) = (
			member_choice.get_untracked(),
			members.get_untracked(),
			store.get_value(),
		);
		adding.set(true);
		spawn_local(async move {
			match add_member(store.as_ref(), &ctx, &current, &chosen).await {
				Ok(id) => {
					let mut fresh = false;
					members.update(|m| fresh = record_member(m, &id));
					if fresh {
						if let Some(profile) = profiles.with_untracked(|p| p.get(&id).cloned()) {
							let node = node_for(&profile);
							handle.with_value(|h| h.add_node(&node));
							graph.update(|g| {
								if !g.contains(&node.id) {
									g.nodes.push(node);
								}
							});
						}
						members.with_untracked(|m| status.update(|s| refresh_status(s, m)));
					}
					if root.get_untracked().is_none() {
						root.set(Some(id));
					}
					member_choice.set(String::new());
					member_msg.set(ADDED.to_string());
				}
				Err(err) => member_msg.set(err.to_string()),
			}
			adding.set(false);
		});
	};

	// Add relationship
	let rel_from = RwSignal::new(String::new());
	let rel_to = RwSignal::new(String::new());
	let rel_kind = RwSignal::new(RelationKind::Parent.to_string());
	let rel_msg = RwSignal::new(String::new());
	let member_options = Memo::new(move |_| {
		profiles.with(|dir| {
			members
				.get()
				.into_iter()
				.filter_map(|id| dir.get(&id).map(|p| (id.to_string(), p.label().to_string())))
				.collect::<Vec<_>>()
		})
	});

	let on_add_relationship = move |ev: SubmitEvent| {
		ev.prevent_default();
		rel_msg.set(String::new());
		let Some(ctx) = tree_ctx.get_untracked() else {
			return;
		};
		let (from, to, kind) = (
			rel_from.get_untracked(),
			rel_to.get_untracked(),
			rel_kind.get_untracked(),
		);
		let (current, store) = (members.get_untracked(), store.get_value());
		spawn_local(async move {
			match add_relationship(store.as_ref(), &ctx, &current, &from, &to, &kind).await {
				Ok(rel) => {
					let link = link_for(&rel);
					// the canvas refuses links to members it does not draw
					if handle.with_value(|h| h.add_link(&link)) {
						graph.update(|g| {
							if !g.links.contains(&link) {
								g.links.push(link);
							}
						});
					}
					rel_msg.set(ADDED.to_string());
				}
				Err(err) => rel_msg.set(err.to_string()),
			}
		});
	};

	// Save layout
	let layout_msg = RwSignal::new(String::new());
	let saving = RwSignal::new(false);
	let on_save = move |_| {
		let Some(ctx) = tree_ctx.get_untracked() else {
			return;
		};
		let positions = handle.with_value(|h| h.positions());
		let store = store.get_value();
		saving.set(true);
		layout_msg.set("Tiaki ana… / Saving…".to_string());
		spawn_local(async move {
			match save_layout(store.as_ref(), &ctx, positions).await {
				Ok(report) => {
					if report.is_complete() {
						handle.with_value(|h| h.mark_saved());
					}
					layout_msg.set(report.summary());
				}
				Err(err) => layout_msg.set(err.to_string()),
			}
			saving.set(false);
		});
	};

	let member_option_views = move || {
		member_options
			.get()
			.into_iter()
			.map(|(id, label)| view! { <option value=id>{label}</option> })
			.collect_view()
	};

	view! {
		<section class="whakapapa">
			<header class="whakapapa-header">
				<h1>"Whakapapa"</h1>
				<p class="status" role="status">{move || status.with(|s| s.join(" "))}</p>
				<p class="phase">
					{move || match phase.get() {
						LayoutPhase::Loading => "Uta ana… / Loading…",
						LayoutPhase::AutoLayout { .. } => "Whakaraupapa ana… / Arranging…",
						LayoutPhase::Frozen if editable() => "Tōia ngā tāngata hei whakarite / Drag people to arrange, then save.",
						LayoutPhase::Frozen => "",
					}}
				</p>
			</header>

			<div class="whakapapa-controls">
				<label>
					"Pūtake / Root "
					<select
						prop:value=move || root.get().map(|r| r.to_string()).unwrap_or_default()
						on:change=move |ev| {
							let value = event_target_value(&ev);
							root.set((!value.is_empty()).then(|| ProfileId::new(value)));
						}
					>
						{member_option_views}
					</select>
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || only_connected.get()
						on:change=move |ev| only_connected.set(event_target_checked(&ev))
					/>
					" Ngā hono anake / Only connected"
				</label>
				<label>
					"Hōhonu / Depth "
					<input
						type="range"
						min="1"
						max="6"
						prop:value=move || depth.get().to_string()
						on:input=move |ev| {
							depth.set(event_target_value(&ev).parse().unwrap_or(DEFAULT_DEPTH))
						}
					/>
					<span>{move || depth.get()}</span>
				</label>
				<button
					type="button"
					on:click=move |_| {
						if let Some(r) = root.get_untracked() {
							handle.with_value(|h| h.focus(&r));
						}
					}
				>
					"Whakahāngai / Centre"
				</button>
				<button type="button" on:click=move |_| handle.with_value(|h| h.fit())>
					"Whakaurua / Fit"
				</button>
				<span class="shown">
					{move || format!("{} / {}", shown.get(), graph.with(|g| g.nodes.len()))}
				</span>
			</div>

			<div
				class="whakapapa-tree"
				aria-busy=move || if busy.get() { "true" } else { "false" }
			>
				{move || {
					initial
						.get()
						.map(|(data, positions)| {
							view! {
								<FamilyGraphCanvas
									data=data
									positions=positions
									editable=tree_ctx
										.with_untracked(|c| c.as_ref().is_some_and(|c| c.authorized))
									handle=handle.get_value()
									phase=phase
									dirty=dirty
									on_node_click=on_node_click
								/>
							}
						})
				}}
			</div>

			<Show when=editable>
				<div class="whakapapa-editor">
					<form class="person-form" on:submit=on_add_member>
						<h2>"Tāpiri tangata / Add person"</h2>
						<select
							prop:value=move || member_choice.get()
							prop:disabled=move || candidates.with(|c| c.is_empty())
							on:change=move |ev| member_choice.set(event_target_value(&ev))
						>
							<option value="">
								{move || {
									if candidates.with(|c| c.is_empty()) {
										"Kua tāpirihia katoa / All profiles already added"
									} else {
										"Kōwhiria tētahi kōtaha / Select a profile"
									}
								}}
							</option>
							{move || {
								candidates
									.get()
									.into_iter()
									.map(|p| {
										view! {
											<option value=p.id.to_string()>{p.label().to_string()}</option>
										}
									})
									.collect_view()
							}}
						</select>
						<button
							type="submit"
							prop:disabled=move || adding.get() || candidates.with(|c| c.is_empty())
						>
							"Tāpiri / Add"
						</button>
						<p class="msg">{move || member_msg.get()}</p>
					</form>

					<form class="rel-form" on:submit=on_add_relationship>
						<h2>"Tāpiri hononga / Add relationship"</h2>
						<select
							prop:value=move || rel_from.get()
							on:change=move |ev| rel_from.set(event_target_value(&ev))
						>
							<option value="">"—"</option>
							{member_option_views}
						</select>
						<select
							prop:value=move || rel_kind.get()
							on:change=move |ev| rel_kind.set(event_target_value(&ev))
						>
							{RelationKind::CHOICES
								.iter()
								.map(|k| view! { <option value=k.to_string()>{k.to_string()}</option> })
								.collect_view()}
						</select>
						<select
							prop:value=move || rel_to.get()
							on:change=move |ev| rel_to.set(event_target_value(&ev))
						>
							<option value="">"—"</option>
							{member_option_views}
						</select>
						<button type="submit">"Tāpiri / Add"</button>
						<p class="msg">{move || rel_msg.get()}</p>
					</form>

					<div class="layout-save">
						<button
							type="button"
							on:click=on_save
							prop:disabled=move || phase.get() != LayoutPhase::Frozen || saving.get()
						>
							{move || {
								if dirty.get() {
									"Tiaki whakatakotoranga* / Save layout*"
								} else {
									"Tiaki whakatakotoranga / Save layout"
								}
							}}
						</button>
						<p class="msg">{move || layout_msg.get()}</p>
					</div>
				</div>
			</Show>
		</section>
	}
}
