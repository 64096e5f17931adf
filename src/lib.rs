//! Shared whakapapa (family tree) builder: a Leptos client-side app that
//! draws a scope's members on a force-directed canvas and lets authorized
//! editors grow and arrange it.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
pub mod config;
pub mod error;
pub mod model;
mod pages;
pub mod session;
pub mod store;
pub mod tree;

// Top-Level pages
use crate::pages::not_found::NotFound;
use crate::pages::whakapapa::Whakapapa;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the tree page and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="mi" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Whakapapa" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Whakapapa />
				<Route path=path!("/whakapapa") view=Whakapapa />
			</Routes>
		</Router>
	}
}
