use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<section class="not-found">
			<h1>"Kāore i kitea / Page not found"</h1>
			<a href="/">"Hoki ki te whakapapa / Back to the tree"</a>
		</section>
	}
}
