use leptos::prelude::*;
use whakapapa::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
