use leptos::prelude::*;
use society_explorer::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App);
}
