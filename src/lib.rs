//! Browser explorer for simulated societies: a force-directed social graph,
//! opinion-diffusion playback, path and neighborhood queries, and
//! population metrics.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::info;

pub mod api;
pub mod config;
pub mod society;

mod components;
mod pages;

use crate::config::ExplorerConfig;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let config = ExplorerConfig::load();
	let _ = console_log::init_with_level(config.level());
	console_error_panic_hook::set_once();
	info!("logging at {}, backend {}", config.level(), config.api_base_url);
}

/// Router with the explorer at `/` and a 404 fallback.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();
	provide_context(ExplorerConfig::load());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Society Explorer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
