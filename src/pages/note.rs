use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;

/// Landing page for graph clicks. Loading the document itself belongs to the
/// document service client.
#[component]
pub fn Note() -> impl IntoView {
	let params = use_params_map();
	let document_id = move || params.read().get("id").and_then(|id| id.parse::<i64>().ok());

	view! {
		<div class="page note">
			{move || match document_id() {
				Some(id) => view! { <h1>"Document #" {id}</h1> }.into_any(),
				None => view! { <h1>"Unknown document"</h1> }.into_any(),
			}}
			<A href="/">"Back to the archive"</A>
		</div>
	}
}
