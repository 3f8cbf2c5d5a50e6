use leptos::prelude::*;
use leptos_router::components::A;

use crate::components::neural_graph::{DocumentSummary, NeuralGraph};
use crate::components::particle_network::ParticleNetwork;

const TAGS: &[&str] = &["research", "design", "ops", "legal", "notes"];

/// Generate a sample archive (deterministic, so reloads look the same).
fn sample_documents(n: usize) -> Vec<DocumentSummary> {
	(0..n)
		.map(|i| DocumentSummary {
			id: i as i64 + 1,
			title: Some(format!("Document {}", i + 1)),
			tags: Some(TAGS[(rand_simple(i) * TAGS.len() as f64) as usize].to_string()),
			owner_id: Some((rand_simple(i + n) * 4.0) as i64),
			created_at: Some(format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
		})
		.collect()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Dashboard: document graph and particle field behind the archive listing.
#[component]
pub fn Home() -> impl IntoView {
	// The archive starts empty; the graph shows its seed constellation until
	// documents arrive.
	let (documents, set_documents) = signal(Vec::<DocumentSummary>::new());
	let toggle = move |_| {
		set_documents.update(|docs| {
			*docs = if docs.is_empty() { sample_documents(24) } else { Vec::new() };
		});
	};

	view! {
		<div class="dashboard">
			<div class="dashboard-background">
				<NeuralGraph documents=documents />
			</div>
			<ParticleNetwork />

			<div class="dashboard-content">
				<header>
					<h1>"Neural Archives"</h1>
					<p class="subtitle">"Click a node to open its document."</p>
					<button on:click=toggle>
						{move || {
							if documents.read().is_empty() {
								"Load sample archive"
							} else {
								"Clear archive"
							}
						}}
					</button>
				</header>

				<ul class="document-list">
					<For
						each=move || documents.get()
						key=|doc| doc.id
						children=move |doc| {
							let tag = doc
								.tags
								.as_deref()
								.and_then(|tags| tags.split(',').next())
								.unwrap_or_default()
								.to_string();
							view! {
								<li>
									<A href=format!("/note/{}", doc.id)>
										{doc.title.clone().unwrap_or_default()}
									</A>
									<span class="tag">{tag}</span>
									<span class="date">
										{doc.created_at.clone().unwrap_or_default()}
									</span>
								</li>
							}
						}
					/>
				</ul>
			</div>
		</div>
	}
}
