use std::fmt;

use serde::Deserialize;

/// A document as listed by the document service.
///
/// Only `id` is required; entries missing the other fields still produce a
/// node (empty label, default colour bucket).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DocumentSummary {
	pub id: i64,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub tags: Option<String>,
	#[serde(default, alias = "ownerId")]
	pub owner_id: Option<i64>,
	#[serde(default, alias = "createdAt")]
	pub created_at: Option<String>,
}

/// Identity of a graph node.
///
/// Placeholder nodes live in their own variant, so they can never be
/// confused with a document id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeId {
	Document(i64),
	Seed(u32),
}

impl NodeId {
	/// Where clicking this node should go. Seeds go nowhere.
	pub fn navigation_intent(self) -> Option<NavigationIntent> {
		match self {
			NodeId::Document(document_id) => Some(NavigationIntent { document_id }),
			NodeId::Seed(_) => None,
		}
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Document(id) => write!(f, "{id}"),
			NodeId::Seed(i) => write!(f, "seed-{i}"),
		}
	}
}

/// Request to open a document's page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationIntent {
	pub document_id: i64,
}

impl NavigationIntent {
	pub fn path(&self) -> String {
		format!("/note/{}", self.document_id)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: NodeId,
	pub label: String,
	/// Colour bucket, taken modulo the palette length.
	pub group: i64,
	pub size: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphLink {
	pub source: NodeId,
	pub target: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
