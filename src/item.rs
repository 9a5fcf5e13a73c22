//! Tracked items: issues and pull requests as seen by the close workflow.

use color_eyre::eyre::{Result, bail};
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// Opaque remote node id (the GraphQL `id` of an issue or pull request).
#[derive(Clone, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
	#[display("issue")]
	Issue,
	#[display("pull request")]
	PullRequest,
}

impl ItemKind {
	/// Map a GraphQL `__typename` onto a kind.
	pub fn from_typename(typename: &str) -> Result<Self> {
		match typename {
			"Issue" => Ok(Self::Issue),
			"PullRequest" => Ok(Self::PullRequest),
			other => bail!("unexpected item type: {other}"),
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
	#[display("open")]
	Open,
	#[display("closed")]
	Closed,
}

impl ItemState {
	/// Parse the upper-case state enums GraphQL returns for issues (`OPEN`, `CLOSED`)
	/// and pull requests (`OPEN`, `CLOSED`, `MERGED`).
	///
	/// A merged pull request can no longer be closed, so it counts as closed.
	pub fn from_graphql(s: &str) -> Result<Self> {
		match s {
			"OPEN" => Ok(Self::Open),
			"CLOSED" | "MERGED" => Ok(Self::Closed),
			other => bail!("unexpected item state: {other}"),
		}
	}

	pub fn is_closed(&self) -> bool {
		matches!(self, Self::Closed)
	}
}

/// Which item fields a resolution asks the remote service for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ItemField {
	Id,
	Number,
	Title,
	State,
}

impl ItemField {
	/// Name of the field in the GraphQL schema.
	pub fn graphql_name(&self) -> &'static str {
		match self {
			ItemField::Id => "id",
			ItemField::Number => "number",
			ItemField::Title => "title",
			ItemField::State => "state",
		}
	}
}

/// An issue or pull request, as observed at resolution time.
///
/// `state` is only as fresh as the lookup that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrackedItem {
	pub id: ItemId,
	pub number: u64,
	pub title: String,
	pub kind: ItemKind,
	pub state: ItemState,
}
