//! Caller identity.

use serde::{Deserialize, Serialize};

use crate::abac::AttrSet;
use crate::types::{UserId, ViewMode};

pub const ROLE_ADMIN: &str = "admin";

/// Authenticated caller, produced by the bearer-token middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCtx {
	pub user_id: UserId,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn new(user_id: UserId, roles: &[&str]) -> Self {
		Self { user_id, roles: roles.iter().map(|r| Box::from(*r)).collect() }
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.contains("roles", role)
	}

	/// Admins pass every capability check
	pub fn is_admin(&self) -> bool {
		self.has_role(ROLE_ADMIN)
	}

	pub fn has_any_role(&self, roles: &[&str]) -> bool {
		self.is_admin() || roles.iter().any(|r| self.has_role(r))
	}
}

/// Who is asking and in which view mode
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	pub caller: Option<AuthCtx>,
	pub view_mode: ViewMode,
}

impl RequestContext {
	pub fn new(caller: Option<AuthCtx>, view_mode: ViewMode) -> Self {
		Self { caller, view_mode }
	}

	pub fn caller(&self) -> Option<&AuthCtx> {
		self.caller.as_ref()
	}

	pub fn is_edit(&self) -> bool {
		self.view_mode == ViewMode::Edit
	}
}

impl AttrSet for AuthCtx {
	fn get(&self, _key: &str) -> Option<&str> {
		None
	}

	fn get_list(&self, key: &str) -> Option<Vec<&str>> {
		match key {
			"roles" => Some(self.roles.iter().map(AsRef::as_ref).collect()),
			_ => None,
		}
	}
}


// vim: ts=4
