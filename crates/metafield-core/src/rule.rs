//! Authorization rules attached to meta key definitions.
//!
//! A rule is consulted after the parent capability checks and decides the
//! outcome for one (caller, parent, key, action) combination.

use std::fmt::Debug;
use std::sync::Arc;

use metafield_types::abac::AttrSet;

use crate::prelude::*;
use crate::registry::MetaKeyDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Read,
	Write,
	Delete,
}

/// Everything a rule may inspect
pub struct RuleContext<'a> {
	pub caller: Option<&'a AuthCtx>,
	pub parent: &'a ParentEntity,
	pub def: &'a MetaKeyDefinition,
	pub action: Action,
}

pub trait AuthorizationRule: Debug + Send + Sync {
	fn evaluate(&self, ctx: &RuleContext<'_>) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct AllowAll;

impl AuthorizationRule for AllowAll {
	fn evaluate(&self, _ctx: &RuleContext<'_>) -> bool {
		true
	}
}

#[derive(Debug, Clone, Copy)]
pub struct DenyAll;

impl AuthorizationRule for DenyAll {
	fn evaluate(&self, _ctx: &RuleContext<'_>) -> bool {
		false
	}
}

/// Caller must hold the role (admins always pass)
#[derive(Debug, Clone)]
pub struct RequireRole(pub Box<str>);

impl AuthorizationRule for RequireRole {
	fn evaluate(&self, ctx: &RuleContext<'_>) -> bool {
		ctx.caller.is_some_and(|auth| auth.is_admin() || auth.contains("roles", &self.0))
	}
}

/// Caller must own the parent entity
#[derive(Debug, Clone, Copy)]
pub struct OwnerOnly;

impl AuthorizationRule for OwnerOnly {
	fn evaluate(&self, ctx: &RuleContext<'_>) -> bool {
		ctx.parent.is_owned_by(ctx.caller)
	}
}

#[derive(Debug, Clone)]
pub struct AnyOf(pub Vec<Arc<dyn AuthorizationRule>>);

impl AuthorizationRule for AnyOf {
	fn evaluate(&self, ctx: &RuleContext<'_>) -> bool {
		self.0.iter().any(|rule| rule.evaluate(ctx))
	}
}

/// Parse a rule expression: `allow`, `deny`, `owner`, `role:<name>`, or a
/// comma separated list of these (any of them passing is enough).
pub fn parse_rule(expr: &str) -> MfResult<Arc<dyn AuthorizationRule>> {
	let mut rules: Vec<Arc<dyn AuthorizationRule>> = Vec::new();
	for part in expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
		let rule: Arc<dyn AuthorizationRule> = match part {
			"allow" => Arc::new(AllowAll),
			"deny" => Arc::new(DenyAll),
			"owner" => Arc::new(OwnerOnly),
			_ => match part.strip_prefix("role:") {
				Some(role) if !role.is_empty() => Arc::new(RequireRole(role.into())),
				_ => {
					return Err(Error::ConfigError(format!("invalid authorization rule: {}", part)));
				}
			},
		};
		rules.push(rule);
	}

	match rules.len() {
		0 => Err(Error::ConfigError("empty authorization rule".into())),
		1 => Ok(rules.remove(0)),
		_ => Ok(Arc::new(AnyOf(rules))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parent(owner: u64) -> ParentEntity {
		ParentEntity {
			entity_type: EntityType::Post,
			entity_id: EntityId(10),
			owner: Some(UserId(owner)),
			status: "publish".into(),
		}
	}

	fn eval(rule: &dyn AuthorizationRule, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		let def = MetaKeyDefinition::builder("color").build().unwrap();
		rule.evaluate(&RuleContext { caller, parent, def: &def, action: Action::Read })
	}

	#[test]
	fn test_role_rule() {
		let rule = RequireRole("editor".into());
		let editor = AuthCtx::new(UserId(2), &["editor"]);
		let author = AuthCtx::new(UserId(3), &["author"]);
		let admin = AuthCtx::new(UserId(1), &["admin"]);
		let p = parent(3);
		assert!(eval(&rule, Some(&editor), &p));
		assert!(!eval(&rule, Some(&author), &p));
		assert!(eval(&rule, Some(&admin), &p));
		assert!(!eval(&rule, None, &p));
	}

	#[test]
	fn test_owner_rule() {
		let owner = AuthCtx::new(UserId(3), &[]);
		let other = AuthCtx::new(UserId(4), &[]);
		let p = parent(3);
		assert!(eval(&OwnerOnly, Some(&owner), &p));
		assert!(!eval(&OwnerOnly, Some(&other), &p));
		assert!(!eval(&OwnerOnly, None, &p));
	}

	#[test]
	fn test_parse_rule() {
		let p = parent(3);
		let owner = AuthCtx::new(UserId(3), &[]);
		let editor = AuthCtx::new(UserId(5), &["editor"]);
		let nobody = AuthCtx::new(UserId(6), &[]);

		let rule = parse_rule("owner, role:editor").unwrap();
		assert!(eval(rule.as_ref(), Some(&owner), &p));
		assert!(eval(rule.as_ref(), Some(&editor), &p));
		assert!(!eval(rule.as_ref(), Some(&nobody), &p));

		assert!(!eval(parse_rule("deny").unwrap().as_ref(), Some(&owner), &p));
		assert!(eval(parse_rule("allow").unwrap().as_ref(), None, &p));
		assert!(parse_rule("").is_err());
		assert!(parse_rule("role:").is_err());
		assert!(parse_rule("sometimes").is_err());
	}
}

// vim: ts=4
