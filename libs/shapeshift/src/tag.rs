//! Field tag parsing.
//!
//! A tag is a comma-separated list attached to a destination field:
//!
//! ```text
//! [renameOrSkip][,validator[=param] | ,callback:name]*
//! ```
//!
//! - first token empty → source field has the destination field's name
//! - first token `-` → field is skipped
//! - first token anything else → source field name, normalized to snake_case
//! - `callback:<name>` → transform applied before conversion
//! - `name` / `name=param` → validator

use crate::callback::{Callback, CallbackRegistry};
use crate::config::Config;
use crate::error::MapError;
use crate::validator::{BoundValidator, ValidatorRegistry};

pub const SKIP_TOKEN: &str = "-";
pub const CALLBACK_PREFIX: &str = "callback:";

/// Syntactic content of a tag, before any name is looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSpec {
    pub rename: Option<String>,
    pub skip: bool,
    /// Callback names in tag order.
    pub callbacks: Vec<String>,
    /// `(name, raw parameter)` in tag order. Parameter is empty when absent.
    pub validators: Vec<(String, String)>,
}

impl TagSpec {
    pub fn parse(raw: &str) -> Self {
        let mut spec = TagSpec::default();
        let mut tokens = raw.split(',').map(str::trim);

        match tokens.next() {
            Some(SKIP_TOKEN) => spec.skip = true,
            Some("") | None => {}
            Some(name) => spec.rename = Some(to_snake_case(name)),
        }

        for token in tokens {
            if token.is_empty() {
                continue;
            }
            if let Some(name) = token.strip_prefix(CALLBACK_PREFIX) {
                spec.callbacks.push(name.to_string());
                continue;
            }
            let (name, param) = token.split_once('=').unwrap_or((token, ""));
            spec.validators.push((name.to_string(), param.to_string()));
        }

        spec
    }
}

/// Resolved per-field configuration: every name looked up, ready to run.
#[derive(Clone, Default)]
pub struct FieldPlan {
    pub rename: Option<String>,
    pub skip: bool,
    pub callback: Option<Callback>,
    pub validators: Vec<BoundValidator>,
}

impl std::fmt::Debug for FieldPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldPlan")
            .field("rename", &self.rename)
            .field("skip", &self.skip)
            .field("callback", &self.callback.as_ref().map(|c| c.name.as_str()))
            .field(
                "validators",
                &self
                    .validators
                    .iter()
                    .map(|v| (v.name.as_str(), v.param.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FieldPlan {
    /// Parse and resolve a raw tag in one step.
    pub fn from_tag(
        raw: &str,
        validators: &ValidatorRegistry,
        callbacks: &CallbackRegistry,
        config: &Config,
    ) -> Result<Self, MapError> {
        Self::resolve(TagSpec::parse(raw), validators, callbacks, config)
    }

    /// Look up every validator and callback named in `spec`.
    ///
    /// Unknown names fail the call unless the matching `ignore_missing_*`
    /// toggle is on, in which case they are dropped. When a tag names
    /// several callbacks the last one wins.
    pub fn resolve(
        spec: TagSpec,
        validators: &ValidatorRegistry,
        callbacks: &CallbackRegistry,
        config: &Config,
    ) -> Result<Self, MapError> {
        let mut plan = FieldPlan {
            rename: spec.rename,
            skip: spec.skip,
            ..FieldPlan::default()
        };
        if plan.skip {
            return Ok(plan);
        }

        for name in spec.callbacks {
            match callbacks.get(&name) {
                Some(cb) => plan.callback = Some(cb.clone()),
                None if config.ignore_missing_callbacks => {
                    tracing::warn!(callback = %name, "callback not registered, ignoring");
                }
                None => return Err(MapError::UnknownCallback(name)),
            }
        }

        for (name, param) in spec.validators {
            match validators.resolve(&name, config.override_default_validators) {
                Some(func) => plan.validators.push(BoundValidator { name, param, func }),
                None if config.ignore_missing_validators => {
                    tracing::warn!(validator = %name, "validator not registered, ignoring");
                }
                None => return Err(MapError::UnknownValidator(name)),
            }
        }

        Ok(plan)
    }
}

/// Normalize a field name to Rust's field naming convention.
///
/// `Username` → `username`, `PhoneNumber` → `phone_number`,
/// `userName` → `user_name`, `HTTPServer` → `http_server`.
/// Already snake_case names pass through unchanged.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}
