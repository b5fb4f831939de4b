use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::error::Fault;
use crate::schema::FieldType;
use crate::value::{FieldValue, Value};

/// Field-level predicate.
///
/// `Ok(true)` accepts, `Ok(false)` rejects the value (a validation error for
/// the caller). `Err(Fault)` means the validator cannot judge this value at
/// all: unsupported kind or unparsable parameter.
pub trait ValidatorFn: Send + Sync {
    fn validate(&self, value: &FieldValue, param: &str) -> Result<bool, Fault>;
}

impl<F> ValidatorFn for F
where
    F: Fn(&FieldValue, &str) -> Result<bool, Fault> + Send + Sync,
{
    fn validate(&self, value: &FieldValue, param: &str) -> Result<bool, Fault> {
        self(value, param)
    }
}

/// A named validator, as registered on a mapper.
#[derive(Clone)]
pub struct Validator {
    pub name: String,
    pub func: Arc<dyn ValidatorFn>,
}

impl Validator {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FieldValue, &str) -> Result<bool, Fault> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").field("name", &self.name).finish()
    }
}

/// A validator bound to the parameter written in one field's tag.
#[derive(Clone)]
pub struct BoundValidator {
    pub name: String,
    pub param: String,
    pub func: Arc<dyn ValidatorFn>,
}

impl BoundValidator {
    pub fn run(&self, value: &FieldValue) -> Result<bool, Fault> {
        self.func.validate(value, &self.param)
    }
}

// ---------------------------------------------------------------------------
// Tables and registry
// ---------------------------------------------------------------------------

/// Immutable name → validator table. The built-in set is one of these.
pub struct ValidatorTable {
    entries: HashMap<String, Arc<dyn ValidatorFn>>,
}

static BUILTIN: LazyLock<Arc<ValidatorTable>> = LazyLock::new(|| {
    Arc::new(ValidatorTable::from_validators([
        Validator::new("required", required),
        Validator::new("unique", unique),
        Validator::new("len", len),
        Validator::new("gte", gte),
        Validator::new("gt", gt),
        Validator::new("lte", lte),
        Validator::new("lt", lt),
        Validator::new("eq", eq),
        Validator::new("ne", ne),
    ]))
});

impl std::fmt::Debug for ValidatorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ValidatorTable").field(&self.names()).finish()
    }
}

impl ValidatorTable {
    /// The built-in validators: `required`, `unique`, `len`, `gte`, `gt`,
    /// `lte`, `lt`, `eq`, `ne`. Built once and shared.
    pub fn builtin() -> Arc<ValidatorTable> {
        BUILTIN.clone()
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn from_validators(validators: impl IntoIterator<Item = Validator>) -> Self {
        Self {
            entries: validators
                .into_iter()
                .map(|v| (v.name, v.func))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValidatorFn>> {
        self.entries.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Default validators plus the ones a user registered on one mapper.
#[derive(Clone)]
pub struct ValidatorRegistry {
    defaults: Arc<ValidatorTable>,
    custom: HashMap<String, Arc<dyn ValidatorFn>>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new(ValidatorTable::builtin())
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut custom: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        custom.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("defaults", &self.defaults.names())
            .field("custom", &custom)
            .finish()
    }
}

impl ValidatorRegistry {
    pub fn new(defaults: Arc<ValidatorTable>) -> Self {
        Self {
            defaults,
            custom: HashMap::new(),
        }
    }

    /// Register a user validator. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, validator: Validator) {
        self.custom.insert(validator.name, validator.func);
    }

    /// Find the validator to run for `name`.
    ///
    /// A user validator shadows a default of the same name only when
    /// `override_defaults` is set. A user validator with a fresh name is
    /// always found.
    pub fn resolve(&self, name: &str, override_defaults: bool) -> Option<Arc<dyn ValidatorFn>> {
        let default = self.defaults.get(name);
        match (default, self.custom.get(name)) {
            (Some(_), Some(custom)) if override_defaults => Some(custom.clone()),
            (Some(default), _) => Some(default.clone()),
            (None, Some(custom)) => Some(custom.clone()),
            (None, None) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in predicates
// ---------------------------------------------------------------------------

fn required(v: &FieldValue, _param: &str) -> Result<bool, Fault> {
    match v.ty {
        // `Some(0)` is present, only `None` counts as missing
        FieldType::Optional(_) => Ok(v.value != Value::Null),
        _ => Ok(!v.value.is_zero()),
    }
}

fn unique(v: &FieldValue, _param: &str) -> Result<bool, Fault> {
    let items: Vec<&Value> = match &v.value {
        Value::Seq(items) => items.iter().collect(),
        Value::Map(entries) => entries.iter().map(|(_, val)| val).collect(),
        _ => {
            return Err(Fault::new(format!(
                "unsupported type for unique, want map or sequence, got {}",
                v.ty
            )));
        }
    };

    for (i, a) in items.iter().enumerate() {
        if items[i + 1..].iter().any(|b| a == b) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn len(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    let n: i64 = param
        .parse()
        .map_err(|_| Fault::new(format!("{param} is not a valid number")))?;
    let l = length(&v.value)
        .ok_or_else(|| Fault::new(format!("unsupported type for len: {}", v.ty)))?;
    Ok(l == n)
}

/// Length as a signed count, so a negative bound compares instead of faulting.
fn length(value: &Value) -> Option<i64> {
    let l = match value {
        Value::String(s) => s.len(),
        Value::Seq(items) => items.len(),
        Value::Map(entries) => entries.len(),
        _ => return None,
    };
    Some(i64::try_from(l).unwrap_or(i64::MAX))
}

fn invalid_param(err: impl std::fmt::Display) -> Fault {
    Fault::new(format!("invalid param, {err}"))
}

/// Total order on floats where NaN sorts first and equals itself, and
/// `-0.0 == 0.0`.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Shared comparator of `gte`/`gt`/`lte`/`lt` (and `eq`/`ne` for non-strings).
///
/// Numbers compare by value, strings/sequences/maps by length.
fn compare(v: &FieldValue, param: &str) -> Result<Ordering, Fault> {
    match &v.value {
        Value::Int(i) => {
            let n: i64 = param.parse().map_err(invalid_param)?;
            Ok(i.cmp(&n))
        }
        Value::Uint(u) => {
            let n: u64 = param.parse().map_err(invalid_param)?;
            Ok(u.cmp(&n))
        }
        Value::Float(f) => {
            let n: f64 = param.parse().map_err(invalid_param)?;
            Ok(compare_floats(*f, n))
        }
        other => match length(other) {
            Some(l) => {
                let n: i64 = param.parse().map_err(invalid_param)?;
                Ok(l.cmp(&n))
            }
            None => Err(Fault::new(format!("unsupported type for compare: {}", v.ty))),
        },
    }
}

fn gte(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    Ok(compare(v, param)?.is_ge())
}

fn gt(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    Ok(compare(v, param)?.is_gt())
}

fn lte(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    Ok(compare(v, param)?.is_le())
}

fn lt(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    Ok(compare(v, param)?.is_lt())
}

fn eq(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    match &v.value {
        // complex numbers have no ordering; both parts must equal the parameter
        Value::Complex(re, im) => {
            let n: f64 = param.parse().map_err(invalid_param)?;
            Ok(compare_floats(*re, n).is_eq() && compare_floats(*im, n).is_eq())
        }
        Value::String(s) => Ok(s == param),
        _ => Ok(compare(v, param)?.is_eq()),
    }
}

fn ne(v: &FieldValue, param: &str) -> Result<bool, Fault> {
    Ok(!eq(v, param)?)
}
