use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BoxError;
use crate::schema::FieldType;
use crate::value::AnyValue;

/// Field-level value transform, applied after validators and before type
/// conversion.
///
/// Receives the source field's type, the destination field's type and the
/// source value. Its output does not have to match the destination type:
/// it goes through the normal conversion step afterwards.
pub trait CallbackFn: Send + Sync {
    fn call(&self, src: &FieldType, dst: &FieldType, value: AnyValue) -> Result<AnyValue, BoxError>;
}

impl<F> CallbackFn for F
where
    F: Fn(&FieldType, &FieldType, AnyValue) -> Result<AnyValue, BoxError> + Send + Sync,
{
    fn call(&self, src: &FieldType, dst: &FieldType, value: AnyValue) -> Result<AnyValue, BoxError> {
        self(src, dst, value)
    }
}

/// A named callback, referenced from tags as `callback:<name>`.
#[derive(Clone)]
pub struct Callback {
    pub name: String,
    pub func: Arc<dyn CallbackFn>,
}

impl Callback {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&FieldType, &FieldType, AnyValue) -> Result<AnyValue, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

/// User callbacks of one mapper. There are no built-ins.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.callbacks.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CallbackRegistry").field("callbacks", &names).finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later registrations under the same name replace earlier ones.
    pub fn register(&mut self, callback: Callback) {
        self.callbacks.insert(callback.name.clone(), callback);
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }
}
