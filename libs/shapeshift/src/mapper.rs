use std::sync::Arc;

use crate::callback::{Callback, CallbackRegistry};
use crate::config::Config;
use crate::error::{MapError, ValueError};
use crate::record::Record;
use crate::schema::{FieldType, RecordType};
use crate::tag::FieldPlan;
use crate::validator::{Validator, ValidatorRegistry, ValidatorTable};
use crate::value::{AnyValue, FieldValue, RecordValue, Value};

/// Record-to-record converter.
///
/// Holds the behaviour toggles and both registries. Immutable once built,
/// so one mapper can be shared across threads and reused for any number of
/// calls.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: Config,
    validators: ValidatorRegistry,
    callbacks: CallbackRegistry,
}

impl Mapper {
    /// Mapper with the given toggles, the built-in validators and no
    /// callbacks.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Copy every eligible field of `src` into `dst`.
    ///
    /// Destination fields without a matching exported source field are left
    /// untouched. On error, fields assigned before the failing one stay
    /// assigned.
    pub fn map<S: Record, D: Record>(&self, src: &S, dst: &mut D) -> Result<(), MapError> {
        self.map_any(AnyValue::from_parts(src.to_value(), S::field_type()), dst)
    }

    /// Convert `src` into a fresh `D::default()`.
    pub fn map_to<S: Record, D: Record>(&self, src: &S) -> Result<D, MapError> {
        let mut dst = D::default();
        self.map(src, &mut dst)?;
        Ok(dst)
    }

    /// Dynamic entry point: the source is only known as a value and its type.
    ///
    /// Accepts a record or a present `Option` of a record. Anything else is
    /// rejected before any field is touched.
    pub fn map_any<D: Record>(&self, src: AnyValue, dst: &mut D) -> Result<(), MapError> {
        let src_rt = src.record_type().ok_or_else(|| {
            MapError::InvalidInput(format!(
                "source must be a record or a present optional record, got {}",
                src.ty
            ))
        })?;
        let record = match src.value {
            Value::Record(r) => r,
            other => {
                return Err(MapError::InvalidInput(format!(
                    "source {} carries a {} value",
                    src_rt.name(),
                    other.kind_name()
                )));
            }
        };
        let dst_rt = D::record_type();

        tracing::debug!(source = src_rt.name(), destination = dst_rt.name(), "mapping record");
        self.map_fields(
            &src_rt,
            &record,
            &dst_rt,
            &mut |name: &'static str, value: Value| dst.set_field(name, value),
            0,
        )?;
        tracing::debug!(source = src_rt.name(), destination = dst_rt.name(), "record mapped");
        Ok(())
    }

    /// Convert a dynamic record value into the record type `dst`, returning
    /// the produced value instead of writing into a typed destination.
    pub fn map_value(&self, src: AnyValue, dst: &FieldType) -> Result<Value, MapError> {
        let FieldType::Record(dst_rt) = dst else {
            return Err(MapError::InvalidInput(format!(
                "destination must be a record, got {dst}"
            )));
        };
        let src_rt = src.record_type().ok_or_else(|| {
            MapError::InvalidInput(format!(
                "source must be a record or a present optional record, got {}",
                src.ty
            ))
        })?;
        let from = FieldValue::new(src.value, FieldType::Record(src_rt), src_rt.name(), "");
        self.convert(from, &FieldType::Record(*dst_rt), dst_rt.name(), 0)
    }

    /// The per-field pipeline shared by top-level and nested records.
    ///
    /// `assign` writes one converted destination field; it is a typed
    /// `set_field` at the top level and a `RecordValue` slot when nested.
    pub(crate) fn map_fields(
        &self,
        src_rt: &RecordType,
        src: &RecordValue,
        dst_rt: &RecordType,
        assign: &mut dyn FnMut(&'static str, Value) -> Result<(), ValueError>,
        depth: usize,
    ) -> Result<(), MapError> {
        let src_schema = src_rt.schema();
        let dst_schema = dst_rt.schema();

        for field in &dst_schema.fields {
            if !field.exported {
                tracing::trace!(target_field = field.name, "unexported destination field, skipped");
                continue;
            }

            let plan = FieldPlan::from_tag(field.tag, &self.validators, &self.callbacks, &self.config)?;
            if plan.skip {
                tracing::trace!(target_field = field.name, "skipped by tag");
                continue;
            }

            let source_name = plan.rename.as_deref().unwrap_or(field.name);
            let Some(src_field) = src_schema.field(source_name).filter(|f| f.exported) else {
                tracing::trace!(
                    source = src_rt.name(),
                    source_field = source_name,
                    target_field = field.name,
                    "no exported source field, left untouched"
                );
                continue;
            };
            let Some(value) = src.get(source_name) else {
                continue;
            };

            let mut current =
                FieldValue::new(value.clone(), src_field.field_type.clone(), src_rt.name(), source_name);

            for validator in &plan.validators {
                match validator.run(&current) {
                    Ok(true) => {}
                    Ok(false) => {
                        return Err(MapError::Validation {
                            validator: validator.name.clone(),
                            record: dst_rt.name(),
                            field: field.name.to_string(),
                        });
                    }
                    Err(fault) => {
                        tracing::error!(
                            validator = %validator.name,
                            record = dst_rt.name(),
                            field = field.name,
                            %fault,
                            "validator misused"
                        );
                        return Err(MapError::Fault {
                            validator: validator.name.clone(),
                            record: dst_rt.name(),
                            field: field.name.to_string(),
                            fault,
                        });
                    }
                }
            }

            if let Some(callback) = &plan.callback {
                let input = AnyValue::from_parts(current.value.clone(), current.ty.clone());
                let output = callback
                    .func
                    .call(&current.ty, &field.field_type, input)
                    .map_err(|source| MapError::Callback {
                        record: dst_rt.name(),
                        field: field.name.to_string(),
                        source,
                    })?;
                current = current.with(output.value, output.ty);
            }

            let converted = if current.ty == field.field_type && !field.field_type.holds_record() {
                current.value
            } else {
                self.convert(current, &field.field_type, field.name, depth)?
            };

            assign(field.name, converted).map_err(|e| MapError::Conversion {
                record: src_rt.name(),
                field: source_name.to_string(),
                target: field.name.to_string(),
                reason: e.to_string(),
            })?;
            tracing::trace!(
                source_field = source_name,
                target_field = field.name,
                "field assigned"
            );
        }

        Ok(())
    }
}

/// Fluent construction of a [`Mapper`].
#[derive(Debug, Default)]
pub struct MapperBuilder {
    config: Config,
    defaults: Option<Arc<ValidatorTable>>,
    validators: Vec<Validator>,
    callbacks: Vec<Callback>,
}

impl MapperBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let registered validators replace built-ins of the same name.
    pub fn override_default_validators(mut self) -> Self {
        self.config.override_default_validators = true;
        self
    }

    pub fn ignore_missing_validators(mut self) -> Self {
        self.config.ignore_missing_validators = true;
        self
    }

    pub fn ignore_missing_callbacks(mut self) -> Self {
        self.config.ignore_missing_callbacks = true;
        self
    }

    pub fn auto_string_to_number(mut self) -> Self {
        self.config.auto_string_to_number = true;
        self
    }

    pub fn auto_number_to_string(mut self) -> Self {
        self.config.auto_number_to_string = true;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Replace every toggle at once, e.g. with a loaded [`Config`].
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Use `table` instead of the built-in validators as the defaults.
    pub fn validator_table(mut self, table: Arc<ValidatorTable>) -> Self {
        self.defaults = Some(table);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn callbacks(mut self, callbacks: impl IntoIterator<Item = Callback>) -> Self {
        self.callbacks.extend(callbacks);
        self
    }

    pub fn build(self) -> Mapper {
        let mut validators =
            ValidatorRegistry::new(self.defaults.unwrap_or_else(ValidatorTable::builtin));
        for v in self.validators {
            validators.register(v);
        }

        let mut callbacks = CallbackRegistry::new();
        for cb in self.callbacks {
            callbacks.register(cb);
        }

        Mapper {
            config: self.config,
            validators,
            callbacks,
        }
    }
}
