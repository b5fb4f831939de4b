//! Conversion engine: bridges a source value to a destination type.
//!
//! One exhaustive `match` on the destination [`FieldType`] decides what a
//! source may become:
//!
//! | destination | accepted sources |
//! |---|---|
//! | record | record (field by field, full tag pipeline) |
//! | sequence | sequence (element by element) |
//! | map | identical map type only (entry by entry when it holds records) |
//! | signed / unsigned / float | int, uint, float; string if `auto_string_to_number` |
//! | string | string; int, uint, float if `auto_number_to_string` |
//! | optional | absent stays absent, anything else converts into the inner type |
//! | bool, complex | identical type only |

use crate::error::MapError;
use crate::mapper::Mapper;
use crate::schema::{FieldType, FloatWidth, IntWidth, RecordType, UintWidth};
use crate::value::{FieldValue, RecordValue, Value};

/// Conversion failure scoped to the field being converted.
fn fail(src: &FieldValue, target: &str, reason: impl Into<String>) -> MapError {
    MapError::Conversion {
        record: src.record,
        field: src.field.clone(),
        target: target.to_string(),
        reason: reason.into(),
    }
}

fn cannot_convert(src: &FieldValue, target: &str, dst: &FieldType) -> MapError {
    fail(src, target, format!("cannot auto convert {} to {}", src.ty, dst))
}

impl Mapper {
    /// Produce a value of type `dst` from `src`, or explain why not.
    ///
    /// `target` names the destination field, for error messages only.
    pub(crate) fn convert(
        &self,
        src: FieldValue,
        dst: &FieldType,
        target: &str,
        depth: usize,
    ) -> Result<Value, MapError> {
        if src.ty == *dst && !dst.holds_record() {
            return Ok(src.value);
        }
        if depth > self.config().max_depth {
            return Err(fail(
                &src,
                target,
                format!("nesting depth limit ({}) exceeded", self.config().max_depth),
            ));
        }

        // A present optional behaves like its inner type everywhere except
        // an optional destination, which handles it itself.
        let src = match dst {
            FieldType::Optional(_) => src,
            _ if matches!(src.ty, FieldType::Optional(_)) => {
                if src.value == Value::Null {
                    return Err(fail(
                        &src,
                        target,
                        format!("cannot convert absent {} to {}", src.ty, dst),
                    ));
                }
                unwrap_optional(src)
            }
            _ => src,
        };
        if src.ty == *dst && !dst.holds_record() {
            return Ok(src.value);
        }

        match dst {
            FieldType::Record(rt) => self.convert_record(src, rt, target, depth),
            FieldType::Seq(elem) => self.convert_seq(src, elem, target, depth),
            FieldType::Map(k, v) if src.ty == *dst => self.convert_map(src, k, v, target, depth),
            FieldType::Map(_, _) => Err(fail(
                &src,
                target,
                format!(
                    "mapping different types of maps isn't supported ({} to {})",
                    src.ty, dst
                ),
            )),
            FieldType::Int(w) => self.convert_int(&src, *w, dst, target),
            FieldType::Uint(w) => self.convert_uint(&src, *w, dst, target),
            FieldType::Float(w) => self.convert_float(&src, *w, dst, target),
            FieldType::String => self.convert_string(&src, target),
            FieldType::Optional(inner) => {
                if src.value == Value::Null {
                    return Ok(Value::Null);
                }
                self.convert(unwrap_optional(src), inner, target, depth)
            }
            FieldType::Bool | FieldType::Complex => {
                Err(fail(&src, target, format!("{dst} is not convertible")))
            }
        }
    }

    fn convert_record(
        &self,
        src: FieldValue,
        dst: &RecordType,
        target: &str,
        depth: usize,
    ) -> Result<Value, MapError> {
        let (src_rt, record) = match (&src.ty, &src.value) {
            (FieldType::Record(rt), Value::Record(r)) => (*rt, r),
            _ => return Err(cannot_convert(&src, target, &FieldType::Record(*dst))),
        };

        let mut out = match dst.zero() {
            Value::Record(r) => r,
            other => {
                return Err(fail(
                    &src,
                    target,
                    format!("{} produced a {} as its zero value", dst.name(), other.kind_name()),
                ));
            }
        };

        self.map_fields(
            &src_rt,
            record,
            dst,
            &mut |name: &'static str, value: Value| assign_field(&mut out, name, value),
            depth + 1,
        )
        .map_err(|e| e.with_context(format!("{} -> {}", src_rt.name(), dst.name())))?;

        Ok(Value::Record(out))
    }

    fn convert_seq(
        &self,
        src: FieldValue,
        dst_elem: &FieldType,
        target: &str,
        depth: usize,
    ) -> Result<Value, MapError> {
        let FieldValue {
            value,
            ty,
            record,
            field,
        } = src;

        match (ty, value) {
            (FieldType::Seq(src_elem), Value::Seq(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let elem = FieldValue::new(item, (*src_elem).clone(), record, format!("{field}[{i}]"));
                    out.push(self.convert(elem, dst_elem, target, depth + 1)?);
                }
                Ok(Value::Seq(out))
            }
            (ty, value) => {
                let src = FieldValue::new(value, ty, record, field);
                let dst = FieldType::Seq(Box::new(dst_elem.clone()));
                Err(cannot_convert(&src, target, &dst))
            }
        }
    }

    /// Entry by entry, for an identical map type whose keys or values hold records.
    fn convert_map(
        &self,
        src: FieldValue,
        key: &FieldType,
        val: &FieldType,
        target: &str,
        depth: usize,
    ) -> Result<Value, MapError> {
        let FieldValue {
            value,
            ty,
            record,
            field,
        } = src;

        match value {
            Value::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (i, (k, v)) in entries.into_iter().enumerate() {
                    let k = FieldValue::new(k, key.clone(), record, format!("{field}[{i}]"));
                    let v = FieldValue::new(v, val.clone(), record, format!("{field}[{i}]"));
                    out.push((
                        self.convert(k, key, target, depth + 1)?,
                        self.convert(v, val, target, depth + 1)?,
                    ));
                }
                Ok(Value::Map(out))
            }
            value => {
                let src = FieldValue::new(value, ty.clone(), record, field);
                Err(cannot_convert(&src, target, &ty))
            }
        }
    }

    fn parse_gate(&self, src: &FieldValue, target: &str, dst: &FieldType) -> Result<(), MapError> {
        if self.config().auto_string_to_number {
            return Ok(());
        }
        Err(fail(
            src,
            target,
            format!(
                "want {dst}, got {} (to auto convert strings to numbers, enable auto_string_to_number)",
                src.ty
            ),
        ))
    }

    fn parse_failed(src: &FieldValue, target: &str, dst: &FieldType, err: impl std::fmt::Display) -> MapError {
        fail(src, target, format!("failed to auto convert {:?} to {dst}: {err}", text_of(src)))
    }

    fn convert_int(
        &self,
        src: &FieldValue,
        width: IntWidth,
        dst: &FieldType,
        target: &str,
    ) -> Result<Value, MapError> {
        let v = match &src.value {
            Value::Int(i) => *i,
            Value::Uint(u) => *u as i64,
            Value::Float(f) => *f as i64,
            Value::String(s) => {
                self.parse_gate(src, target, dst)?;
                s.parse::<i64>()
                    .map_err(|e| Self::parse_failed(src, target, dst, e))?
            }
            _ => return Err(cannot_convert(src, target, dst)),
        };
        Ok(Value::Int(width.wrap(v)))
    }

    fn convert_uint(
        &self,
        src: &FieldValue,
        width: UintWidth,
        dst: &FieldType,
        target: &str,
    ) -> Result<Value, MapError> {
        let v = match &src.value {
            Value::Int(i) => *i as u64,
            Value::Uint(u) => *u,
            Value::Float(f) => *f as u64,
            Value::String(s) => {
                self.parse_gate(src, target, dst)?;
                s.parse::<u64>()
                    .map_err(|e| Self::parse_failed(src, target, dst, e))?
            }
            _ => return Err(cannot_convert(src, target, dst)),
        };
        Ok(Value::Uint(width.wrap(v)))
    }

    fn convert_float(
        &self,
        src: &FieldValue,
        width: FloatWidth,
        dst: &FieldType,
        target: &str,
    ) -> Result<Value, MapError> {
        let v = match &src.value {
            Value::Int(i) => *i as f64,
            Value::Uint(u) => *u as f64,
            Value::Float(f) => *f,
            Value::String(s) => {
                self.parse_gate(src, target, dst)?;
                s.parse::<f64>()
                    .map_err(|e| Self::parse_failed(src, target, dst, e))?
            }
            _ => return Err(cannot_convert(src, target, dst)),
        };
        Ok(Value::Float(match width {
            FloatWidth::F32 => v as f32 as f64,
            FloatWidth::F64 => v,
        }))
    }

    fn convert_string(&self, src: &FieldValue, target: &str) -> Result<Value, MapError> {
        if let Value::String(s) = &src.value {
            return Ok(Value::String(s.clone()));
        }

        if src.ty.is_numeric() && !self.config().auto_number_to_string {
            return Err(fail(
                src,
                target,
                format!(
                    "want String, got {} (to auto convert numbers to strings, enable auto_number_to_string)",
                    src.ty
                ),
            ));
        }

        let text = match (&src.value, &src.ty) {
            (Value::Int(i), _) => i.to_string(),
            (Value::Uint(u), _) => u.to_string(),
            (Value::Float(f), FieldType::Float(FloatWidth::F32)) => format_float(*f, true),
            (Value::Float(f), _) => format_float(*f, false),
            _ => return Err(cannot_convert(src, target, &FieldType::String)),
        };
        Ok(Value::String(text))
    }
}

/// Strip one level of `Option` from the carried type. The value is already
/// flat: a present optional holds its inner value directly.
fn unwrap_optional(src: FieldValue) -> FieldValue {
    match src.ty {
        FieldType::Optional(inner) => FieldValue { ty: *inner, ..src },
        _ => src,
    }
}

/// Shortest text that parses back to the same value, at the source's
/// precision. A decimal exponent below -4 or from 6 up switches to exponent
/// form with a signed two-digit exponent (`1e+21`, `1.5e-07`).
fn format_float(f: f64, single: bool) -> String {
    let (plain, exp) = if single {
        let f = f as f32;
        (f.to_string(), format!("{f:e}"))
    } else {
        (f.to_string(), format!("{f:e}"))
    };
    if !f.is_finite() || f == 0.0 {
        return plain;
    }

    let Some((mantissa, e)) = exp.split_once('e') else {
        return plain;
    };
    match e.parse::<i32>() {
        Ok(e) if !(-4..6).contains(&e) => {
            let sign = if e < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", e.unsigned_abs())
        }
        _ => plain,
    }
}

fn text_of(src: &FieldValue) -> &str {
    match &src.value {
        Value::String(s) => s,
        _ => "",
    }
}

fn assign_field(
    out: &mut RecordValue,
    name: &'static str,
    value: Value,
) -> Result<(), crate::error::ValueError> {
    if out.set(name, value) {
        Ok(())
    } else {
        Err(crate::error::ValueError::UnknownField {
            record: out.name,
            field: name.to_string(),
        })
    }
}
