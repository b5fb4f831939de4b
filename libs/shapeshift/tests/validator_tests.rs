//! Built-in validator semantics, exercised directly through the shared table
//! and through tags on mapped records.

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use shapeshift::{
    Complex, FieldValue, Fault, MapError, Mappable, Mapper, Record, Validator, ValidatorFn,
    ValidatorTable,
};

fn check<T: Mappable>(name: &str, value: T, param: &str) -> Result<bool, Fault> {
    let table = ValidatorTable::builtin();
    let func = table
        .get(name)
        .unwrap_or_else(|| panic!("built-in {name} missing"));
    let fv = FieldValue::new(value.to_value(), T::field_type(), "Test", "field");
    func.validate(&fv, param)
}

// =============================================================================
// TABLE
// =============================================================================

#[test]
fn builtin_table_has_all_names() {
    let table = ValidatorTable::builtin();
    assert_eq!(
        table.names(),
        vec!["eq", "gt", "gte", "len", "lt", "lte", "ne", "required", "unique"]
    );
}

#[test]
fn builtin_table_is_shared() {
    assert!(Arc::ptr_eq(
        &ValidatorTable::builtin(),
        &ValidatorTable::builtin()
    ));
}

// =============================================================================
// REQUIRED
// =============================================================================

#[test]
fn required_rejects_zero_values() {
    assert_eq!(check("required", 0i32, ""), Ok(false));
    assert_eq!(check("required", 0.0f64, ""), Ok(false));
    assert_eq!(check("required", String::new(), ""), Ok(false));
    assert_eq!(check("required", false, ""), Ok(false));
    assert_eq!(check("required", None::<i32>, ""), Ok(false));
    assert_eq!(check("required", Vec::<i32>::new(), ""), Ok(false));
}

#[test]
fn required_accepts_non_zero_values() {
    assert_eq!(check("required", -1i32, ""), Ok(true));
    assert_eq!(check("required", "x".to_string(), ""), Ok(true));
    assert_eq!(check("required", Some(0i32), ""), Ok(true));
    assert_eq!(check("required", Some(3i32), ""), Ok(true));
    assert_eq!(check("required", vec![0u8], ""), Ok(true));
}

// =============================================================================
// UNIQUE
// =============================================================================

#[test]
fn unique_on_sequences() {
    assert_eq!(check("unique", vec![1, 2, 3], ""), Ok(true));
    assert_eq!(check("unique", vec![1, 2, 1], ""), Ok(false));
    assert_eq!(check("unique", Vec::<String>::new(), ""), Ok(true));
}

#[test]
fn unique_on_map_values() {
    let distinct = BTreeMap::from([(1, "a".to_string()), (2, "b".to_string())]);
    let repeated = BTreeMap::from([(1, "a".to_string()), (2, "a".to_string())]);
    assert_eq!(check("unique", distinct, ""), Ok(true));
    assert_eq!(check("unique", repeated, ""), Ok(false));
}

#[test]
fn unique_on_scalar_is_a_fault() {
    let fault = check("unique", 5i32, "").unwrap_err();
    assert!(fault.message.contains("want map or sequence"), "{fault}");
}

// =============================================================================
// LEN
// =============================================================================

#[test]
fn len_counts_bytes_and_elements() {
    assert_eq!(check("len", "abcd".to_string(), "4"), Ok(true));
    assert_eq!(check("len", "abcd".to_string(), "3"), Ok(false));
    assert_eq!(check("len", "é".to_string(), "2"), Ok(true));
    assert_eq!(check("len", vec![1, 2], "2"), Ok(true));
    assert_eq!(check("len", BTreeMap::from([(1, 1)]), "1"), Ok(true));
}

#[test]
fn len_faults_on_bad_param_or_kind() {
    assert!(check("len", "abc".to_string(), "three").is_err());
    assert!(check("len", 3i32, "3").is_err());
}

// =============================================================================
// ORDERING COMPARATORS
// =============================================================================

#[test]
fn comparators_on_signed_integers() {
    assert_eq!(check("gte", 5i32, "5"), Ok(true));
    assert_eq!(check("gt", 5i32, "5"), Ok(false));
    assert_eq!(check("lte", -3i64, "-2"), Ok(true));
    assert_eq!(check("lt", -3i64, "-3"), Ok(false));
}

#[test]
fn comparators_on_unsigned_integers() {
    assert_eq!(check("gt", 10u32, "9"), Ok(true));
    assert_eq!(check("lt", u64::MAX, "18446744073709551615"), Ok(false));
    assert!(check("gt", 10u32, "-1").is_err());
}

#[test]
fn comparators_on_floats() {
    assert_eq!(check("gte", 2.5f64, "2.5"), Ok(true));
    assert_eq!(check("gt", 2.5f32, "2"), Ok(true));
    assert_eq!(check("lt", f64::NAN, "0"), Ok(true));
    assert_eq!(check("lt", 1.0f64, "1e3"), Ok(true));
}

#[test]
fn comparators_on_lengths() {
    assert_eq!(check("gte", "abc".to_string(), "3"), Ok(true));
    assert_eq!(check("gt", vec![1, 2], "2"), Ok(false));
    assert_eq!(check("lte", BTreeMap::<i32, i32>::new(), "0"), Ok(true));
}

#[test]
fn negative_length_bounds_compare_instead_of_faulting() {
    assert_eq!(check("gt", vec![1, 2], "-1"), Ok(true));
    assert_eq!(check("gte", String::new(), "-1"), Ok(true));
    assert_eq!(check("lt", "abc".to_string(), "-5"), Ok(false));
    assert_eq!(check("len", Vec::<i32>::new(), "-1"), Ok(false));
}

#[test]
fn comparators_fault_on_unsupported_kinds() {
    assert!(check("gte", true, "1").is_err());
    assert!(check("lt", 5i32, "five").is_err());
}

// =============================================================================
// EQ / NE
// =============================================================================

#[test]
fn eq_on_strings_is_exact() {
    assert_eq!(check("eq", "abc".to_string(), "abc"), Ok(true));
    assert_eq!(check("eq", "abc".to_string(), "3"), Ok(false));
    assert_eq!(check("ne", "abc".to_string(), "abd"), Ok(true));
}

#[test]
fn eq_on_numbers_and_lengths() {
    assert_eq!(check("eq", 7u8, "7"), Ok(true));
    assert_eq!(check("eq", -0.0f64, "0"), Ok(true));
    assert_eq!(check("ne", 7i32, "8"), Ok(true));
    assert_eq!(check("eq", vec![1, 2, 3], "3"), Ok(true));
}

#[test]
fn eq_on_complex_compares_both_parts() {
    assert_eq!(check("eq", Complex::new(2.0, 2.0), "2"), Ok(true));
    assert_eq!(check("eq", Complex::new(2.0, 0.0), "2"), Ok(false));
    assert_eq!(check("ne", Complex::new(2.0, 0.0), "2"), Ok(true));
    assert!(check("eq", Complex::default(), "zero").is_err());
}

// =============================================================================
// TAGS ON MAPPED RECORDS
// =============================================================================

#[derive(Debug, Default, Record)]
pub struct Signup {
    pub username: String,
    pub age: u8,
    pub interests: Vec<String>,
}

#[derive(Debug, Default, Record)]
pub struct CheckedSignup {
    #[shapeshift(",required,len=8")]
    pub username: String,
    #[shapeshift(",gte=18,lt=130")]
    pub age: u8,
    #[shapeshift(",unique,lte=3")]
    pub interests: Vec<String>,
}

fn signup() -> Signup {
    Signup {
        username: "adalove1".to_string(),
        age: 36,
        interests: vec!["math".to_string(), "poetry".to_string()],
    }
}

#[test]
fn all_validators_pass() {
    let dst: CheckedSignup = Mapper::default().map_to(&signup()).unwrap();
    assert_eq!(dst.username, "adalove1");
    assert_eq!(dst.age, 36);
    assert_eq!(dst.interests.len(), 2);
}

#[test]
fn validators_run_in_tag_order() {
    let src = Signup {
        username: String::new(),
        ..signup()
    };
    let err = Mapper::default()
        .map_to::<_, CheckedSignup>(&src)
        .unwrap_err();
    assert!(matches!(err, MapError::Validation { ref validator, .. } if validator == "required"));

    let src = Signup {
        username: "short".to_string(),
        ..signup()
    };
    let err = Mapper::default()
        .map_to::<_, CheckedSignup>(&src)
        .unwrap_err();
    assert!(matches!(err, MapError::Validation { ref validator, .. } if validator == "len"));
}

#[test]
fn first_failing_field_aborts() {
    let src = Signup {
        age: 12,
        interests: vec!["a".to_string(), "a".to_string()],
        ..signup()
    };
    let err = Mapper::default()
        .map_to::<_, CheckedSignup>(&src)
        .unwrap_err();
    match err {
        MapError::Validation { validator, field, .. } => {
            assert_eq!(validator, "gte");
            assert_eq!(field, "age");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn duplicate_sequence_entries_fail_unique() {
    let src = Signup {
        interests: vec!["a".to_string(), "a".to_string()],
        ..signup()
    };
    let err = Mapper::default()
        .map_to::<_, CheckedSignup>(&src)
        .unwrap_err();
    assert!(matches!(err, MapError::Validation { ref validator, .. } if validator == "unique"));
}

#[test]
fn custom_table_replaces_builtins() {
    let table = ValidatorTable::from_validators([Validator::new(
        "required",
        |_: &FieldValue, _: &str| Ok(true),
    )]);
    let mapper = Mapper::builder()
        .validator_table(Arc::new(table))
        .ignore_missing_validators()
        .build();

    let src = Signup {
        username: String::new(),
        ..signup()
    };
    let dst: CheckedSignup = mapper.map_to(&src).unwrap();
    assert_eq!(dst.username, "");
}
