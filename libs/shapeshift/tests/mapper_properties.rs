//! Property-based tests for mapping invariants.
//!
//! - Copying between records with identical public fields is lossless.
//! - Number → string → number round trips with both auto toggles on.
//! - Integer narrowing agrees with Rust's own `as` casts.
//! - Sequences keep their length and order.
//! - Tag name normalization is idempotent.

use proptest::prelude::*;
use shapeshift::tag::to_snake_case;
use shapeshift::{Mapper, Record};

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Source {
    pub id: u64,
    pub delta: i32,
    pub name: String,
    pub tags: Vec<String>,
    pub maybe: Option<i16>,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
pub struct Target {
    pub id: u64,
    pub delta: i32,
    pub name: String,
    pub tags: Vec<String>,
    pub maybe: Option<i16>,
}

#[derive(Debug, Default, Record)]
pub struct Wide {
    pub v: i64,
}

#[derive(Debug, Default, Record)]
pub struct Narrow {
    pub v: u8,
}

#[derive(Debug, Default, Record)]
pub struct Text {
    pub v: String,
}

#[derive(Debug, Default, Record)]
pub struct Ints {
    pub v: Vec<i32>,
}

#[derive(Debug, Default, Record)]
pub struct Longs {
    pub v: Vec<i64>,
}

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn source_strategy() -> impl Strategy<Value = Source> {
    (
        any::<u64>(),
        any::<i32>(),
        "[a-zA-Z0-9 ]{0,24}",
        prop::collection::vec("[a-z]{0,8}", 0..6),
        any::<Option<i16>>(),
    )
        .prop_map(|(id, delta, name, tags, maybe)| Source {
            id,
            delta,
            name,
            tags,
            maybe,
        })
}

fn auto() -> Mapper {
    Mapper::builder()
        .auto_string_to_number()
        .auto_number_to_string()
        .build()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    /// Identical public field sets copy every value unchanged.
    #[test]
    fn identical_records_copy_losslessly(src in source_strategy()) {
        let dst: Target = Mapper::default().map_to(&src).unwrap();
        prop_assert_eq!(dst.id, src.id);
        prop_assert_eq!(dst.delta, src.delta);
        prop_assert_eq!(&dst.name, &src.name);
        prop_assert_eq!(&dst.tags, &src.tags);
        prop_assert_eq!(dst.maybe, src.maybe);
    }

    /// Formatting then parsing an integer yields the same value.
    #[test]
    fn integer_string_round_trip(v in any::<i64>()) {
        let mapper = auto();
        let text: Text = mapper.map_to(&Wide { v }).unwrap();
        prop_assert_eq!(&text.v, &v.to_string());
        let back: Wide = mapper.map_to(&text).unwrap();
        prop_assert_eq!(back.v, v);
    }

    /// Narrowing wraps exactly like an `as` cast.
    #[test]
    fn narrowing_matches_as_cast(v in any::<i64>()) {
        let dst: Narrow = Mapper::default().map_to(&Wide { v }).unwrap();
        prop_assert_eq!(dst.v, v as u8);
    }

    /// Element-wise sequence conversion preserves length and order.
    #[test]
    fn sequences_keep_length_and_order(v in prop::collection::vec(any::<i32>(), 0..32)) {
        let dst: Longs = Mapper::default().map_to(&Ints { v: v.clone() }).unwrap();
        let expected: Vec<i64> = v.iter().map(|&x| x as i64).collect();
        prop_assert_eq!(dst.v, expected);
    }

    /// Normalizing an already normalized name changes nothing.
    #[test]
    fn snake_case_is_idempotent(name in "[a-zA-Z][a-zA-Z0-9_]{0,16}") {
        let once = to_snake_case(&name);
        prop_assert_eq!(to_snake_case(&once), once.clone());
        prop_assert!(!once.chars().any(|c| c.is_ascii_uppercase()));
    }
}
