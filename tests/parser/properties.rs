//! Property tests: every leaf extracts back the value it was written from

use std::time::Duration;

use proptest::prelude::*;
use sigil_foundation::{ItemRef, Value, format_duration};
use sigil_parser::ParamSpec;

use crate::value;

proptest! {
    #[test]
    fn integer_roundtrip(n in any::<i64>()) {
        prop_assert_eq!(value(ParamSpec::integer("n"), &n.to_string()), Some(Value::Int(n)));
    }

    #[test]
    fn decimal_roundtrip(x in -1.0e9f64..1.0e9) {
        prop_assert_eq!(
            value(ParamSpec::decimal("x"), &x.to_string()),
            Some(Value::Decimal(x))
        );
    }

    #[test]
    fn free_text_roundtrip(text in "[A-Za-z0-9][A-Za-z0-9 ,.!?]{0,30}[A-Za-z0-9]") {
        prop_assert_eq!(value(ParamSpec::text("t"), &text), Some(Value::Text(text.clone())));
    }

    #[test]
    fn choice_roundtrip(index in 0usize..4) {
        let options = ["red", "green", "blue", "gray"];
        prop_assert_eq!(
            value(ParamSpec::choice(&options), options[index]),
            Some(Value::Text(options[index].to_string()))
        );
    }

    #[test]
    fn duration_roundtrip(secs in 0u64..100_000_000) {
        let d = Duration::from_secs(secs);
        prop_assert_eq!(
            value(ParamSpec::duration("d"), &format_duration(d)),
            Some(Value::Duration(d))
        );
    }

    #[test]
    fn reference_roundtrip(
        low in any::<u64>(),
        high in any::<u64>(),
        qty in any::<u64>(),
        label in "[A-Za-z][A-Za-z ]{0,12}[A-Za-z]",
    ) {
        let item = ItemRef::new(low, high, qty, label);
        prop_assert_eq!(
            value(ParamSpec::reference("r"), &item.to_string()),
            Some(Value::Reference(item))
        );
    }

    #[test]
    fn repeated_integers_keep_order(numbers in prop::collection::vec(any::<i64>(), 1..12)) {
        let line = numbers.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
        let expected = Value::List(numbers.into_iter().map(Value::Int).collect());
        prop_assert_eq!(
            value(ParamSpec::repeated(ParamSpec::integer("n")).unwrap(), &line),
            Some(expected)
        );
    }

    #[test]
    fn free_text_never_panics(text in "\\PC{0,40}") {
        let _ = crate::extract_one(ParamSpec::text("t"), &text);
        let _ = crate::extract_one(ParamSpec::repeated(ParamSpec::duration("d")).unwrap(), &text);
    }
}
