//! Integration tests for repeated parameters

use std::time::Duration;

use sigil_foundation::{ItemRef, Value};
use sigil_parser::{CommandDef, ExtractContext, ParamSpec, SignatureCompiler};

use crate::{noop, value};

#[test]
fn repeated_integers() {
    assert_eq!(
        value(ParamSpec::repeated(ParamSpec::integer("n")).unwrap(), "1 2 3"),
        Some(Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
}

#[test]
fn repeated_needs_one_occurrence() {
    assert_eq!(
        value(ParamSpec::repeated(ParamSpec::integer("n")).unwrap(), ""),
        None
    );
    assert_eq!(
        value(ParamSpec::repeated(ParamSpec::integer("n")).unwrap(), "1 two 3"),
        None
    );
}

#[test]
fn repeated_durations() {
    let secs: Vec<u64> = match value(
        ParamSpec::repeated(ParamSpec::duration("n")).unwrap(),
        "1m 5M4S 4h2m1s",
    ) {
        Some(Value::List(items)) => items
            .iter()
            .map(|v| v.as_duration().map_or(0, |d| d.as_secs()))
            .collect(),
        other => panic!("unexpected value: {other:?}"),
    };
    assert_eq!(secs, [60, 304, 14_521]);
}

#[test]
fn repeated_references_keep_every_group() {
    assert_eq!(
        value(
            ParamSpec::repeated(ParamSpec::reference("item")).unwrap(),
            "<ref low=1 high=2 qty=3>Apple</ref> <ref low=4 high=5 qty=6>Pear</ref>"
        ),
        Some(Value::List(vec![
            Value::Reference(ItemRef::new(1, 2, 3, "Apple")),
            Value::Reference(ItemRef::new(4, 5, 6, "Pear")),
        ]))
    );
}

#[test]
fn unrepeatable_inner_is_rejected() {
    assert!(ParamSpec::repeated(ParamSpec::text("t")).is_err());
    assert!(ParamSpec::repeated(ParamSpec::flags(&["x"])).is_err());
    let nested = ParamSpec::repeated(ParamSpec::integer("n")).unwrap();
    assert!(ParamSpec::repeated(nested).is_err());
}

#[test]
fn parameters_after_a_repeated_run_stay_aligned() {
    let signature = SignatureCompiler::compile(
        CommandDef::new("give")
            .param(ParamSpec::repeated(ParamSpec::reference("items")).unwrap())
            .param(ParamSpec::constant("to"))
            .param(ParamSpec::text("who"))
            .handler(noop),
    )
    .unwrap();

    let args = signature
        .try_match(" <ref low=1 high=2 qty=3>Apple</ref> <ref low=7 high=8 qty=9>Fig</ref> to Ann")
        .unwrap()
        .extract(&ExtractContext::default())
        .unwrap();

    assert_eq!(args.list("items").unwrap().len(), 2);
    assert_eq!(args.text("who").unwrap(), "Ann");
}

#[test]
fn parameters_before_a_repeated_run_stay_aligned() {
    let signature = SignatureCompiler::compile(
        CommandDef::new("wait")
            .param(ParamSpec::integer("times"))
            .param(ParamSpec::repeated(ParamSpec::duration("gaps")).unwrap())
            .handler(noop),
    )
    .unwrap();

    let args = signature
        .try_match(" 2 1m 30s")
        .unwrap()
        .extract(&ExtractContext::default())
        .unwrap();
    assert_eq!(args.int("times").unwrap(), 2);
    assert_eq!(
        args.list("gaps").unwrap(),
        [
            Value::Duration(Duration::from_secs(60)),
            Value::Duration(Duration::from_secs(30))
        ]
    );
}
