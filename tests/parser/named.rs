//! Integration tests for `--key=value` and `--flag` arguments

use std::collections::BTreeMap;

use sigil_foundation::Value;
use sigil_parser::{
    CommandDef, DispatchResult, Dispatcher, ExtractContext, ParamSpec, SignatureCompiler,
};
use sigil_storage::MemoryStore;

use crate::{noop, value};

fn key_values(pairs: &[(&str, &str)]) -> Value {
    Value::KeyValues(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn flags(pairs: &[(&str, bool)]) -> Value {
    Value::Flags(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect::<BTreeMap<_, _>>(),
    )
}

// =============================================================================
// Key-value arguments
// =============================================================================

#[test]
fn key_values_in_any_order() {
    let expected = key_values(&[("a", "1"), ("b", "2"), ("c", "3")]);
    for input in ["--a=1 --b=2 --c=3", "--c=3 --a=1 --b=2", "--b=2 --c=3 --a=1"] {
        assert_eq!(
            value(ParamSpec::key_values(&["a", "b", "c"]), input),
            Some(expected.clone()),
            "input: {input}"
        );
    }
}

#[test]
fn missing_keys_are_empty() {
    assert_eq!(
        value(ParamSpec::key_values(&["a", "b", "c"]), "--b=2"),
        Some(key_values(&[("a", ""), ("b", "2"), ("c", "")]))
    );
    assert_eq!(
        value(ParamSpec::key_values(&["a", "b", "c"]), ""),
        Some(key_values(&[("a", ""), ("b", ""), ("c", "")]))
    );
}

#[test]
fn multi_word_values_run_to_next_key() {
    assert_eq!(
        value(
            ParamSpec::key_values(&["title", "body"]),
            "--title=hello there --body=general kenobi"
        ),
        Some(key_values(&[("body", "general kenobi"), ("title", "hello there")]))
    );
}

#[test]
fn undeclared_keys_are_plain_text() {
    assert_eq!(
        value(ParamSpec::key_values(&["a"]), "--a=1 --z=9"),
        Some(key_values(&[("a", "1 --z=9")]))
    );
    assert_eq!(value(ParamSpec::key_values(&["a"]), "--z=9 --a=1"), None);
}

// =============================================================================
// Flags
// =============================================================================

#[test]
fn flags_present_and_absent() {
    assert_eq!(
        value(ParamSpec::flags(&["a", "b", "c"]), "--a --b"),
        Some(flags(&[("a", true), ("b", true), ("c", false)]))
    );
    assert_eq!(
        value(ParamSpec::flags(&["a", "b", "c"]), ""),
        Some(flags(&[("a", false), ("b", false), ("c", false)]))
    );
}

#[test]
fn flag_order_does_not_matter() {
    assert_eq!(
        value(ParamSpec::flags(&["a", "b"]), "--b --a"),
        value(ParamSpec::flags(&["a", "b"]), "--a --b")
    );
}

// =============================================================================
// Named arguments after positionals
// =============================================================================

#[test]
fn named_arguments_follow_free_text() {
    let signature = SignatureCompiler::compile(
        CommandDef::new("note")
            .param(ParamSpec::text("body"))
            .param(ParamSpec::flags(&["pin"]))
            .param(ParamSpec::key_values(&["tag"]))
            .handler(noop),
    )
    .unwrap();

    let args = signature
        .try_match(" buy milk --tag=errands today --pin")
        .unwrap()
        .extract(&ExtractContext::default())
        .unwrap();
    assert_eq!(args.text("body").unwrap(), "buy milk");
    assert!(args.flag("flags", "pin").unwrap());
    assert_eq!(args.key("options", "tag").unwrap(), "errands today");
}

#[test]
fn undeclared_keys_stay_in_free_text() {
    let signature = SignatureCompiler::compile(
        CommandDef::new("file")
            .param(ParamSpec::text("target"))
            .param(ParamSpec::key_values(&["due"]))
            .param(ParamSpec::flags(&["force"]))
            .handler(noop),
    )
    .unwrap();
    let extract = |rest: &str| {
        signature
            .try_match(rest)
            .unwrap()
            .extract(&ExtractContext::default())
            .unwrap()
    };

    let args = extract(" report lamp --owner=sam");
    assert_eq!(args.text("target").unwrap(), "report lamp --owner=sam");
    assert_eq!(args.key("options", "due").unwrap(), "");
    assert!(!args.flag("flags", "force").unwrap());

    let args = extract(" report lamp --owner=sam --force --due=friday");
    assert_eq!(args.text("target").unwrap(), "report lamp --owner=sam");
    assert_eq!(args.key("options", "due").unwrap(), "friday");
    assert!(args.flag("flags", "force").unwrap());
}

#[test]
fn positional_after_named_is_rejected() {
    let result = SignatureCompiler::compile(
        CommandDef::new("bad")
            .param(ParamSpec::flags(&["x"]))
            .param(ParamSpec::integer("n"))
            .handler(noop),
    );
    assert!(result.is_err());
}

#[test]
fn flags_through_the_dispatcher() {
    let mut builder = Dispatcher::builder(std::sync::Arc::new(MemoryStore::new()));
    builder
        .register_command(
            CommandDef::new("say")
                .param(ParamSpec::text("words"))
                .param(ParamSpec::flags(&["loud"]))
                .handler(|inv: &sigil_parser::Invocation<'_>| {
                    let words = inv.args.text("words")?;
                    Ok(sigil_parser::Reply::text(if inv.args.flag("flags", "loud")? {
                        words.to_uppercase()
                    } else {
                        words.to_string()
                    }))
                }),
        )
        .unwrap();
    let dispatcher = builder.build().unwrap();
    let caller = sigil_foundation::Caller::new("u");

    assert_eq!(
        dispatcher.process("say hi there --loud", &caller, sigil_foundation::Channel::Public),
        DispatchResult::Ok(sigil_parser::Reply::text("HI THERE"))
    );
}
