//! Integration tests for the dispatch pipeline

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sigil_foundation::{Caller, Channel, DurationParser, Error, Result};
use sigil_parser::{
    CommandDef, DispatchResult, Dispatcher, IdListPredicate, Invocation, ParamSpec, Reply,
};
use sigil_storage::MemoryStore;

fn remind(inv: &Invocation<'_>) -> Result<Reply> {
    let delay = inv.args.duration("delay")?;
    let message = inv.args.text("message")?;
    Ok(Reply::text(format!("{}s: {message}", delay.as_secs())))
}

fn dispatcher() -> Dispatcher {
    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    builder
        .register_access_level_with("admin", 30, IdListPredicate::new(["boss"]))
        .unwrap()
        .register_command(
            CommandDef::new("remind")
                .param(ParamSpec::duration("delay"))
                .param(ParamSpec::text("message"))
                .handler(remind),
        )
        .unwrap()
        .register_command(
            CommandDef::new("remind")
                .param(ParamSpec::text("message"))
                .param(ParamSpec::constant("in"))
                .param(ParamSpec::duration("delay"))
                .handler(remind),
        )
        .unwrap()
        .register_command(
            CommandDef::new("ban")
                .param(ParamSpec::integer("hours"))
                .param(ParamSpec::text("who"))
                .access("admin")
                .handler(|inv: &Invocation<'_>| {
                    Ok(Reply::text(format!(
                        "{} banned for {}h",
                        inv.args.text("who")?,
                        inv.args.int("hours")?
                    )))
                }),
        )
        .unwrap()
        .register_command(
            CommandDef::new("fail")
                .handler(|_: &Invocation<'_>| Err(Error::handler("it broke"))),
        )
        .unwrap()
        .register_command(
            CommandDef::new("reload")
                .channels(Channel::Console)
                .handler(|_: &Invocation<'_>| Ok(Reply::Empty)),
        )
        .unwrap();
    builder.build().unwrap()
}

// =============================================================================
// Outcomes
// =============================================================================

#[test]
fn both_orderings_reach_the_handler() {
    let d = dispatcher();
    let anyone = Caller::new("u");
    assert_eq!(
        d.process("remind 5m4s stretch", &anyone, Channel::Public),
        DispatchResult::Ok(Reply::text("304s: stretch"))
    );
    assert_eq!(
        d.process("REMIND stretch legs in 10m", &anyone, Channel::Public),
        DispatchResult::Ok(Reply::text("600s: stretch legs"))
    );
}

#[test]
fn unknown_verb() {
    let d = dispatcher();
    assert_eq!(
        d.process("dance wildly", &Caller::new("u"), Channel::Public),
        DispatchResult::NoSuchCommand("dance".into())
    );
}

#[test]
fn blank_line() {
    let d = dispatcher();
    assert_eq!(
        d.process("   ", &Caller::new("u"), Channel::Public),
        DispatchResult::NoSuchCommand(String::new())
    );
}

#[test]
fn no_matching_signature_lists_every_usage() {
    let d = dispatcher();
    match d.process("remind", &Caller::new("u"), Channel::Public) {
        DispatchResult::NoMatchingSignature { verb, usage } => {
            assert_eq!(verb, "remind");
            assert_eq!(
                usage,
                [
                    "remind <delay:duration> <message>",
                    "remind <message> in <delay:duration>"
                ]
            );
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn usage_is_shown_regardless_of_privilege() {
    let d = dispatcher();
    assert!(matches!(
        d.process("ban", &Caller::new("u"), Channel::Public),
        DispatchResult::NoMatchingSignature { .. }
    ));
}

#[test]
fn unauthorized_hides_the_required_level() {
    let d = dispatcher();
    let result = d.process("ban 2 troll", &Caller::new("u"), Channel::Public);
    assert_eq!(result, DispatchResult::Unauthorized);
    assert!(!format!("{result:?}").contains("admin"));

    assert_eq!(
        d.process("ban 2 troll", &Caller::new("boss"), Channel::Public),
        DispatchResult::Ok(Reply::text("troll banned for 2h"))
    );
}

#[test]
fn authorization_happens_before_extraction() {
    let d = dispatcher();
    assert_eq!(
        d.process("ban 99999999999999999999 troll", &Caller::new("u"), Channel::Public),
        DispatchResult::Unauthorized
    );
}

#[test]
fn extraction_failure_names_the_parameter() {
    let d = dispatcher();
    match d.process("ban 99999999999999999999 troll", &Caller::new("boss"), Channel::Public) {
        DispatchResult::ExtractionFailed { param, .. } => assert_eq!(param, "hours"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn non_ascii_digits_match_the_next_candidate() {
    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    builder
        .register_command(
            CommandDef::new("roll")
                .param(ParamSpec::integer("sides"))
                .handler(|inv: &Invocation<'_>| Ok(Reply::text(format!("d{}", inv.args.int("sides")?)))),
        )
        .unwrap()
        .register_command(
            CommandDef::new("roll")
                .param(ParamSpec::text("expr"))
                .handler(|inv: &Invocation<'_>| Ok(Reply::text(inv.args.text("expr")?))),
        )
        .unwrap();
    let d = builder.build().unwrap();
    let anyone = Caller::new("u");

    assert_eq!(
        d.process("roll 6", &anyone, Channel::Public),
        DispatchResult::Ok(Reply::text("d6"))
    );
    assert_eq!(
        d.process("roll \u{0663}", &anyone, Channel::Public),
        DispatchResult::Ok(Reply::text("\u{0663}"))
    );
}

#[test]
fn handler_failure() {
    let d = dispatcher();
    assert_eq!(
        d.process("fail", &Caller::new("u"), Channel::Public),
        DispatchResult::HandlerFailed("it broke".into())
    );
}

#[test]
fn channel_restricted_command() {
    let d = dispatcher();
    let caller = Caller::new("u");
    assert!(matches!(
        d.process("reload", &caller, Channel::Private),
        DispatchResult::NoMatchingSignature { .. }
    ));
    assert!(d.process("reload", &caller, Channel::Console).is_ok());
}

#[test]
fn process_as_requires_sufficient_privilege() {
    let d = dispatcher();
    let boss = Caller::new("boss");
    let user = Caller::new("u");

    assert!(d.process_as("remind 1m x", &boss, &user, Channel::Public).is_ok());
    assert_eq!(
        d.process_as("ban 1 x", &user, &boss, Channel::Public),
        DispatchResult::Unauthorized
    );
    // The target's own level applies once impersonation is allowed.
    assert_eq!(
        d.process_as("ban 1 x", &boss, &user, Channel::Public),
        DispatchResult::Unauthorized
    );
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn unknown_access_label_fails_build() {
    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    builder
        .register_command(
            CommandDef::new("x")
                .access("wizard")
                .handler(|_: &Invocation<'_>| Ok(Reply::Empty)),
        )
        .unwrap();
    assert!(builder.build().is_err());
}

#[test]
fn bad_definition_fails_registration() {
    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    let err = builder
        .register_command(CommandDef::new("no handler"))
        .err()
        .unwrap();
    assert_eq!(err.context.and_then(|c| c.source).as_deref(), Some("no handler"));
}

/// Reads every duration as one hour.
struct HourParser;

impl DurationParser for HourParser {
    fn parse(&self, _text: &str) -> Option<Duration> {
        Some(Duration::from_secs(3_600))
    }
}

#[test]
fn duration_parser_is_injected() {
    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    builder
        .register_command(
            CommandDef::new("remind")
                .param(ParamSpec::duration("delay"))
                .param(ParamSpec::text("message"))
                .handler(remind),
        )
        .unwrap();
    let d = builder.with_duration_parser(Arc::new(HourParser)).build().unwrap();

    assert_eq!(
        d.process("remind 5m tea", &Caller::new("u"), Channel::Public),
        DispatchResult::Ok(Reply::text("3600s: tea"))
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut builder = Dispatcher::builder(Arc::new(MemoryStore::new()));
    builder
        .register_command(CommandDef::new("tick").handler(move |_: &Invocation<'_>| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(Reply::Empty)
        }))
        .unwrap();
    let d = builder.build().unwrap();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let d = &d;
            scope.spawn(move || {
                let caller = Caller::new(format!("t{t}"));
                for _ in 0..50 {
                    assert!(d.process("tick", &caller, Channel::Public).is_ok());
                }
            });
        }
    });
    assert_eq!(calls.load(Ordering::Relaxed), 200);
}
