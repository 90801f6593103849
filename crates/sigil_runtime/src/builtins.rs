//! Built-in access levels and operator commands.
//!
//! | Command                                  | Level    |
//! |------------------------------------------|----------|
//! | `help [verb]`                            | general  |
//! | `whoami`                                 | general  |
//! | `as <caller> <line>`                     | general  |
//! | `remind <delay> <message>`               | general  |
//! | `remind <message> in <delay>`            | general  |
//! | `sum <n>...`                             | general  |
//! | `alias list`, `alias show <name>`        | general  |
//! | `alias add <name> <target> [--force]`    | operator |
//! | `alias remove <name>`                    | operator |
//! | `grant <caller> admin\|operator`         | owner    |
//! | `revoke <caller>`                        | owner    |
//! | `command enable\|disable <verb> [sub]`   | owner    |

use std::sync::Arc;

use sigil_foundation::{Caller, Error, Result, Value, format_duration};
use sigil_parser::{
    AliasChange, Arguments, CommandDef, DispatcherBuilder, GrantPredicate, Handler, IdListPredicate,
    Invocation, ParamSpec, Reply,
};
use sigil_storage::GrantStore;

use crate::render::render;

/// Most privileged level, held by configured caller ids.
pub const OWNER: &str = "owner";
/// Grant-backed level for managing the bot.
pub const ADMIN: &str = "admin";
/// Grant-backed level for managing aliases.
pub const OPERATOR: &str = "operator";

/// Registers the built-in levels and commands.
///
/// # Errors
///
/// Returns an error if a registration conflicts with an existing one.
pub fn register(
    builder: &mut DispatcherBuilder,
    grants: &Arc<dyn GrantStore>,
    owners: &[String],
) -> Result<()> {
    register_levels(builder, grants, owners)?;
    register_commands(builder, grants)
}

/// Registers `owner`, `admin`, and `operator`.
///
/// # Errors
///
/// Returns an error if one of the labels is already registered.
pub fn register_levels(
    builder: &mut DispatcherBuilder,
    grants: &Arc<dyn GrantStore>,
    owners: &[String],
) -> Result<()> {
    builder
        .register_access_level_with(OWNER, 10, IdListPredicate::new(owners.iter().cloned()))?
        .register_access_level_with(ADMIN, 20, GrantPredicate::new(grants.clone(), ADMIN))?
        .register_access_level_with(OPERATOR, 30, GrantPredicate::new(grants.clone(), OPERATOR))?;
    Ok(())
}

/// A single whitespace-free token.
fn word(name: &str) -> Result<ParamSpec> {
    ParamSpec::pattern(name, r"(\S+)", 1)
}

fn word_arg<'a>(args: &'a Arguments, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_groups)
        .and_then(|groups| groups.first())
        .and_then(Option::as_deref)
        .ok_or_else(|| Error::invalid_value(name, "missing"))
}

/// Registers the built-in commands.
///
/// # Errors
///
/// Returns an error if a definition does not compile.
#[allow(clippy::too_many_lines)]
pub fn register_commands(builder: &mut DispatcherBuilder, grants: &Arc<dyn GrantStore>) -> Result<()> {
    builder
        .register_command(
            CommandDef::new("help")
                .param(word("verb")?.optional())
                .describe("list commands, or show usage for one")
                .handler(help),
        )?
        .register_command(
            CommandDef::new("whoami")
                .describe("show who you are and your access level")
                .handler(|inv: &Invocation<'_>| {
                    Ok(Reply::text(format!(
                        "{} ({}) is {} on {}",
                        inv.caller.name,
                        inv.caller.id,
                        inv.level.label(),
                        inv.channel
                    )))
                }),
        )?
        .register_command(
            CommandDef::new("as")
                .param(word("caller")?)
                .param(ParamSpec::text("line"))
                .describe("run a command as another caller")
                .handler(|inv: &Invocation<'_>| {
                    let target = Caller::new(word_arg(&inv.args, "caller")?);
                    let line = inv.args.text("line")?;
                    let result = inv
                        .dispatcher
                        .process_as(line, inv.caller, &target, inv.channel);
                    Ok(Reply::Pages(render(&result)))
                }),
        )?;

    let remind: Arc<dyn Handler> = Arc::new(|inv: &Invocation<'_>| {
        let delay = inv.args.duration("delay")?;
        let message = inv.args.text("message")?;
        Ok(Reply::text(format!(
            "reminder set for {}: {message}",
            format_duration(delay)
        )))
    });
    builder
        .register_command(
            CommandDef::new("remind")
                .param(ParamSpec::duration("delay"))
                .param(ParamSpec::text("message"))
                .describe("set a reminder")
                .handler_object(remind.clone()),
        )?
        .register_command(
            CommandDef::new("remind")
                .param(ParamSpec::text("message"))
                .param(ParamSpec::constant("in"))
                .param(ParamSpec::duration("delay"))
                .describe("set a reminder")
                .handler_object(remind),
        )?
        .register_command(
            CommandDef::new("sum")
                .param(ParamSpec::repeated(ParamSpec::integer("n"))?)
                .describe("add up whole numbers")
                .handler(|inv: &Invocation<'_>| {
                    let mut total: i64 = 0;
                    for value in inv.args.list("n")? {
                        let n = value.as_int().unwrap_or_default();
                        total = total
                            .checked_add(n)
                            .ok_or_else(|| Error::handler("sum is too large"))?;
                    }
                    Ok(Reply::text(total.to_string()))
                }),
        )?;

    register_alias_commands(builder)?;

    let grant_store = grants.clone();
    let revoke_store = grants.clone();
    builder
        .register_command(
            CommandDef::new("grant")
                .param(word("caller")?)
                .param(ParamSpec::choice(&[ADMIN, OPERATOR]))
                .access(OWNER)
                .describe("grant an access level")
                .handler(move |inv: &Invocation<'_>| {
                    let caller = word_arg(&inv.args, "caller")?;
                    let level = inv.args.text(&format!("{ADMIN}|{OPERATOR}"))?;
                    grant_store.put_grant(caller, level)?;
                    tracing::info!(by = %inv.caller.id, caller, level, "access granted");
                    Ok(Reply::text(format!("{caller} is now {level}")))
                }),
        )?
        .register_command(
            CommandDef::new("revoke")
                .param(word("caller")?)
                .access(OWNER)
                .describe("remove a caller's granted level")
                .handler(move |inv: &Invocation<'_>| {
                    let caller = word_arg(&inv.args, "caller")?;
                    if revoke_store.revoke(caller)? {
                        tracing::info!(by = %inv.caller.id, caller, "access revoked");
                        Ok(Reply::text(format!("{caller} no longer has a granted level")))
                    } else {
                        Ok(Reply::text(format!("{caller} had no granted level")))
                    }
                }),
        )?;

    let toggle: Arc<dyn Handler> = Arc::new(|inv: &Invocation<'_>| {
        let verb = word_arg(&inv.args, "verb")?.to_lowercase();
        let sub = inv
            .args
            .get("sub")
            .and_then(Value::as_groups)
            .and_then(|groups| groups.first().cloned().flatten());
        let enable = inv.sub_verb == Some("enable");

        if verb == "command" {
            return Err(Error::handler("the command verb cannot be toggled"));
        }
        if !inv.dispatcher.registry().contains(&verb) {
            return Ok(Reply::text(format!("unknown command: {verb}")));
        }

        let changed = inv
            .dispatcher
            .registry()
            .set_enabled(&verb, sub.as_deref(), enable);
        let state = if enable { "enabled" } else { "disabled" };
        Ok(Reply::text(format!("{changed} signature(s) of {verb} {state}")))
    });
    for sub_verb in ["enable", "disable"] {
        builder.register_command(
            CommandDef::new("command")
                .sub_verb(sub_verb)
                .param(word("verb")?)
                .param(word("sub")?.optional())
                .access(OWNER)
                .describe("turn a command on or off")
                .handler_object(toggle.clone()),
        )?;
    }

    Ok(())
}

fn register_alias_commands(builder: &mut DispatcherBuilder) -> Result<()> {
    builder
        .register_command(
            CommandDef::new("alias")
                .sub_verb("add")
                .param(word("name")?)
                .param(ParamSpec::text("target"))
                .param(ParamSpec::flags(&["force"]))
                .access(OPERATOR)
                .describe("define a shortcut")
                .handler(|inv: &Invocation<'_>| {
                    let name = word_arg(&inv.args, "name")?;
                    let target = inv.args.text("target")?;
                    let force = inv.args.flag("flags", "force")?;
                    let reply = match inv.dispatcher.aliases().add(name, target, force)? {
                        AliasChange::Added => format!("alias {name} added"),
                        AliasChange::Updated => format!("alias {name} updated"),
                        AliasChange::Unchanged(existing) => format!(
                            "alias {name} already expands to '{}'; use --force to replace it",
                            existing.target
                        ),
                    };
                    Ok(Reply::Text(reply))
                }),
        )?
        .register_command(
            CommandDef::new("alias")
                .sub_verb("remove")
                .param(word("name")?)
                .access(OPERATOR)
                .describe("remove a shortcut")
                .handler(|inv: &Invocation<'_>| {
                    let name = word_arg(&inv.args, "name")?;
                    if inv.dispatcher.aliases().remove(name)? {
                        Ok(Reply::text(format!("alias {name} removed")))
                    } else {
                        Ok(Reply::text(format!("no alias named {name}")))
                    }
                }),
        )?
        .register_command(
            CommandDef::new("alias")
                .sub_verb("list")
                .describe("list shortcuts")
                .handler(|inv: &Invocation<'_>| {
                    let aliases = inv.dispatcher.aliases().list()?;
                    if aliases.is_empty() {
                        return Ok(Reply::text("no aliases defined"));
                    }
                    Ok(Reply::Pages(
                        aliases
                            .into_iter()
                            .map(|a| format!("{} -> {}", a.alias, a.target))
                            .collect(),
                    ))
                }),
        )?
        .register_command(
            CommandDef::new("alias")
                .sub_verb("show")
                .param(word("name")?)
                .describe("show what a shortcut expands to")
                .handler(|inv: &Invocation<'_>| {
                    let name = word_arg(&inv.args, "name")?;
                    Ok(Reply::Text(match inv.dispatcher.aliases().show(name)? {
                        Some(record) => format!("{} -> {}", record.alias, record.target),
                        None => format!("no alias named {name}"),
                    }))
                }),
        )?;
    Ok(())
}

fn help(inv: &Invocation<'_>) -> Result<Reply> {
    let registry = inv.dispatcher.registry();
    let verb = inv
        .args
        .get("verb")
        .and_then(Value::as_groups)
        .and_then(|groups| groups.first().cloned().flatten());

    match verb {
        None => Ok(Reply::text(format!(
            "commands: {}",
            registry.verbs().join(", ")
        ))),
        Some(verb) if registry.contains(&verb) => Ok(Reply::Pages(registry.usage(&verb))),
        Some(verb) => Ok(Reply::text(format!("unknown command: {verb}"))),
    }
}
