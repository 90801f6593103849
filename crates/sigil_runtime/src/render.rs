//! Turns dispatch results into outbound message lines.

use sigil_parser::{DispatchResult, Reply};

/// Renders `result` as zero or more messages.
///
/// Multi-page replies are numbered `(n/m)`. Failures render fixed messages
/// that never reveal which access level a command requires.
#[must_use]
pub fn render(result: &DispatchResult) -> Vec<String> {
    match result {
        DispatchResult::Ok(reply) => render_reply(reply),
        DispatchResult::NoSuchCommand(verb) if verb.is_empty() => Vec::new(),
        DispatchResult::NoSuchCommand(verb) => vec![format!("unknown command: {verb}")],
        DispatchResult::NoMatchingSignature { verb, usage } => {
            let mut lines = vec![format!("usage for {verb}:")];
            lines.extend(usage.iter().map(|line| format!("  {line}")));
            lines
        }
        DispatchResult::Unauthorized => {
            vec!["you do not have access to that command".to_string()]
        }
        DispatchResult::ExtractionFailed { param, cause } if param.is_empty() => {
            vec![format!("invalid argument: {cause}")]
        }
        DispatchResult::ExtractionFailed { param, cause } => {
            vec![format!("invalid value for {param}: {cause}")]
        }
        DispatchResult::HandlerFailed(message) => vec![format!("command failed: {message}")],
    }
}

/// Renders a handler reply.
#[must_use]
pub fn render_reply(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Text(text) => vec![text.clone()],
        Reply::Pages(pages) if pages.len() <= 1 => pages.clone(),
        Reply::Pages(pages) => {
            let total = pages.len();
            pages
                .iter()
                .enumerate()
                .map(|(i, page)| format!("({}/{total}) {page}", i + 1))
                .collect()
        }
        Reply::Empty => Vec::new(),
    }
}

/// Returns true if `result` should be shown as an error.
#[must_use]
pub fn is_failure(result: &DispatchResult) -> bool {
    match result {
        DispatchResult::Ok(_) => false,
        DispatchResult::NoSuchCommand(verb) => !verb.is_empty(),
        _ => true,
    }
}
