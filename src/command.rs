//! Command interpreter
//!
//! Turns one trimmed line of client input into at most one routing
//! instruction plus a control signal. The grammar is parsed by the
//! pure [`Command::parse`]; recipient resolution and the active-users
//! snapshot go through the [`ConnectionRegistry`].

use chrono::Local;

use crate::registry::ConnectionRegistry;
use crate::router::RoutedMessage;
use crate::types::SessionId;

/// Control signal returned alongside each interpreted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading from this client
    Continue,
    /// End the session; the session announces the departure after
    /// leaving its read loop
    Terminate,
}

/// One parsed client line
///
/// Pure grammar only: no name resolution, no timestamps.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// `/exit`
    Exit,
    /// `/msg <name> <text...>` with both fields present
    Msg { to: &'a str, text: &'a str },
    /// `/msg ` with too few fields
    MsgUsage,
    /// `/active-users`
    ActiveUsers,
    /// Any other non-empty line: broadcast fallback
    Say(&'a str),
    /// Blank line, nothing to do
    Empty,
}

impl<'a> Command<'a> {
    /// Parse a trimmed input line. Longest-prefix rules first.
    pub fn parse(line: &'a str) -> Self {
        if line == "/exit" {
            return Command::Exit;
        }
        if line == "/active-users" {
            return Command::ActiveUsers;
        }
        if let Some(rest) = line.strip_prefix("/msg ") {
            let mut parts = rest.splitn(2, ' ');
            return match (parts.next(), parts.next()) {
                (Some(to), Some(text)) => Command::Msg { to, text },
                _ => Command::MsgUsage,
            };
        }
        if line.is_empty() {
            Command::Empty
        } else {
            Command::Say(line)
        }
    }
}

/// Interpret one trimmed line from a named client.
///
/// `/msg` recipients are resolved here, at submission time; the router
/// never re-resolves names. Malformed or unresolvable commands are
/// answered to the sender only and the session continues.
pub async fn interpret(
    line: &str,
    sender: SessionId,
    sender_name: &str,
    registry: &ConnectionRegistry,
) -> (Option<RoutedMessage>, Flow) {
    match Command::parse(line) {
        Command::Exit => (None, Flow::Terminate),
        Command::Empty => (None, Flow::Continue),
        Command::MsgUsage => {
            let text = format!("[{}] usage: /msg <name> <message>", stamp());
            (Some(RoutedMessage::direct(sender, text)), Flow::Continue)
        }
        Command::Msg { to, text } => match registry.lookup(to).await {
            Some(recipient) => {
                let text = format!("[{}] {}: {}", stamp(), sender_name, text);
                (
                    Some(RoutedMessage::direct_from(sender, recipient, text)),
                    Flow::Continue,
                )
            }
            None => {
                let text = format!("[{}] user {} is not available", stamp(), to);
                (Some(RoutedMessage::direct(sender, text)), Flow::Continue)
            }
        },
        Command::ActiveUsers => {
            let users = registry.snapshot().await;
            let text = format!("[{}] active users: {}", stamp(), users.join(", "));
            (Some(RoutedMessage::direct(sender, text)), Flow::Continue)
        }
        Command::Say(text) => {
            let text = format!("[{}] {}: {}", stamp(), sender_name, text);
            (
                Some(RoutedMessage::broadcast_from(sender, text)),
                Flow::Continue,
            )
        }
    }
}

/// `HH:MM` wall-clock stamp, taken at message construction time so
/// queueing delay in the router does not skew the displayed time.
fn stamp() -> String {
    Local::now().format("%H:%M").to_string()
}
