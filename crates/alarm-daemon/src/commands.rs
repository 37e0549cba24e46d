//! Operator chat commands: `/help`, `/status`, `/arm`, `/disarm`.
//!
//! Only chats listed as recipients may issue commands. Anything else that
//! arrives as a chat update is logged and dropped.

use alarm_notify::telegram::Update;
use alarm_notify::templates;
use tracing::{debug, info, warn};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Arm,
    Disarm,
}

/// What the daemon did with one chat update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Command executed; `replied` is false when the reply could not be sent.
    Executed { command: Command, replied: bool },
    /// Sender's chat is not an authorized recipient.
    Unauthorized { chat_id: String },
    /// Not a message, no text, or not a known command.
    Ignored,
}

/// Parse `/cmd`, `/cmd@BotName` and `/cmd args...`. Case-insensitive.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);

    match name.to_ascii_lowercase().as_str() {
        "help" | "start" => Some(Command::Help),
        "status" => Some(Command::Status),
        "arm" => Some(Command::Arm),
        "disarm" => Some(Command::Disarm),
        _ => None,
    }
}

pub async fn handle_update(st: &AppState, update: Update) -> CommandOutcome {
    let Some(message) = update.message else {
        debug!(update_id = update.update_id, "non-message update ignored");
        return CommandOutcome::Ignored;
    };

    let chat_id = message.chat.id.to_string();
    let Some(command) = message.text.as_deref().and_then(parse_command) else {
        debug!(chat_id = %chat_id, "unrecognized chat message ignored");
        return CommandOutcome::Ignored;
    };

    if !st.is_recipient(&chat_id) {
        warn!(chat_id = %chat_id, ?command, "command from unauthorized chat rejected");
        return CommandOutcome::Unauthorized { chat_id };
    }

    info!(chat_id = %chat_id, ?command, "operator command");

    let reply = match command {
        Command::Help => {
            let user = message
                .from
                .as_ref()
                .map(|u| u.first_name.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or("there");
            templates::help_reply(&st.bot_name, user)
        }
        Command::Status => status_text(st).await,
        Command::Arm => {
            st.arm().await;
            templates::arm_reply().to_string()
        }
        Command::Disarm => {
            st.disarm().await;
            templates::disarm_reply().to_string()
        }
    };

    let send = st.notifier.reply(&chat_id, &reply, message.message_id);
    let replied = match tokio::time::timeout(st.io_timeout, send).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(chat_id = %chat_id, error = %format!("{e:#}"), "command reply failed");
            false
        }
        Err(_) => {
            warn!(chat_id = %chat_id, timeout = ?st.io_timeout, "command reply timed out");
            false
        }
    };

    CommandOutcome::Executed { command, replied }
}

async fn status_text(st: &AppState) -> String {
    let system = st.system_status().await;
    let sensors: Vec<_> = {
        let reg = st.registry.lock().await;
        reg.all_entries()
            .into_iter()
            .map(|r| (r.location, r.state))
            .collect()
    };
    templates::status_reply(system, &sensors)
}
