use crate::models::Message;
use crate::slack::{ConversationMap, UserMap};
use crate::switches::DateFormat;

/// Renders messages as a plain-text transcript, resolving user and channel IDs
/// to their display names.
pub struct Slack<'a> {
    users: &'a UserMap,
    conversations: &'a ConversationMap,
    date_format: DateFormat,
}

impl<'a> Slack<'a> {
    pub fn new(
        users: &'a UserMap,
        conversations: &'a ConversationMap,
        date_format: DateFormat,
    ) -> Self {
        Self {
            users,
            conversations,
            date_format,
        }
    }

    /// Format `messages`, which must already be oldest first.
    pub fn format_messages(&self, messages: &[Message]) -> String {
        let mut out = String::new();
        for message in messages {
            out.push_str(&self.format_message(message));
            out.push('\n');
        }
        out
    }

    pub fn format_message(&self, message: &Message) -> String {
        let mut line = format!(
            "[{}] {}: {}",
            self.date_format.format_ts(&message.ts),
            self.sender_name(message),
            self.substitute_references(&message.text)
        );

        for file in message.files.iter().flatten() {
            line.push_str("\n    [file] ");
            line.push_str(file.display_name());
        }

        line
    }

    /// Display name of the sender, falling back to the bot name, then the raw ID.
    pub fn sender_name(&self, message: &Message) -> String {
        if let Some(user) = message.user_id() {
            if let Some(name) = self.users.get(user) {
                return name.clone();
            }
            if let Some(bot) = message.bot_name() {
                return bot.to_string();
            }
            return user.to_string();
        }
        message.bot_name().unwrap_or("unknown").to_string()
    }

    /// Replace `<@U..>`, `<#C..>`, `<!here>` and `<url|label>` markup with readable text.
    pub fn substitute_references(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some((before, after)) = rest.split_once('<') {
            let Some((inner, tail)) = after.split_once('>') else {
                break;
            };
            out.push_str(before);
            out.push_str(&self.resolve_reference(inner));
            rest = tail;
        }
        out.push_str(rest);

        unescape(&out)
    }

    fn resolve_reference(&self, inner: &str) -> String {
        let (target, label) = match inner.split_once('|') {
            Some((target, label)) => (target, Some(label).filter(|l| !l.is_empty())),
            None => (inner, None),
        };

        if let Some(id) = target.strip_prefix('@') {
            return match (self.users.get(id), label) {
                (Some(name), _) => format!("@{}", name),
                (None, Some(label)) => format!("@{}", label.trim_start_matches('@')),
                (None, None) => format!("@{}", id),
            };
        }

        if let Some(id) = target.strip_prefix('#') {
            return match (self.conversations.get(id), label) {
                (Some(name), _) => name.clone(),
                (None, Some(label)) => format!("#{}", label.trim_start_matches('#')),
                (None, None) => format!("#{}", id),
            };
        }

        if let Some(command) = target.strip_prefix('!') {
            return match label {
                Some(label) => label.to_string(),
                None => format!("@{}", command),
            };
        }

        match label {
            Some(label) if label != target => format!("{} ({})", label, target),
            _ => target.to_string(),
        }
    }
}

/// Slack escapes only these three characters in message text.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
