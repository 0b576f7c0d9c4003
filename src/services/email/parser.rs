use chrono::Utc;
use mail_parser::Message;

/// Header extraction helpers over a parsed message
pub struct EmailParser;

impl EmailParser {
    /// Sender in display form: `Name <addr>` when a display name exists,
    /// bare address otherwise.
    pub fn parse_from_address(parsed: &Message) -> String {
        parsed
            .from()
            .and_then(|l| l.first())
            .map(|a| match (&a.name, &a.address) {
                (Some(name), Some(addr)) => format!("{} <{}>", name, addr),
                (None, Some(addr)) => addr.to_string(),
                (Some(name), None) => name.to_string(),
                (None, None) => String::new(),
            })
            .unwrap_or_default()
    }

    pub fn parse_subject(parsed: &Message) -> String {
        parsed.subject().unwrap_or("").to_string()
    }

    /// Date header as RFC 3339; falls back to the current time when absent.
    pub fn parse_date(parsed: &Message) -> String {
        parsed
            .date()
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| Utc::now().to_rfc3339())
    }

    pub fn parse_message_id(parsed: &Message) -> String {
        parsed.message_id().unwrap_or("").to_string()
    }
}
