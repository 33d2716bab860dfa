use crate::models::{PerUserSnapshot, WindowShare};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Embed-shaped reply: an author line, one field per window, and a footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyCard {
    pub author: String,
    pub fields: Vec<CardField>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl TallyCard {
    /// Plain-text form for transports without rich embeds.
    pub fn to_text(&self) -> String {
        let mut text = self.author.clone();
        for field in &self.fields {
            text.push('\n');
            text.push_str(&field.name);
            text.push_str(": ");
            text.push_str(&field.value);
        }
        text.push('\n');
        text.push_str(&self.footer);
        text
    }
}

pub fn build_card(display_name: &str, snapshot: &PerUserSnapshot, at: DateTime<Utc>) -> TallyCard {
    TallyCard {
        author: format!("{display_name}'s Tally:"),
        fields: snapshot
            .windows()
            .into_iter()
            .map(|share| CardField {
                name: share.window.label().to_string(),
                value: share_line(share),
                inline: false,
            })
            .collect(),
        footer: format_footer(at),
    }
}

fn share_line(share: &WindowShare) -> String {
    format!("{} ({:.2}% of total)", format_thousands(share.count), share.percent)
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1/5/26, 3:07 PM UTC`
pub fn format_footer(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%y, %-I:%M %p UTC").to_string()
}
