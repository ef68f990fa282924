//! Pure helpers deriving a text export and aggregate statistics from a
//! transcript.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::message::Role;
use crate::transcript::Transcript;

/// Returned by [`export_as_text`] for an empty transcript.
pub const EMPTY_EXPORT: &str = "No chat history to export.";

const EXPORT_TITLE: &str = "Sahayak Chat Export";

/// Minutes assumed per message when estimating session duration.
const MINUTES_PER_MESSAGE: u64 = 2;

/// Renders the transcript as numbered plain text, stamped with the current
/// local time. [`export_as_text_at`] is the pure core.
pub fn export_as_text(transcript: &Transcript) -> String {
    export_as_text_at(transcript, Local::now())
}

pub fn export_as_text_at(transcript: &Transcript, generated: DateTime<Local>) -> String {
    if transcript.is_empty() {
        return EMPTY_EXPORT.to_string();
    }

    let mut out = String::new();
    out.push_str(EXPORT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Generated on: {}\n",
        generated.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (i, message) in transcript.iter().enumerate() {
        let speaker = match message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
        };
        out.push_str(&format!("[{}] {speaker}:\n{}\n\n", i + 1, message.content));
        out.push_str(&"-".repeat(30));
        out.push_str("\n\n");
    }

    out
}

/// Aggregate counts over a transcript.
///
/// `estimated_duration_minutes` assumes two minutes per message; it is an
/// estimate, not measured wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatStatistics {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub avg_message_length: usize,
    pub estimated_duration_minutes: u64,
}

pub fn statistics(transcript: &Transcript) -> ChatStatistics {
    if transcript.is_empty() {
        return ChatStatistics::default();
    }

    let total_messages = transcript.len();
    let user_messages = transcript
        .iter()
        .filter(|m| m.role == Role::User)
        .count();
    let total_chars: usize = transcript.iter().map(|m| m.content.chars().count()).sum();

    ChatStatistics {
        total_messages,
        user_messages,
        assistant_messages: total_messages - user_messages,
        avg_message_length: total_chars / total_messages,
        estimated_duration_minutes: total_messages as u64 * MINUTES_PER_MESSAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use chrono::TimeZone;

    fn sample() -> Transcript {
        Transcript::with_messages(vec![
            Message::user("Help me plan my week"),
            Message::assistant("Block mornings for deep work."),
        ])
    }

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn empty_transcript_exports_sentinel() {
        assert_eq!(export_as_text(&Transcript::new()), EMPTY_EXPORT);
    }

    #[test]
    fn export_numbers_and_labels_messages() {
        let text = export_as_text_at(&sample(), fixed_clock());

        assert!(text.starts_with("Sahayak Chat Export\nGenerated on: 2025-03-14 09:26:53\n"));
        assert!(text.contains("[1] You:\nHelp me plan my week\n"));
        assert!(text.contains("[2] Assistant:\nBlock mornings for deep work.\n"));
        assert!(text.contains(&"-".repeat(30)));
    }

    #[test]
    fn export_is_pure_under_a_fixed_clock() {
        let transcript = sample();
        assert_eq!(
            export_as_text_at(&transcript, fixed_clock()),
            export_as_text_at(&transcript, fixed_clock())
        );
    }

    #[test]
    fn statistics_counts_roles_and_lengths() {
        let stats = statistics(&sample());
        assert_eq!(stats.total_messages, 2);
        assert_eq!(stats.user_messages, 1);
        assert_eq!(stats.assistant_messages, 1);
        // (20 + 29) / 2, integer-truncated.
        assert_eq!(stats.avg_message_length, 24);
        assert_eq!(stats.estimated_duration_minutes, 4);
    }

    #[test]
    fn statistics_of_empty_transcript_are_zero() {
        assert_eq!(statistics(&Transcript::new()), ChatStatistics::default());
    }
}
