//! Post text layout: date line, location line, blank line, description.

use crate::event::Event;

pub const DATE_ICON: &str = "🗓️";
pub const LOCATION_ICON: &str = "📍";
/// Post length cap, counted in Unicode scalar values.
pub const MAX_POST_CHARS: usize = 280;
const ELLIPSIS: &str = "...";

pub fn compose_post_text(event: &Event) -> String {
    let header = format!(
        "{DATE_ICON} {}\n{LOCATION_ICON} {}\n\n",
        event.date, event.location
    );
    let text = format!("{header}{}", event.description);

    if text.chars().count() <= MAX_POST_CHARS {
        return text;
    }

    let ellipsis_len = ELLIPSIS.chars().count();
    let header_len = header.chars().count();

    if header_len + ellipsis_len <= MAX_POST_CHARS {
        let available = MAX_POST_CHARS - header_len - ellipsis_len;
        let description: String = event.description.chars().take(available).collect();
        return format!("{header}{description}{ELLIPSIS}");
    }

    // Date and location alone overflow the cap.
    let truncated: String = text.chars().take(MAX_POST_CHARS - ellipsis_len).collect();
    format!("{truncated}{ELLIPSIS}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(date: &str, location: &str, description: &str) -> Event {
        Event {
            title: "title".into(),
            description: description.into(),
            location: location.into(),
            date: date.into(),
            image_prompt: "prompt".into(),
        }
    }

    #[test]
    fn short_text_is_unchanged() {
        let text = compose_post_text(&event(
            "July 4, 1876",
            "Philadelphia, USA",
            "The bell rings twice.",
        ));
        assert_eq!(
            text,
            "🗓️ July 4, 1876\n📍 Philadelphia, USA\n\nThe bell rings twice."
        );
    }

    #[test]
    fn long_description_is_truncated_with_ellipsis() {
        let description = "a".repeat(300);
        let text = compose_post_text(&event("July 4, 1876", "Philadelphia, USA", &description));
        assert!(text.chars().count() <= MAX_POST_CHARS);
        assert_eq!(text.chars().count(), MAX_POST_CHARS);
        assert!(text.ends_with("..."));
        assert!(text.starts_with("🗓️ July 4, 1876\n📍 Philadelphia, USA\n\n"));
    }

    #[test]
    fn exactly_at_cap_is_not_truncated() {
        let header_len = "🗓️ D\n📍 L\n\n".chars().count();
        let description = "b".repeat(MAX_POST_CHARS - header_len);
        let text = compose_post_text(&event("D", "L", &description));
        assert_eq!(text.chars().count(), MAX_POST_CHARS);
        assert!(text.ends_with('b'));
    }

    #[test]
    fn multibyte_description_truncates_on_char_boundaries() {
        let description = "é".repeat(400);
        let text = compose_post_text(&event("May 1, 1900", "Lyon, France", &description));
        assert_eq!(text.chars().count(), MAX_POST_CHARS);
        assert!(text.ends_with("é..."));
    }

    #[test]
    fn oversized_header_still_respects_cap() {
        let location = "L".repeat(400);
        let text = compose_post_text(&event("May 1, 1900", &location, "short"));
        assert_eq!(text.chars().count(), MAX_POST_CHARS);
        assert!(text.ends_with("..."));
    }
}
