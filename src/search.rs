use crate::model::Note;
use regex::Regex;

/// Project rich-text markup to plain text: drop tags, decode the entities the
/// editor emits. Approximates reading `textContent` off a rendered node.
pub fn strip_markup(markup: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    let text = tag_re.replace_all(markup, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Case-insensitive containment on the title or the stripped content.
/// `term` must already be lowercased by the caller.
pub fn note_matches(note: &Note, term: &str) -> bool {
    note.title.to_lowercase().contains(term)
        || strip_markup(&note.content).to_lowercase().contains(term)
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, content: &str) -> Note {
        let mut n = Note::blank("note_1".to_string());
        n.title = title.to_string();
        n.content = content.to_string();
        n
    }

    #[test]
    fn test_strip_markup_removes_tags() {
        assert_eq!(
            strip_markup("<p>hello <b>world</b></p>"),
            "hello world"
        );
        assert_eq!(strip_markup("plain text"), "plain text");
        assert_eq!(strip_markup("<img src=\"x.png\">"), "");
    }

    #[test]
    fn test_strip_markup_decodes_entities() {
        assert_eq!(strip_markup("a&nbsp;b &amp; c"), "a b & c");
        assert_eq!(strip_markup("&lt;tag&gt;"), "<tag>");
        assert_eq!(strip_markup("it&#39;s &quot;ok&quot;"), "it's \"ok\"");
    }

    #[test]
    fn test_note_matches_title_case_insensitive() {
        let n = note("Groceries", "");
        assert!(note_matches(&n, "grocer"));
        assert!(!note_matches(&n, "work"));
    }

    #[test]
    fn test_note_matches_stripped_content_not_markup() {
        let n = note("", "<div>Buy <b>Milk</b></div>");
        assert!(note_matches(&n, "buy milk"));
        // Tag names must not be searchable.
        assert!(!note_matches(&n, "div"));
    }
}
