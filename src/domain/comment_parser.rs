//! Comment-widget text parsing
//!
//! A rendered comment widget is one multi-line text block with a fixed
//! layout. Two shapes exist: with a leading bracketed tag line and without.
//! Both carry a fixed UI artifact line before the body and a fixed action
//! label as the last line; neither is comment content. Anything shorter than
//! five lines is unstructured and kept whole as the body.

use crate::domain::card::NewComment;

/// Parse one raw comment block into its structured parts.
pub fn parse_comment_block(raw: &str) -> NewComment {
    let lines: Vec<&str> = raw.split('\n').collect();

    if lines.len() < 5 {
        return NewComment {
            tag: String::new(),
            author: String::new(),
            posted_at: String::new(),
            body: raw.trim().to_string(),
        };
    }

    let (tag, author, posted_at, body_lines) =
        if lines[0].starts_with('[') && lines[0].ends_with(']') {
            (lines[0], lines[1], lines[2], &lines[4..lines.len() - 1])
        } else {
            ("", lines[0], lines[1], &lines[3..lines.len() - 1])
        };

    NewComment {
        tag: tag.to_string(),
        author: author.to_string(),
        posted_at: posted_at.to_string(),
        body: body_lines.join("\n").trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("just one line")]
    #[case("two\nlines")]
    #[case("  three\nshort\nlines  ")]
    #[case("a\nb\nc\nd")]
    fn test_short_blocks_kept_whole(#[case] raw: &str) {
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.tag, "");
        assert_eq!(parsed.author, "");
        assert_eq!(parsed.posted_at, "");
        assert_eq!(parsed.body, raw.trim());
    }

    #[test]
    fn test_tagged_block() {
        let raw = "[VIP]\nAlice\n2024-01-01\n0\nGreat item 5S\nReply";
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.tag, "[VIP]");
        assert_eq!(parsed.author, "Alice");
        assert_eq!(parsed.posted_at, "2024-01-01");
        assert_eq!(parsed.body, "Great item 5S");
    }

    #[test]
    fn test_untagged_block_drops_artifact_and_action_label() {
        let raw = "Bob\n2 часа назад\n12\nотдам за 3с\nОтветить";
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.tag, "");
        assert_eq!(parsed.author, "Bob");
        assert_eq!(parsed.posted_at, "2 часа назад");
        assert_eq!(parsed.body, "отдам за 3с");
    }

    #[test]
    fn test_multi_line_body_preserves_inner_breaks() {
        let raw = "[TOP]\nCarol\nвчера\n3\nпервая строка\nвторая строка\nОтветить";
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.body, "первая строка\nвторая строка");
    }

    #[test]
    fn test_exactly_five_lines_tagged_has_empty_body() {
        let raw = "[X]\nDave\nсегодня\n1\nОтветить";
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.tag, "[X]");
        assert_eq!(parsed.author, "Dave");
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_lone_open_bracket_is_not_a_tag() {
        let raw = "[\n2024-01-01\nx\ny\nz\nОтветить";
        let parsed = parse_comment_block(raw);
        assert_eq!(parsed.tag, "");
        assert_eq!(parsed.author, "[");
        assert_eq!(parsed.posted_at, "2024-01-01");
    }
}
