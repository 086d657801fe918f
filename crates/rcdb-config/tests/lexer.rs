//! Integration tests.

use proptest::prelude::*;
use rcdb_config::{tokenize_line, tokenize_line_without_comments, Lexer};

#[test]
fn splits_on_whitespace() {
    assert_eq!(tokenize_line("BLOCKLEVEL 1"), ["BLOCKLEVEL", "1"]);
    assert_eq!(
        tokenize_line("  TRIG_EQ\tPS   35 10  1  "),
        ["TRIG_EQ", "PS", "35", "10", "1"]
    );
}

#[test]
fn blank_lines_have_no_tokens() {
    assert!(tokenize_line("").is_empty());
    assert!(tokenize_line(" \t \r").is_empty());
}

#[test]
fn quoted_text_is_one_token() {
    assert_eq!(
        tokenize_line(r#"NAME "John Smith" 5"#),
        ["NAME", "John Smith", "5"]
    );
}

#[test]
fn quoted_and_bare_text_stick_together() {
    assert_eq!(tokenize_line(r#"John" Smith""#), ["John Smith"]);
    assert_eq!(tokenize_line(r#"John" "Smith"#), ["John Smith"]);
    assert_eq!(tokenize_line(r#"5.14"Smith""#), ["5.14Smith"]);
}

#[test]
fn escaped_quote_inside_string() {
    assert_eq!(
        tokenize_line(r#""say \"hi\"" next"#),
        [r#"say "hi""#, "next"]
    );
}

#[test]
fn only_quote_escape_is_recognised() {
    assert_eq!(tokenize_line(r#""a\\b\n""#), [r"a\\b\n"]);
    // outside a string the backslash is an ordinary character
    assert_eq!(tokenize_line(r#"a\"b c""#), [r"a\b c"]);
}

#[test]
fn unterminated_quote_keeps_collected_text() {
    assert_eq!(tokenize_line(r#"KEY "open value"#), ["KEY", "open value"]);
}

#[test]
fn trailing_comment_is_last_token() {
    assert_eq!(
        tokenize_line("FADC250_NSA 20 # samples after"),
        ["FADC250_NSA", "20", "# samples after"]
    );
    assert_eq!(
        tokenize_line("value#comment"),
        ["value", "#comment"]
    );
}

#[test]
fn discarded_comments_produce_nothing() {
    assert_eq!(
        tokenize_line_without_comments("FADC250_NSA 20 # samples after"),
        ["FADC250_NSA", "20"]
    );
    assert!(tokenize_line_without_comments("#abc").is_empty());
}

#[test]
fn whole_line_comment() {
    assert_eq!(tokenize_line("#abc"), ["#abc"]);
    assert_eq!(tokenize_line("# F1TDC_WINDOW 1000.0"), ["# F1TDC_WINDOW 1000.0"]);
}

#[test]
fn hash_inside_string_is_data() {
    assert_eq!(tokenize_line(r##"info "#4" 1"##), ["info", "#4", "1"]);
}

#[test]
fn lexer_builder_toggles_comments() {
    let lexer = Lexer::new();
    assert!(!lexer.discards_comments());
    let lexer = lexer.discard_comments(true);
    assert!(lexer.discards_comments());
    assert_eq!(lexer.tokenize("A B #c"), ["A", "B"]);
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.]{1,8}"
}

fn quoted() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.]{1,4}( [A-Za-z0-9_.]{1,4}){0,2}".prop_map(|inner| format!("\"{inner}\""))
}

fn separator() -> impl Strategy<Value = String> {
    "[ \t]{1,3}"
}

fn join_with(parts: &[(String, String)]) -> String {
    parts
        .iter()
        .map(|(part, separator)| format!("{part}{separator}"))
        .collect()
}

fn normalize(line: &str) -> String {
    tokenize_line(line).join(" ")
}

/// A raw column paired with the token it should produce.
fn column() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        word().prop_map(|w| (w.clone(), w)),
        quoted().prop_map(|q| (q.clone(), q.trim_matches('"').to_string())),
        (word(), word()).prop_map(|(a, b)| (format!("\"{a}\\\"{b}\""), format!("{a}\"{b}"))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn normalizing_twice_equals_normalizing_once(
        parts in prop::collection::vec((prop_oneof![word(), quoted()], separator()), 0..10)
    ) {
        let line = join_with(&parts);
        let once = normalize(&line);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn columns_tokenize_to_their_content(
        columns in prop::collection::vec((column(), separator()), 0..10)
    ) {
        let line: String = columns
            .iter()
            .map(|((raw, _), separator)| format!("{raw}{separator}"))
            .collect();
        let expected: Vec<&str> = columns.iter().map(|((_, token), _)| token.as_str()).collect();
        prop_assert_eq!(tokenize_line(&line), expected);
    }
}
