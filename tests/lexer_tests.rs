//! Tests for the lexer through the public API.
//!
//! Covers the numeric literal sub-grammar, string escapes, trivia handling
//! and the probing helpers (`look_ahead`, `try_scan`, `scan_range`).

use pretty_assertions::assert_eq;
use protolint::error::{LexError, LexErrorKind};
use protolint::parser::{Lexer, SyntaxKind, TokenValue};

fn tokens(text: &str) -> Vec<(SyntaxKind, String)> {
    let mut lexer = Lexer::new(text, true);
    let mut out = Vec::new();
    loop {
        let kind = lexer.scan();
        if kind == SyntaxKind::EndOfFile {
            break;
        }
        out.push((kind, lexer.token_text().to_string()));
    }
    out
}

fn single(text: &str) -> (SyntaxKind, TokenValue, Vec<LexError>) {
    let mut lexer = Lexer::new(text, true);
    let kind = lexer.scan();
    let value = lexer.token_value().clone();
    (kind, value, lexer.errors().to_vec())
}

// =============================================================================
// Numeric literals
// =============================================================================

#[test]
fn test_float_literals() {
    for (text, expected) in [(".3210", 0.3210), ("123.456", 123.456), ("133e-1", 13.3), ("1.56E5", 156000.0)] {
        let (kind, value, errors) = single(text);
        assert_eq!(kind, SyntaxKind::FloatLiteral, "{}", text);
        let actual = value.as_f64().unwrap();
        assert!((actual - expected).abs() < 1e-9, "{} gave {}", text, actual);
        assert!(errors.is_empty());
    }
}

#[test]
fn test_integer_literals() {
    assert_eq!(single("1").0, SyntaxKind::DecimalLiteral);
    assert_eq!(single("1234").1, TokenValue::Integer(1234));
    assert_eq!(single("01243116"), (SyntaxKind::OctalLiteral, TokenValue::Integer(345678), vec![]));
    assert_eq!(single("0xDEADBEEF").1, TokenValue::Integer(3735928559));
    assert_eq!(single("0Xcafebabe"), (SyntaxKind::HexLiteral, TokenValue::Integer(3405691582), vec![]));
}

#[test]
fn test_dangling_exponent_is_soft() {
    let (kind, _, errors) = single("12e");
    assert_eq!(kind, SyntaxKind::FloatLiteral);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::DecimalDigitExpected);

    // The mantissa is not rolled back: nothing of `12e` is left to scan.
    let mut lexer = Lexer::new("12e;", true);
    lexer.scan();
    assert_eq!(lexer.token_text(), "12e");
    assert_eq!(lexer.scan(), SyntaxKind::Semicolon);
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_escapes() {
    let (kind, value, errors) = single(r#""\u05D0\u{1D306}\t\n\v\b\f\r\"\'\0""#);
    assert_eq!(kind, SyntaxKind::StringLiteral);
    assert!(errors.is_empty());
    let decoded = value.as_str().unwrap().to_string();
    let units: Vec<u16> = decoded.encode_utf16().take(3).collect();
    assert_eq!(units, vec![0x05D0, 0xD834, 0xDF06]);
    assert!(decoded.ends_with("\t\n\u{0B}\u{08}\u{0C}\r\"'\0"));
}

#[test]
fn test_unterminated_string_at_line_break() {
    let mut lexer = Lexer::new("\"abc\nmessage", true);
    assert_eq!(lexer.scan(), SyntaxKind::StringLiteral);
    assert!(lexer.is_unterminated());
    assert_eq!(lexer.token_value().as_str(), Some("abc"));
    assert_eq!(lexer.errors()[0].kind, LexErrorKind::UnterminatedString);
    assert_eq!(lexer.scan(), SyntaxKind::MessageKeyword);
    assert!(lexer.has_preceding_line_break());
}

#[test]
fn test_escape_out_of_range() {
    let (_, _, errors) = single(r#""\u{110000}""#);
    assert_eq!(errors[0].kind, LexErrorKind::EscapeOutOfRange);
}

// =============================================================================
// Trivia and keywords
// =============================================================================

#[test]
fn test_trivia_kept_when_not_skipping() {
    let mut lexer = Lexer::new("a // c\n/* d */ b", false);
    let mut kinds = Vec::new();
    loop {
        let kind = lexer.scan();
        if kind == SyntaxKind::EndOfFile {
            break;
        }
        kinds.push(kind);
    }
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::WhitespaceTrivia,
            SyntaxKind::SingleLineCommentTrivia,
            SyntaxKind::MultiLineCommentTrivia,
            SyntaxKind::WhitespaceTrivia,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let mut lexer = Lexer::new("/* open", false);
    assert_eq!(lexer.scan(), SyntaxKind::MultiLineCommentTrivia);
    assert!(lexer.is_unterminated());
    assert_eq!(lexer.errors()[0].kind, LexErrorKind::UnterminatedComment);
    assert_eq!(lexer.scan(), SyntaxKind::EndOfFile);
}

#[test]
fn test_statement_tokens() {
    assert_eq!(
        tokens("repeated .a.B b = 1 [packed=true];"),
        vec![
            (SyntaxKind::RepeatedKeyword, "repeated".to_string()),
            (SyntaxKind::Dot, ".".to_string()),
            (SyntaxKind::Identifier, "a".to_string()),
            (SyntaxKind::Dot, ".".to_string()),
            (SyntaxKind::Identifier, "B".to_string()),
            (SyntaxKind::Identifier, "b".to_string()),
            (SyntaxKind::Equals, "=".to_string()),
            (SyntaxKind::DecimalLiteral, "1".to_string()),
            (SyntaxKind::OpenBracket, "[".to_string()),
            (SyntaxKind::Identifier, "packed".to_string()),
            (SyntaxKind::Equals, "=".to_string()),
            (SyntaxKind::BooleanLiteral, "true".to_string()),
            (SyntaxKind::CloseBracket, "]".to_string()),
            (SyntaxKind::Semicolon, ";".to_string()),
        ]
    );
}

#[test]
fn test_invalid_character_reported_and_skipped() {
    let mut lexer = Lexer::new("a # b", true);
    assert_eq!(lexer.scan(), SyntaxKind::Identifier);
    assert_eq!(lexer.scan(), SyntaxKind::Unknown);
    assert_eq!(lexer.scan(), SyntaxKind::Identifier);
    assert_eq!(lexer.errors().len(), 1);
    assert_eq!(lexer.errors()[0].kind, LexErrorKind::InvalidCharacter);
}

#[test]
fn test_closure_sink() {
    let mut seen = Vec::new();
    {
        let mut lexer = Lexer::with_sink("'x", true, |e: LexError| seen.push(e.kind));
        lexer.scan();
    }
    assert_eq!(seen, vec![LexErrorKind::UnterminatedString]);
}

// =============================================================================
// Probes and determinism
// =============================================================================

#[test]
fn test_look_ahead_restores_everything() {
    let mut lexer = Lexer::new("a\n'oops b c", true);
    lexer.scan();
    let before = (lexer.token(), lexer.token_span(), lexer.errors().len());
    let probed = lexer.look_ahead(|l| {
        l.scan();
        l.scan();
        l.token()
    });
    assert_eq!(probed, SyntaxKind::EndOfFile);
    assert_eq!((lexer.token(), lexer.token_span(), lexer.errors().len()), before);
}

#[test]
fn test_try_scan_commits_on_some() {
    let mut lexer = Lexer::new("- 5 x", true);
    lexer.scan();
    let failed = lexer.try_scan(|l| (l.scan() == SyntaxKind::Identifier).then_some(()));
    assert_eq!(failed, None);
    assert_eq!(lexer.token(), SyntaxKind::Minus);
    let committed = lexer.try_scan(|l| (l.scan() == SyntaxKind::DecimalLiteral).then_some(()));
    assert_eq!(committed, Some(()));
    assert_eq!(lexer.token(), SyntaxKind::DecimalLiteral);
}

#[test]
fn test_scan_range_restores_outer_scan() {
    let text = "message Foo { }";
    let mut lexer = Lexer::new(text, true);
    lexer.scan();
    let inner = lexer.scan_range(8, 3, |l| {
        let kind = l.scan();
        (kind, l.token_text(), l.scan())
    });
    assert_eq!(inner, (SyntaxKind::Identifier, "Foo", SyntaxKind::EndOfFile));
    assert_eq!(lexer.token(), SyntaxKind::MessageKeyword);
    assert_eq!(lexer.scan(), SyntaxKind::Identifier);
}

#[test]
fn test_lexing_is_deterministic() {
    let text = "syntax = \"proto3\"; message A { int32 x = 0x1F; } /* tail";
    assert_eq!(tokens(text), tokens(text));
}

#[test]
fn test_closure_sink_never_sees_rolled_back_errors() {
    let mut seen = Vec::new();
    let mut lexer = Lexer::with_sink("a 0x b", true, |error: LexError| seen.push(error.kind));
    lexer.scan();
    let probed = lexer.look_ahead(|l| l.scan());
    assert_eq!(probed, SyntaxKind::HexLiteral);
    let failed = lexer.try_scan(|l| {
        l.scan();
        None::<()>
    });
    assert_eq!(failed, None);
    assert_eq!(lexer.token(), SyntaxKind::Identifier);
    drop(lexer);
    assert!(seen.is_empty());
}

#[test]
fn test_closure_sink_receives_committed_errors() {
    let mut seen = Vec::new();
    let mut lexer = Lexer::with_sink("0x 0x", true, |error: LexError| seen.push(error.kind));
    let committed = lexer.try_scan(|l| (l.scan() == SyntaxKind::HexLiteral).then_some(()));
    assert_eq!(committed, Some(()));
    lexer.scan();
    drop(lexer);
    assert_eq!(
        seen,
        vec![LexErrorKind::HexDigitExpected, LexErrorKind::HexDigitExpected]
    );
}

#[test]
fn test_scan_range_is_clamped_to_text() {
    let mut lexer = Lexer::new("abc", true);
    let past_end = lexer.scan_range(10, 2, |l| (l.scan(), l.token_text()));
    assert_eq!(past_end, (SyntaxKind::EndOfFile, ""));

    let huge = lexer.scan_range(1, usize::MAX, |l| (l.scan(), l.token_text()));
    assert_eq!(huge, (SyntaxKind::Identifier, "bc"));
}

#[test]
fn test_scan_range_moves_back_to_char_boundary() {
    let mut lexer = Lexer::new("aé b", true);
    let inner = lexer.scan_range(2, 10, |l| (l.scan(), l.token_text()));
    assert_eq!(inner, (SyntaxKind::Unknown, "é"));
    assert!(lexer.errors().is_empty());
    assert_eq!(lexer.scan(), SyntaxKind::Identifier);
    assert_eq!(lexer.token_text(), "a");
}
