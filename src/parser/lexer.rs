use crate::error::{LexError, LexErrorKind};
use crate::span::Span;

use super::token::{identifier_kind, SyntaxKind};

/// Receives soft lexical errors. Scanning never stops because of one.
///
/// Errors met inside a probe are held back by the lexer and only reach the
/// sink once the probe commits, so a sink never sees a rolled-back error.
pub trait ErrorSink {
    fn report(&mut self, error: LexError);
}

impl ErrorSink for Vec<LexError> {
    fn report(&mut self, error: LexError) {
        self.push(error);
    }
}

impl<F: FnMut(LexError)> ErrorSink for F {
    fn report(&mut self, error: LexError) {
        self(error)
    }
}

/// Decoded value of the current token.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    #[default]
    None,
    /// Identifier text or the unescaped contents of a string literal.
    Text(String),
    Integer(u64),
    Float(f64),
    Boolean(bool),
}

impl TokenValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TokenValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TokenValue::Float(n) => Some(*n),
            TokenValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Everything `scan` mutates. Probes save and restore it whole.
#[derive(Debug, Clone)]
struct ScanState {
    pos: usize,
    end: usize,
    /// Position before any trivia skipped for the current token.
    full_start: usize,
    token_pos: usize,
    token: SyntaxKind,
    value: TokenValue,
    preceding_line_break: bool,
    unterminated: bool,
}

/// Saved lexer state, restored by [`Lexer::restore`].
#[derive(Debug, Clone)]
pub struct LexerSnapshot {
    state: ScanState,
    pending: usize,
}

/// On-demand tokenizer for `.proto` source text.
///
/// Offsets are byte offsets into the text. With `skip_trivia` set, whitespace,
/// newlines and comments are consumed silently; line breaks among them still
/// set [`Lexer::has_preceding_line_break`].
pub struct Lexer<'a, S: ErrorSink = Vec<LexError>> {
    text: &'a str,
    skip_trivia: bool,
    state: ScanState,
    sink: S,
    /// Errors reported while a probe is open.
    pending: Vec<LexError>,
    probes: usize,
}

impl<'a> Lexer<'a, Vec<LexError>> {
    pub fn new(text: &'a str, skip_trivia: bool) -> Self {
        Lexer::with_sink(text, skip_trivia, Vec::new())
    }

    /// Errors reported so far.
    pub fn errors(&self) -> &[LexError] {
        &self.sink
    }
}

impl<'a, S: ErrorSink> Lexer<'a, S> {
    pub fn with_sink(text: &'a str, skip_trivia: bool, sink: S) -> Self {
        Lexer {
            text,
            skip_trivia,
            state: ScanState {
                pos: 0,
                end: text.len(),
                full_start: 0,
                token_pos: 0,
                token: SyntaxKind::Unknown,
                value: TokenValue::None,
                preceding_line_break: false,
                unterminated: false,
            },
            sink,
            pending: Vec::new(),
            probes: 0,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Restrict scanning to `start..start + length` and rewind to `start`.
    ///
    /// Both bounds are clamped to the text and moved back onto character
    /// boundaries.
    pub fn set_text_range(&mut self, start: usize, length: usize) {
        let start = floor_char_boundary(self.text, start);
        self.state.end = floor_char_boundary(self.text, start.saturating_add(length));
        self.set_text_position(start);
    }

    /// Rewind to `pos`, clamped into the current range.
    pub fn set_text_position(&mut self, pos: usize) {
        let pos = floor_char_boundary(self.text, pos.min(self.state.end));
        self.state.pos = pos;
        self.state.full_start = pos;
        self.state.token_pos = pos;
        self.state.token = SyntaxKind::Unknown;
        self.state.value = TokenValue::None;
        self.state.preceding_line_break = false;
        self.state.unterminated = false;
    }

    pub fn token(&self) -> SyntaxKind {
        self.state.token
    }

    /// Raw source text of the current token.
    pub fn token_text(&self) -> &'a str {
        let text = self.text;
        &text[self.state.token_pos..self.state.pos]
    }

    pub fn token_value(&self) -> &TokenValue {
        &self.state.value
    }

    /// Offset of the first character of the current token.
    pub fn token_start(&self) -> usize {
        self.state.token_pos
    }

    /// Offset just past the current token.
    pub fn token_end(&self) -> usize {
        self.state.pos
    }

    /// Offset where the last `scan` began, before skipped trivia.
    pub fn full_start(&self) -> usize {
        self.state.full_start
    }

    pub fn token_span(&self) -> Span {
        Span::new(self.state.token_pos, self.state.pos)
    }

    pub fn text_position(&self) -> usize {
        self.state.pos
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.state.preceding_line_break
    }

    pub fn is_unterminated(&self) -> bool {
        self.state.unterminated
    }

    pub fn is_identifier(&self) -> bool {
        self.state.token == SyntaxKind::Identifier
    }

    pub fn is_reserved_word(&self) -> bool {
        self.state.token.is_reserved_word()
    }

    /// Open a probe. Until the matching [`Lexer::restore`] or
    /// [`Lexer::commit`], lexical errors are held back from the sink.
    pub fn snapshot(&mut self) -> LexerSnapshot {
        self.probes += 1;
        LexerSnapshot {
            state: self.state.clone(),
            pending: self.pending.len(),
        }
    }

    /// Close a probe, rolling back its scanning and its errors.
    pub fn restore(&mut self, snapshot: LexerSnapshot) {
        self.state = snapshot.state;
        self.pending.truncate(snapshot.pending);
        self.close_probe();
    }

    /// Close a probe, keeping its progress.
    pub fn commit(&mut self, _snapshot: LexerSnapshot) {
        self.close_probe();
    }

    fn close_probe(&mut self) {
        self.probes = self.probes.saturating_sub(1);
        if self.probes == 0 {
            for error in std::mem::take(&mut self.pending) {
                self.sink.report(error);
            }
        }
    }

    /// Run `f`, then put the lexer back exactly as it was.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.snapshot();
        let result = f(self);
        self.restore(saved);
        result
    }

    /// Run `f`, keeping its progress only if it returns `Some`.
    pub fn try_scan<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let saved = self.snapshot();
        let result = f(self);
        match result {
            Some(_) => self.commit(saved),
            None => self.restore(saved),
        }
        result
    }

    /// Scan `start..start + length` inside `f`, then resume the outer scan.
    pub fn scan_range<T>(&mut self, start: usize, length: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.snapshot();
        self.set_text_range(start, length);
        let result = f(self);
        self.restore(saved);
        result
    }

    fn error(&mut self, kind: LexErrorKind, start: usize, end: usize) {
        let error = LexError {
            kind,
            span: Span::new(start, end),
        };
        tracing::debug!(%error, "lexical error");
        if self.probes > 0 {
            self.pending.push(error);
        } else {
            self.sink.report(error);
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.byte_at(self.state.pos)
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        if pos < self.state.end {
            Some(self.text.as_bytes()[pos])
        } else {
            None
        }
    }

    fn peek_char(&self) -> Option<char> {
        if self.state.pos < self.state.end {
            self.text[self.state.pos..self.state.end].chars().next()
        } else {
            None
        }
    }

    fn finish(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.state.token = kind;
        kind
    }

    fn punctuation(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.state.pos += 1;
        self.finish(kind)
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.state.full_start = self.state.pos;
        self.state.preceding_line_break = false;
        self.state.unterminated = false;
        self.state.value = TokenValue::None;

        loop {
            self.state.token_pos = self.state.pos;
            let Some(c) = self.peek_char() else {
                return self.finish(SyntaxKind::EndOfFile);
            };

            match c {
                c if is_line_break(c) => {
                    self.state.preceding_line_break = true;
                    self.consume_line_break(c);
                    if self.skip_trivia {
                        continue;
                    }
                    return self.finish(SyntaxKind::NewLineTrivia);
                }
                c if is_single_line_whitespace(c) => {
                    self.state.pos += c.len_utf8();
                    while let Some(c) = self.peek_char() {
                        if !is_single_line_whitespace(c) {
                            break;
                        }
                        self.state.pos += c.len_utf8();
                    }
                    if self.skip_trivia {
                        continue;
                    }
                    return self.finish(SyntaxKind::WhitespaceTrivia);
                }
                '"' | '\'' => {
                    let value = self.scan_string(c);
                    self.state.value = TokenValue::Text(value);
                    return self.finish(SyntaxKind::StringLiteral);
                }
                '/' => match self.byte_at(self.state.pos + 1) {
                    Some(b'/') => {
                        self.state.pos += 2;
                        while let Some(c) = self.peek_char() {
                            if is_line_break(c) {
                                break;
                            }
                            self.state.pos += c.len_utf8();
                        }
                        if self.skip_trivia {
                            continue;
                        }
                        if let Some(c) = self.peek_char() {
                            self.state.preceding_line_break = true;
                            self.consume_line_break(c);
                        }
                        return self.finish(SyntaxKind::SingleLineCommentTrivia);
                    }
                    Some(b'*') => {
                        let closed = self.scan_block_comment();
                        if self.skip_trivia {
                            continue;
                        }
                        self.state.unterminated = !closed;
                        return self.finish(SyntaxKind::MultiLineCommentTrivia);
                    }
                    _ => return self.punctuation(SyntaxKind::Slash),
                },
                '.' => {
                    if matches!(self.byte_at(self.state.pos + 1), Some(b'0'..=b'9')) {
                        return self.scan_number();
                    }
                    return self.punctuation(SyntaxKind::Dot);
                }
                '0'..='9' => return self.scan_numeric_literal(),
                '=' => return self.punctuation(SyntaxKind::Equals),
                ',' => return self.punctuation(SyntaxKind::Comma),
                ';' => return self.punctuation(SyntaxKind::Semicolon),
                '+' => return self.punctuation(SyntaxKind::Plus),
                '-' => return self.punctuation(SyntaxKind::Minus),
                '<' => return self.punctuation(SyntaxKind::LessThan),
                '>' => return self.punctuation(SyntaxKind::GreaterThan),
                '{' => return self.punctuation(SyntaxKind::OpenBrace),
                '}' => return self.punctuation(SyntaxKind::CloseBrace),
                '(' => return self.punctuation(SyntaxKind::OpenParen),
                ')' => return self.punctuation(SyntaxKind::CloseParen),
                '[' => return self.punctuation(SyntaxKind::OpenBracket),
                ']' => return self.punctuation(SyntaxKind::CloseBracket),
                c if is_identifier_start(c) => {
                    self.state.pos += 1;
                    while let Some(b) = self.peek_byte() {
                        if !is_identifier_part(b as char) {
                            break;
                        }
                        self.state.pos += 1;
                    }
                    let text = self.token_text();
                    let kind = identifier_kind(text);
                    self.state.value = match kind {
                        SyntaxKind::BooleanLiteral => TokenValue::Boolean(text == "true"),
                        _ => TokenValue::Text(text.to_string()),
                    };
                    return self.finish(kind);
                }
                c => {
                    let start = self.state.pos;
                    self.state.pos += c.len_utf8();
                    self.error(LexErrorKind::InvalidCharacter, start, self.state.pos);
                    return self.finish(SyntaxKind::Unknown);
                }
            }
        }
    }

    /// Consume one line terminator; `\r\n` counts as one.
    fn consume_line_break(&mut self, c: char) {
        self.state.pos += c.len_utf8();
        if c == '\r' && self.peek_byte() == Some(b'\n') {
            self.state.pos += 1;
        }
    }

    /// Returns whether the closing `*/` was found.
    fn scan_block_comment(&mut self) -> bool {
        let start = self.state.pos;
        self.state.pos += 2;

        while let Some(c) = self.peek_char() {
            if c == '*' && self.byte_at(self.state.pos + 1) == Some(b'/') {
                self.state.pos += 2;
                return true;
            }
            if is_line_break(c) {
                self.state.preceding_line_break = true;
            }
            self.state.pos += c.len_utf8();
        }

        self.error(LexErrorKind::UnterminatedComment, start, self.state.pos);
        false
    }

    fn scan_numeric_literal(&mut self) -> SyntaxKind {
        if self.peek_byte() == Some(b'0') {
            match self.byte_at(self.state.pos + 1) {
                Some(b'x' | b'X') => {
                    self.state.pos += 2;
                    let value = match self.scan_hex_digits(1, false) {
                        Some(value) => value,
                        None => {
                            self.error(LexErrorKind::HexDigitExpected, self.state.token_pos, self.state.pos);
                            0
                        }
                    };
                    self.state.value = TokenValue::Integer(value);
                    return self.finish(SyntaxKind::HexLiteral);
                }
                Some(b'0'..=b'7') => {
                    let value = self.scan_octal_digits();
                    self.state.value = TokenValue::Integer(value);
                    return self.finish(SyntaxKind::OctalLiteral);
                }
                _ => {}
            }
        }
        self.scan_number()
    }

    fn scan_octal_digits(&mut self) -> u64 {
        let mut value: u64 = 0;
        let mut overflow = false;
        while let Some(b @ b'0'..=b'7') = self.peek_byte() {
            value = accumulate(value, 8, (b - b'0') as u64, &mut overflow);
            self.state.pos += 1;
        }
        if overflow {
            self.error(LexErrorKind::NumericOverflow, self.state.token_pos, self.state.pos);
        }
        value
    }

    /// Scan hex digits. With `exact`, stop after `count`; otherwise take all.
    /// Returns `None` if fewer than `count` digits were found.
    fn scan_hex_digits(&mut self, count: usize, exact: bool) -> Option<u64> {
        let mut digits = 0;
        let mut value: u64 = 0;
        let mut overflow = false;

        while !exact || digits < count {
            let Some(digit) = self.peek_byte().and_then(|b| (b as char).to_digit(16)) else {
                break;
            };
            value = accumulate(value, 16, digit as u64, &mut overflow);
            self.state.pos += 1;
            digits += 1;
        }

        if overflow {
            self.error(LexErrorKind::NumericOverflow, self.state.token_pos, self.state.pos);
        }
        if digits < count {
            None
        } else {
            Some(value)
        }
    }

    fn skip_decimal_digits(&mut self) {
        while let Some(b'0'..=b'9') = self.peek_byte() {
            self.state.pos += 1;
        }
    }

    /// Decimal integer or float, starting at a digit or a `.` before a digit.
    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.state.pos;
        let mut is_float = false;

        self.skip_decimal_digits();
        if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.state.pos += 1;
            self.skip_decimal_digits();
        }

        let mut end = self.state.pos;
        if let Some(b'e' | b'E') = self.peek_byte() {
            is_float = true;
            self.state.pos += 1;
            if let Some(b'+' | b'-') = self.peek_byte() {
                self.state.pos += 1;
            }
            if let Some(b'0'..=b'9') = self.peek_byte() {
                self.skip_decimal_digits();
                end = self.state.pos;
            } else {
                self.error(LexErrorKind::DecimalDigitExpected, self.state.pos, self.state.pos);
            }
        }

        let text = self.text;
        let digits = &text[start..end];
        if is_float {
            self.state.value = TokenValue::Float(digits.parse().unwrap_or(0.0));
            return self.finish(SyntaxKind::FloatLiteral);
        }

        let mut overflow = false;
        let value = digits
            .bytes()
            .fold(0, |acc, b| accumulate(acc, 10, (b - b'0') as u64, &mut overflow));
        if overflow {
            self.error(LexErrorKind::NumericOverflow, start, end);
        }
        self.state.value = TokenValue::Integer(value);
        self.finish(SyntaxKind::DecimalLiteral)
    }

    fn scan_string(&mut self, quote: char) -> String {
        self.state.pos += 1;
        let mut result = String::new();
        let mut chunk_start = self.state.pos;

        loop {
            let Some(c) = self.peek_char() else {
                result.push_str(&self.text[chunk_start..self.state.pos]);
                self.state.unterminated = true;
                self.error(LexErrorKind::UnterminatedString, self.state.token_pos, self.state.pos);
                break;
            };

            if c == quote {
                result.push_str(&self.text[chunk_start..self.state.pos]);
                self.state.pos += 1;
                break;
            }

            if c == '\\' {
                result.push_str(&self.text[chunk_start..self.state.pos]);
                self.scan_escape_sequence(&mut result);
                chunk_start = self.state.pos;
                continue;
            }

            if is_line_break(c) {
                result.push_str(&self.text[chunk_start..self.state.pos]);
                self.state.unterminated = true;
                self.error(LexErrorKind::UnterminatedString, self.state.token_pos, self.state.pos);
                break;
            }

            self.state.pos += c.len_utf8();
        }

        result
    }

    fn scan_escape_sequence(&mut self, out: &mut String) {
        let start = self.state.pos;
        self.state.pos += 1;

        let Some(c) = self.peek_char() else {
            self.error(LexErrorKind::UnexpectedEndOfText, start, self.state.pos);
            return;
        };
        self.state.pos += c.len_utf8();

        match c {
            '0' => out.push('\0'),
            'b' => out.push('\u{08}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'v' => out.push('\u{0B}'),
            'f' => out.push('\u{0C}'),
            'r' => out.push('\r'),
            '\'' | '"' | '\\' => out.push(c),
            'x' => match self.scan_hex_digits(2, true) {
                // Two hex digits always form a valid scalar value.
                Some(value) => out.push(char::from(value as u8)),
                None => self.error(LexErrorKind::HexDigitExpected, start, self.state.pos),
            },
            'u' if self.peek_byte() == Some(b'{') => {
                self.state.pos += 1;
                self.scan_extended_unicode_escape(out, start);
            }
            'u' => self.scan_unicode_escape(out, start),
            // Line continuation.
            '\r' => {
                if self.peek_byte() == Some(b'\n') {
                    self.state.pos += 1;
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    /// `\uHHHH`, joining a high/low surrogate pair written as two escapes.
    fn scan_unicode_escape(&mut self, out: &mut String, start: usize) {
        let Some(unit) = self.scan_hex_digits(4, true) else {
            self.error(LexErrorKind::HexDigitExpected, start, self.state.pos);
            return;
        };
        let unit = unit as u32;

        if (0xD800..=0xDBFF).contains(&unit) {
            let pos = self.state.pos;
            if self.text[pos..self.state.end].starts_with("\\u") {
                self.state.pos += 2;
                match self.scan_hex_digits(4, true) {
                    Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                        let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low as u32 - 0xDC00);
                        out.push(char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER));
                        return;
                    }
                    _ => self.state.pos = pos,
                }
            }
        }

        match char::from_u32(unit) {
            Some(c) => out.push(c),
            None => {
                self.error(LexErrorKind::UnpairedSurrogate, start, self.state.pos);
                out.push(char::REPLACEMENT_CHARACTER);
            }
        }
    }

    /// `\u{H...}` after the opening brace.
    fn scan_extended_unicode_escape(&mut self, out: &mut String, start: usize) {
        let value = self.scan_hex_digits(1, false);
        let mut valid = true;

        match value {
            None => {
                self.error(LexErrorKind::HexDigitExpected, start, self.state.pos);
                valid = false;
            }
            Some(v) if v > 0x10FFFF => {
                self.error(LexErrorKind::EscapeOutOfRange, start, self.state.pos);
                valid = false;
            }
            Some(_) => {}
        }

        if self.peek_byte() == Some(b'}') {
            self.state.pos += 1;
        } else {
            self.error(LexErrorKind::UnterminatedEscape, start, self.state.pos);
            valid = false;
        }

        if let (true, Some(v)) = (valid, value) {
            match char::from_u32(v as u32) {
                Some(c) => out.push(c),
                None => {
                    self.error(LexErrorKind::UnpairedSurrogate, start, self.state.pos);
                    out.push(char::REPLACEMENT_CHARACTER);
                }
            }
        }
    }
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn accumulate(value: u64, radix: u64, digit: u64, overflow: &mut bool) -> u64 {
    match value.checked_mul(radix).and_then(|v| v.checked_add(digit)) {
        Some(v) => v,
        None => {
            *overflow = true;
            u64::MAX
        }
    }
}

pub fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub fn is_single_line_whitespace(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200B}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(text: &str) -> Vec<(SyntaxKind, TokenValue)> {
        let mut lex = Lexer::new(text, true);
        let mut out = Vec::new();
        loop {
            let kind = lex.scan();
            if kind == SyntaxKind::EndOfFile {
                break;
            }
            out.push((kind, lex.token_value().clone()));
        }
        out
    }

    #[test]
    fn test_float_literals() {
        let tokens = scan_all(".3210 123.456");
        assert_eq!(tokens[0], (SyntaxKind::FloatLiteral, TokenValue::Float(0.3210)));
        assert_eq!(tokens[1], (SyntaxKind::FloatLiteral, TokenValue::Float(123.456)));
    }

    #[test]
    fn test_decimal_literals() {
        let tokens = scan_all("1 1234");
        assert_eq!(tokens[0], (SyntaxKind::DecimalLiteral, TokenValue::Integer(1)));
        assert_eq!(tokens[1], (SyntaxKind::DecimalLiteral, TokenValue::Integer(1234)));
    }

    #[test]
    fn test_scientific_literals() {
        let tokens = scan_all("133e-1 1.56E5");
        assert_eq!(tokens[0], (SyntaxKind::FloatLiteral, TokenValue::Float(13.3)));
        assert_eq!(tokens[1], (SyntaxKind::FloatLiteral, TokenValue::Float(156000.0)));
    }

    #[test]
    fn test_octal_literal() {
        let tokens = scan_all("01243116");
        assert_eq!(tokens[0], (SyntaxKind::OctalLiteral, TokenValue::Integer(345678)));
    }

    #[test]
    fn test_hex_literals() {
        let tokens = scan_all("0xDEADBEEF 0Xcafebabe");
        assert_eq!(tokens[0], (SyntaxKind::HexLiteral, TokenValue::Integer(3735928559)));
        assert_eq!(tokens[1], (SyntaxKind::HexLiteral, TokenValue::Integer(3405691582)));
    }

    #[test]
    fn test_zero_and_leading_zero_decimal() {
        let tokens = scan_all("0 09 0.5");
        assert_eq!(tokens[0], (SyntaxKind::DecimalLiteral, TokenValue::Integer(0)));
        assert_eq!(tokens[1], (SyntaxKind::DecimalLiteral, TokenValue::Integer(9)));
        assert_eq!(tokens[2], (SyntaxKind::FloatLiteral, TokenValue::Float(0.5)));
    }

    #[test]
    fn test_dangling_exponent() {
        let mut lex = Lexer::new("12e; x", true);
        assert_eq!(lex.scan(), SyntaxKind::FloatLiteral);
        assert_eq!(lex.token_value(), &TokenValue::Float(12.0));
        assert_eq!(lex.token_text(), "12e");
        assert_eq!(lex.errors().len(), 1);
        assert_eq!(lex.errors()[0].kind, LexErrorKind::DecimalDigitExpected);
        assert_eq!(lex.scan(), SyntaxKind::Semicolon);
    }

    #[test]
    fn test_hex_without_digits() {
        let mut lex = Lexer::new("0x;", true);
        assert_eq!(lex.scan(), SyntaxKind::HexLiteral);
        assert_eq!(lex.token_value(), &TokenValue::Integer(0));
        assert_eq!(lex.errors()[0].kind, LexErrorKind::HexDigitExpected);
    }

    #[test]
    fn test_punctuation() {
        let kinds: Vec<_> = scan_all(")(}{][./+-><=;,").into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::CloseParen,
                SyntaxKind::OpenParen,
                SyntaxKind::CloseBrace,
                SyntaxKind::OpenBrace,
                SyntaxKind::CloseBracket,
                SyntaxKind::OpenBracket,
                SyntaxKind::Dot,
                SyntaxKind::Slash,
                SyntaxKind::Plus,
                SyntaxKind::Minus,
                SyntaxKind::GreaterThan,
                SyntaxKind::LessThan,
                SyntaxKind::Equals,
                SyntaxKind::Semicolon,
                SyntaxKind::Comma,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = scan_all(r#""hello" "\u05D0\u{1D306}\t\n\v\b\f\r\"\'\0""#);
        assert_eq!(tokens[0].1, TokenValue::Text("hello".into()));
        assert_eq!(
            tokens[1].1,
            TokenValue::Text("\u{05D0}\u{1D306}\t\n\u{0B}\u{08}\u{0C}\r\"'\0".into())
        );
        let utf16: Vec<u16> = tokens[1].1.as_str().unwrap().encode_utf16().take(3).collect();
        assert_eq!(utf16, vec![0x05D0, 0xD834, 0xDF06]);
    }

    #[test]
    fn test_hex_escape_and_surrogate_pair() {
        let tokens = scan_all(r#"'\x41\uD834\uDF06'"#);
        assert_eq!(tokens[0].1, TokenValue::Text("A\u{1D306}".into()));
    }

    #[test]
    fn test_escape_out_of_range() {
        let mut lex = Lexer::new(r#""a\u{110000}b""#, true);
        assert_eq!(lex.scan(), SyntaxKind::StringLiteral);
        assert_eq!(lex.token_value(), &TokenValue::Text("ab".into()));
        assert_eq!(lex.errors()[0].kind, LexErrorKind::EscapeOutOfRange);
    }

    #[test]
    fn test_keyword_token() {
        let mut lex = Lexer::new("option test.value = \"35\";", true);
        assert_eq!(lex.scan(), SyntaxKind::OptionKeyword);
        assert_eq!(lex.text_position(), 6);
        assert!(lex.is_reserved_word());
        assert_eq!(lex.scan(), SyntaxKind::Identifier);
        assert!(lex.is_identifier());
    }

    #[test]
    fn test_boolean_literals() {
        let tokens = scan_all("true false");
        assert_eq!(tokens[0], (SyntaxKind::BooleanLiteral, TokenValue::Boolean(true)));
        assert_eq!(tokens[1], (SyntaxKind::BooleanLiteral, TokenValue::Boolean(false)));
    }

    #[test]
    fn test_preceding_line_break() {
        let mut lex = Lexer::new(
            "\n    option test.sample = \"hello\";\n    option test.value = 35;\n",
            true,
        );
        for _ in 0..7 {
            lex.scan();
        }
        assert!(!lex.has_preceding_line_break());
        assert_eq!(lex.scan(), SyntaxKind::OptionKeyword);
        assert!(lex.has_preceding_line_break());
    }

    #[test]
    fn test_unterminated_string() {
        let mut errors = Vec::new();
        let mut lex = Lexer::with_sink("option a = \"hello\nthere\";", true, |e: LexError| errors.push(e));
        for _ in 0..4 {
            lex.scan();
        }
        assert_eq!(lex.token(), SyntaxKind::StringLiteral);
        assert!(lex.is_unterminated());
        assert_eq!(lex.token_value(), &TokenValue::Text("hello".into()));
        drop(lex);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unterminated_string_at_end() {
        let mut lex = Lexer::new("\"hello", true);
        assert_eq!(lex.scan(), SyntaxKind::StringLiteral);
        assert!(lex.is_unterminated());
        assert_eq!(lex.scan(), SyntaxKind::EndOfFile);
    }

    #[test]
    fn test_trivia_tokens() {
        let mut lex = Lexer::new("\t\u{0B}\u{0C} \r\n// note\n/* block\n */", false);
        assert_eq!(lex.scan(), SyntaxKind::WhitespaceTrivia);
        assert_eq!(lex.scan(), SyntaxKind::NewLineTrivia);
        assert_eq!(lex.token_text(), "\r\n");
        assert_eq!(lex.scan(), SyntaxKind::SingleLineCommentTrivia);
        assert_eq!(lex.token_text(), "// note\n");
        assert_eq!(lex.scan(), SyntaxKind::MultiLineCommentTrivia);
        assert!(!lex.is_unterminated());
        assert_eq!(lex.scan(), SyntaxKind::EndOfFile);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lex = Lexer::new("/* This is a block comment", false);
        assert_eq!(lex.scan(), SyntaxKind::MultiLineCommentTrivia);
        assert!(lex.is_unterminated());
        assert_eq!(lex.errors()[0].kind, LexErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_skips_comments() {
        let mut lex = Lexer::new("\n// line\n/* block */\n\"hello\"", true);
        assert_eq!(lex.scan(), SyntaxKind::StringLiteral);
        assert!(lex.has_preceding_line_break());
    }

    #[test]
    fn test_unicode_whitespace_and_line_breaks() {
        let mut lex = Lexer::new("\u{a0}\u{2029}", true);
        assert_eq!(lex.scan(), SyntaxKind::EndOfFile);
        assert!(lex.has_preceding_line_break());
    }

    #[test]
    fn test_invalid_character() {
        let mut lex = Lexer::new("ᚙ x", true);
        assert_eq!(lex.scan(), SyntaxKind::Unknown);
        assert_eq!(lex.errors()[0].kind, LexErrorKind::InvalidCharacter);
        assert_eq!(lex.scan(), SyntaxKind::Identifier);
    }

    #[test]
    fn test_look_ahead_restores_state() {
        let mut lex = Lexer::new("a 0x b", true);
        lex.scan();
        let before = (lex.token(), lex.token_span(), lex.token_value().clone());
        let probed = lex.look_ahead(|l| {
            l.scan();
            l.scan();
            l.token()
        });
        assert_eq!(probed, SyntaxKind::Identifier);
        assert_eq!((lex.token(), lex.token_span(), lex.token_value().clone()), before);
        // The probe's hex error is discarded as well.
        assert!(lex.errors().is_empty());
    }

    #[test]
    fn test_try_scan_commits_on_success() {
        let mut lex = Lexer::new("- 5 - x", true);
        lex.scan();
        let number = lex.try_scan(|l| match l.scan() {
            SyntaxKind::DecimalLiteral => l.token_value().as_u64(),
            _ => None,
        });
        assert_eq!(number, Some(5));
        assert_eq!(lex.scan(), SyntaxKind::Minus);
        let failed = lex.try_scan(|l| match l.scan() {
            SyntaxKind::DecimalLiteral => l.token_value().as_u64(),
            _ => None,
        });
        assert_eq!(failed, None);
        assert_eq!(lex.token(), SyntaxKind::Minus);
    }

    #[test]
    fn test_scan_range() {
        let mut lex = Lexer::new("message Foo {}", true);
        lex.scan();
        let inner = lex.scan_range(8, 3, |l| {
            let kind = l.scan();
            let next = l.scan();
            (kind, l.token_value().clone(), next)
        });
        assert_eq!(
            inner,
            (SyntaxKind::Identifier, TokenValue::None, SyntaxKind::EndOfFile)
        );
        assert_eq!(lex.token(), SyntaxKind::MessageKeyword);
        assert_eq!(lex.scan(), SyntaxKind::Identifier);
        assert_eq!(lex.token_text(), "Foo");
    }

    #[test]
    fn test_deterministic() {
        let text = "syntax = \"proto3\"; message M { repeated .a.B b = 0x1F; }";
        assert_eq!(scan_all(text), scan_all(text));
    }
}
