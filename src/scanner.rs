//! The scanner: raw bytes to tokens.
//!
//! TOML's lexical grammar depends on position: `true`, `1234` and `inf` are
//! bare keys on the left of `=` and typed scalars on the right. The scanner
//! tracks which side it is on (and which brackets are open) so every token
//! it emits has exactly one meaning, and the parser never re-classifies.
//!
//! Comments are trivia: they are validated and skipped.
//!
//! Scanning stops at the first lexical error. A malformed token leaves the
//! rest of the buffer without a reliable interpretation, so there is no
//! resynchronization.
//!
//! ## Examples
//!
//! ```rust
//! use unreal_toml::scanner::scan;
//! use unreal_toml::TokenKind;
//!
//! let (tokens, diagnostics) = scan(b"true = true");
//! assert!(diagnostics.is_empty());
//! assert_eq!(tokens[0].kind, TokenKind::Identifier("true".to_string()));
//! assert_eq!(tokens[1].kind, TokenKind::Equals);
//! assert_eq!(tokens[2].kind, TokenKind::Boolean(true));
//! ```

use crate::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::token::{Position, Token, TokenKind};
use crate::value::{IntegerBase, StringStyle};
use tracing::{debug, trace};

/// Scans a complete buffer.
///
/// On success the token sequence ends with [`TokenKind::Eof`] and the
/// diagnostics are empty. On failure the diagnostics hold exactly one error
/// and the tokens are those read before it.
pub fn scan(input: &[u8]) -> (Vec<Token>, Diagnostics) {
    let source = match std::str::from_utf8(input) {
        Ok(source) => source,
        Err(err) => {
            let position = position_at(input, err.valid_up_to());
            debug!(offset = position.offset, "invalid UTF-8 in input");
            let diagnostic = Diagnostic::error(DiagnosticKind::InvalidUtf8, position);
            return (Vec::new(), Diagnostics::from(diagnostic));
        }
    };

    let mut scanner = Scanner::new(source);
    let mut diagnostics = Diagnostics::new();
    if let Err(diagnostic) = scanner.run() {
        debug!(%diagnostic, "scan failed");
        diagnostics.push(diagnostic);
    }
    trace!(tokens = scanner.tokens.len(), bytes = input.len(), "scan finished");
    (scanner.tokens, diagnostics)
}

/// Line and column of a byte offset inside a buffer whose prefix is valid.
fn position_at(input: &[u8], offset: usize) -> Position {
    let prefix = String::from_utf8_lossy(&input[..offset]);
    let line = 1 + prefix.matches('\n').count();
    let column = 1 + prefix
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count());
    Position::new(line, column, offset)
}

/// An open bracket that changes how the next tokens are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Header,
    ArrayHeader,
    Array,
    InlineTable,
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    frames: Vec<Frame>,
    /// `true` on the key side of `=`.
    expect_key: bool,
}

type Scan<T> = Result<T, Diagnostic>;

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Scanner {
            source,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            frames: Vec::new(),
            expect_key: true,
        }
    }

    // ---- cursor ----

    fn position(&self) -> Position {
        Position::new(self.line, self.column, self.pos)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    fn error<T>(&self, kind: DiagnosticKind, position: Position) -> Scan<T> {
        Err(Diagnostic::error(kind, position))
    }

    fn push(&mut self, kind: TokenKind, start: Position) {
        let lexeme = &self.source[start.offset..self.pos];
        trace!(kind = kind.describe(), line = start.line, column = start.column, "token");
        self.tokens.push(Token::new(kind, lexeme, start));
    }

    // ---- main loop ----

    fn run(&mut self) -> Scan<()> {
        loop {
            self.bump_while(|c| c == ' ' || c == '\t');
            let start = self.position();
            let Some(c) = self.peek() else {
                self.push(TokenKind::Eof, start);
                return Ok(());
            };

            match c {
                '#' => self.skip_comment()?,
                '\n' => {
                    self.bump();
                    self.newline(start);
                }
                '\r' => {
                    if self.peek_nth(1) != Some('\n') {
                        return self.error(DiagnosticKind::LoneCarriageReturn, start);
                    }
                    self.bump();
                    self.bump();
                    self.newline(start);
                }
                '=' => {
                    self.bump();
                    self.expect_key = false;
                    self.push(TokenKind::Equals, start);
                }
                '.' if self.expect_key => {
                    self.bump();
                    self.push(TokenKind::Dot, start);
                }
                ',' => {
                    self.bump();
                    match self.frames.last() {
                        Some(Frame::InlineTable) => self.expect_key = true,
                        Some(Frame::Array) => self.expect_key = false,
                        _ => {}
                    }
                    self.push(TokenKind::Comma, start);
                }
                '{' => {
                    self.bump();
                    self.frames.push(Frame::InlineTable);
                    self.expect_key = true;
                    self.push(TokenKind::LBrace, start);
                }
                '}' => {
                    self.bump();
                    if self.frames.last() == Some(&Frame::InlineTable) {
                        self.frames.pop();
                    }
                    self.expect_key = false;
                    self.push(TokenKind::RBrace, start);
                }
                '[' => self.open_bracket(start),
                ']' => self.close_bracket(start),
                '"' | '\'' => {
                    let kind = self.string(c, start)?;
                    self.push(kind, start);
                }
                _ if self.expect_key => {
                    if !is_bare_key_char(c) {
                        return self.error(DiagnosticKind::InvalidKeyChar(c), start);
                    }
                    self.bump_while(is_bare_key_char);
                    let key = self.source[start.offset..self.pos].to_string();
                    self.push(TokenKind::Identifier(key), start);
                }
                _ => {
                    let kind = self.scalar(c, start)?;
                    self.push(kind, start);
                }
            }
        }
    }

    fn newline(&mut self, start: Position) {
        // headers end at the line break even when their bracket is missing
        if matches!(self.frames.last(), Some(Frame::Header | Frame::ArrayHeader)) {
            self.frames.pop();
        }
        if self.frames.last() != Some(&Frame::Array) {
            self.expect_key = true;
        }
        self.push(TokenKind::Newline, start);
    }

    fn open_bracket(&mut self, start: Position) {
        self.bump();
        if self.expect_key && self.frames.is_empty() {
            if self.peek() == Some('[') {
                self.bump();
                self.frames.push(Frame::ArrayHeader);
                self.push(TokenKind::DoubleLBracket, start);
            } else {
                self.frames.push(Frame::Header);
                self.push(TokenKind::LBracket, start);
            }
        } else {
            self.frames.push(Frame::Array);
            self.expect_key = false;
            self.push(TokenKind::LBracket, start);
        }
    }

    fn close_bracket(&mut self, start: Position) {
        self.bump();
        match self.frames.last() {
            Some(Frame::ArrayHeader) => {
                self.frames.pop();
                if self.peek() == Some(']') {
                    self.bump();
                    self.push(TokenKind::DoubleRBracket, start);
                } else {
                    self.push(TokenKind::RBracket, start);
                }
            }
            Some(Frame::Header) => {
                self.frames.pop();
                self.push(TokenKind::RBracket, start);
            }
            Some(Frame::Array) => {
                self.frames.pop();
                self.expect_key = false;
                self.push(TokenKind::RBracket, start);
            }
            _ => self.push(TokenKind::RBracket, start),
        }
    }

    fn skip_comment(&mut self) -> Scan<()> {
        self.bump();
        while let Some(c) = self.peek() {
            match c {
                '\n' => break,
                '\r' if self.peek_nth(1) == Some('\n') => break,
                '\r' => return self.error(DiagnosticKind::LoneCarriageReturn, self.position()),
                c if is_forbidden_control(c) => {
                    return self.error(DiagnosticKind::ControlChar(c), self.position())
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(())
    }

    // ---- strings ----

    fn string(&mut self, quote: char, start: Position) -> Scan<TokenKind> {
        let triple = if quote == '"' { "\"\"\"" } else { "'''" };
        let multiline = self.rest().starts_with(triple);

        let (value, style) = match (quote, multiline) {
            ('"', false) => (self.basic_string(start)?, StringStyle::Basic),
            ('"', true) => (self.multiline_string(quote, start)?, StringStyle::MultilineBasic),
            (_, false) => (self.literal_string(start)?, StringStyle::Literal),
            (_, true) => (self.multiline_string(quote, start)?, StringStyle::MultilineLiteral),
        };
        Ok(TokenKind::String { value, style })
    }

    fn basic_string(&mut self, start: Position) -> Scan<String> {
        self.bump();
        let mut value = String::new();
        loop {
            let here = self.position();
            match self.peek() {
                None => return self.error(DiagnosticKind::UnterminatedString, start),
                Some('"') => {
                    self.bump();
                    return Ok(value);
                }
                Some('\n' | '\r') => return self.error(DiagnosticKind::NewlineInString, here),
                Some('\\') => self.escape(&mut value, start)?,
                Some(c) if is_forbidden_control(c) => {
                    return self.error(DiagnosticKind::ControlChar(c), here)
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    fn literal_string(&mut self, start: Position) -> Scan<String> {
        self.bump();
        let mut value = String::new();
        loop {
            let here = self.position();
            match self.peek() {
                None => return self.error(DiagnosticKind::UnterminatedString, start),
                Some('\'') => {
                    self.bump();
                    return Ok(value);
                }
                Some('\n' | '\r') => return self.error(DiagnosticKind::NewlineInString, here),
                Some(c) if is_forbidden_control(c) => {
                    return self.error(DiagnosticKind::ControlChar(c), here)
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    /// Scans `"""..."""` (with escapes) or `'''...'''` (verbatim).
    fn multiline_string(&mut self, quote: char, start: Position) -> Scan<String> {
        let escapes = quote == '"';
        for _ in 0..3 {
            self.bump();
        }
        // a newline right after the opening delimiter is trimmed
        if self.rest().starts_with("\r\n") {
            self.bump();
            self.bump();
        } else if self.peek() == Some('\n') {
            self.bump();
        }

        let mut value = String::new();
        loop {
            let here = self.position();
            match self.peek() {
                None => return self.error(DiagnosticKind::UnterminatedMultilineString, start),
                Some(c) if c == quote => {
                    let run = self.rest().chars().take_while(|&q| q == quote).count();
                    if run < 3 {
                        for _ in 0..run {
                            self.bump();
                            value.push(quote);
                        }
                        continue;
                    }
                    // up to two quotes may sit just inside the closing delimiter
                    let content = run.min(5) - 3;
                    for _ in 0..content {
                        value.push(quote);
                    }
                    for _ in 0..content + 3 {
                        self.bump();
                    }
                    return Ok(value);
                }
                Some('\r') => {
                    if self.peek_nth(1) != Some('\n') {
                        return self.error(DiagnosticKind::LoneCarriageReturn, here);
                    }
                    self.bump();
                    self.bump();
                    value.push('\n');
                }
                Some('\n') => {
                    self.bump();
                    value.push('\n');
                }
                Some('\\') if escapes && self.is_line_ending_backslash() => {
                    self.bump();
                    loop {
                        match self.peek() {
                            Some(' ' | '\t' | '\n') => {}
                            Some('\r') if self.peek_nth(1) == Some('\n') => {}
                            Some('\r') => {
                                return self
                                    .error(DiagnosticKind::LoneCarriageReturn, self.position())
                            }
                            _ => break,
                        }
                        self.bump();
                    }
                }
                Some('\\') if escapes => self.escape(&mut value, start)?,
                Some(c) if is_forbidden_control(c) => {
                    return self.error(DiagnosticKind::ControlChar(c), here)
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
    }

    /// A backslash followed only by whitespace up to the end of the line.
    fn is_line_ending_backslash(&self) -> bool {
        let after = self.rest()[1..].trim_start_matches([' ', '\t']);
        after.starts_with('\n') || after.starts_with("\r\n")
    }

    fn escape(&mut self, out: &mut String, string_start: Position) -> Scan<()> {
        let backslash = self.position();
        self.bump();
        let Some(c) = self.bump() else {
            return self.error(DiagnosticKind::UnterminatedString, string_start);
        };
        let decoded = match c {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            '"' => '"',
            '\\' => '\\',
            'u' => self.unicode_escape(4, backslash)?,
            'U' => self.unicode_escape(8, backslash)?,
            other => return self.error(DiagnosticKind::InvalidEscape(other), backslash),
        };
        out.push(decoded);
        Ok(())
    }

    fn unicode_escape(&mut self, len: usize, backslash: Position) -> Scan<char> {
        let digits: String = self.rest().chars().take(len).collect();
        let prefix = if len == 4 { "\\u" } else { "\\U" };
        let invalid = |digits: &str| DiagnosticKind::InvalidUnicodeEscape(format!("{}{}", prefix, digits));

        if digits.chars().count() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return self.error(invalid(&digits), backslash);
        }
        let decoded = u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                for _ in 0..len {
                    self.bump();
                }
                Ok(c)
            }
            None => self.error(invalid(&digits), backslash),
        }
    }

    // ---- scalars ----

    fn scalar(&mut self, c: char, start: Position) -> Scan<TokenKind> {
        if c.is_ascii_digit() && self.looks_like_datetime() {
            self.datetime();
            return Ok(TokenKind::DateTime);
        }

        if c.is_ascii_digit() || c == '+' || c == '-' {
            self.bump_while(is_number_char);
            let lexeme = &self.source[start.offset..self.pos];
            return number(lexeme).or_else(|kind| self.error(kind, start));
        }

        if c.is_ascii_alphabetic() {
            self.bump_while(is_bare_key_char);
            let word = &self.source[start.offset..self.pos];
            return match word {
                "true" => Ok(TokenKind::Boolean(true)),
                "false" => Ok(TokenKind::Boolean(false)),
                "inf" => Ok(TokenKind::Float(f64::INFINITY)),
                "nan" => Ok(TokenKind::Float(f64::NAN)),
                _ => self.error(DiagnosticKind::UnquotedValue(word.to_string()), start),
            };
        }

        self.error(DiagnosticKind::UnexpectedChar(c), start)
    }

    /// `dddd-` starts a date; `dd:` starts a time.
    fn looks_like_datetime(&self) -> bool {
        let b = self.rest().as_bytes();
        let digits = |n: usize| b.len() > n && b[..n].iter().all(u8::is_ascii_digit);
        (digits(4) && b[4] == b'-') || (digits(2) && b[2] == b':')
    }

    fn datetime(&mut self) {
        self.bump_while(is_datetime_char);
        // `1979-05-27 07:32:00` uses a space as the date/time separator
        let b = self.rest().as_bytes();
        let spaced_time = b.len() > 3
            && b[0] == b' '
            && b[1].is_ascii_digit()
            && b[2].is_ascii_digit()
            && b[3] == b':';
        if spaced_time {
            self.bump();
            self.bump_while(is_datetime_char);
        }
    }
}

fn is_bare_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

fn is_datetime_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | ':' | '.' | 'T' | 't' | 'Z' | 'z' | '+')
}

/// ASCII control characters other than tab may not appear unescaped.
/// Newlines are handled by the callers.
fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

// ---- numbers ----

fn malformed(lexeme: &str, reason: &'static str) -> DiagnosticKind {
    DiagnosticKind::MalformedNumber {
        lexeme: lexeme.to_string(),
        reason,
    }
}

/// Classifies and decodes a number lexeme.
fn number(lexeme: &str) -> Result<TokenKind, DiagnosticKind> {
    let (negative, body) = match lexeme.as_bytes().first() {
        Some(b'+') => (false, &lexeme[1..]),
        Some(b'-') => (true, &lexeme[1..]),
        _ => (false, lexeme),
    };
    let signed = lexeme.len() != body.len();

    match body {
        "inf" => {
            return Ok(TokenKind::Float(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }))
        }
        "nan" => return Ok(TokenKind::Float(if negative { -f64::NAN } else { f64::NAN })),
        _ => {}
    }

    let prefixed = [("0x", IntegerBase::Hex), ("0o", IntegerBase::Octal), ("0b", IntegerBase::Binary)]
        .into_iter()
        .find(|(prefix, _)| body.starts_with(prefix));
    if let Some((prefix, base)) = prefixed {
        if signed {
            return Err(malformed(lexeme, "prefixed integers cannot have a sign"));
        }
        let radix = base.radix();
        let digits = strip_underscores(&body[prefix.len()..], |c| c.is_digit(radix))
            .ok_or_else(|| malformed(lexeme, "invalid digit or misplaced underscore"))?;
        let value = i64::from_str_radix(&digits, radix)
            .map_err(|_| DiagnosticKind::IntegerOutOfRange(lexeme.to_string()))?;
        return Ok(TokenKind::Integer { value, base });
    }

    let is_float = body.contains(['.', 'e', 'E']);
    if !is_float {
        let digits = strip_underscores(body, |c| c.is_ascii_digit())
            .ok_or_else(|| malformed(lexeme, "invalid digit or misplaced underscore"))?;
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(malformed(lexeme, "leading zeros are not allowed"));
        }
        let text = if negative { format!("-{}", digits) } else { digits };
        let value = text
            .parse::<i64>()
            .map_err(|_| DiagnosticKind::IntegerOutOfRange(lexeme.to_string()))?;
        return Ok(TokenKind::Integer {
            value,
            base: IntegerBase::Decimal,
        });
    }

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (mantissa, None),
    };

    let digit = |c: char| c.is_ascii_digit();
    let int_digits = strip_underscores(int_part, digit)
        .ok_or_else(|| malformed(lexeme, "a float needs digits before the decimal point"))?;
    if int_digits.len() > 1 && int_digits.starts_with('0') {
        return Err(malformed(lexeme, "leading zeros are not allowed"));
    }
    let mut text = String::with_capacity(lexeme.len());
    if negative {
        text.push('-');
    }
    text.push_str(&int_digits);
    if let Some(frac) = frac_part {
        let frac_digits = strip_underscores(frac, digit)
            .ok_or_else(|| malformed(lexeme, "a float needs digits after the decimal point"))?;
        text.push('.');
        text.push_str(&frac_digits);
    }
    if let Some(exp) = exponent {
        let (sign, exp_body) = match exp.as_bytes().first() {
            Some(b'+' | b'-') => (&exp[..1], &exp[1..]),
            _ => ("", exp),
        };
        let exp_digits = strip_underscores(exp_body, digit)
            .ok_or_else(|| malformed(lexeme, "invalid exponent"))?;
        text.push('e');
        text.push_str(sign);
        text.push_str(&exp_digits);
    }

    text.parse::<f64>()
        .map(TokenKind::Float)
        .map_err(|_| malformed(lexeme, "not a valid float"))
}

/// Removes digit separators, requiring each `_` to sit between two digits.
///
/// Returns `None` for an empty string, a non-digit, or a misplaced `_`.
fn strip_underscores(s: &str, is_digit: impl Fn(char) -> bool) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut prev_digit = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_digit {
                return None;
            }
            prev_digit = false;
        } else if is_digit(c) {
            out.push(c);
            prev_digit = true;
        } else {
            return None;
        }
    }
    if prev_digit {
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = scan(input.as_bytes());
        assert!(diagnostics.is_empty(), "{}", diagnostics);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn first_error(input: &str) -> Diagnostic {
        let (_, diagnostics) = scan(input.as_bytes());
        diagnostics
            .first_error()
            .cloned()
            .unwrap_or_else(|| panic!("expected an error for {:?}", input))
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(s.to_string())
    }

    fn string(s: &str, style: StringStyle) -> TokenKind {
        TokenKind::String {
            value: s.to_string(),
            style,
        }
    }

    fn int(value: i64) -> TokenKind {
        TokenKind::Integer {
            value,
            base: IntegerBase::Decimal,
        }
    }

    #[test]
    fn test_key_value_line() {
        assert_eq!(
            kinds("a.\"b\" = 1\n"),
            vec![
                ident("a"),
                TokenKind::Dot,
                string("b", StringStyle::Basic),
                TokenKind::Equals,
                int(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keys_that_look_like_values() {
        assert_eq!(
            kinds("1234 = inf"),
            vec![ident("1234"), TokenKind::Equals, TokenKind::Float(f64::INFINITY), TokenKind::Eof]
        );
        assert_eq!(
            kinds("3.14 = 1"),
            vec![ident("3"), TokenKind::Dot, ident("14"), TokenKind::Equals, int(1), TokenKind::Eof]
        );
    }

    #[test]
    fn test_headers() {
        assert_eq!(
            kinds("[[a.b]]\n[c]"),
            vec![
                TokenKind::DoubleLBracket,
                ident("a"),
                TokenKind::Dot,
                ident("b"),
                TokenKind::DoubleRBracket,
                TokenKind::Newline,
                TokenKind::LBracket,
                ident("c"),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_nested_arrays_are_not_headers() {
        assert_eq!(
            kinds("a = [[1], []]"),
            vec![
                ident("a"),
                TokenKind::Equals,
                TokenKind::LBracket,
                TokenKind::LBracket,
                int(1),
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_inline_table_switches_modes() {
        assert_eq!(
            kinds("t = { x = 1, true = false }"),
            vec![
                ident("t"),
                TokenKind::Equals,
                TokenKind::LBrace,
                ident("x"),
                TokenKind::Equals,
                int(1),
                TokenKind::Comma,
                ident("true"),
                TokenKind::Equals,
                TokenKind::Boolean(false),
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_array_newlines_stay_in_value_mode() {
        let k = kinds("a = [\n  1, # one\n  2,\n]\nb = 3");
        assert!(k.contains(&int(2)));
        assert!(k.contains(&ident("b")));
    }

    #[test]
    fn test_basic_escapes() {
        assert_eq!(
            kinds(r#"s = "a\tbé\U0001F600\\""#)[2],
            string("a\tb\u{e9}\u{1F600}\\", StringStyle::Basic)
        );
        assert_eq!(kinds(r"s = 'a\tb'")[2], string("a\\tb", StringStyle::Literal));
    }

    #[test]
    fn test_invalid_escape_points_at_backslash() {
        let d = first_error(r#"s = "ab\qc""#);
        assert_eq!(d.kind, DiagnosticKind::InvalidEscape('q'));
        assert_eq!(d.position.column, 8);
        assert_eq!(d.position.offset, 7);
    }

    #[test]
    fn test_invalid_unicode_escape() {
        let d = first_error(r#"s = "\uD800""#);
        assert_eq!(d.kind, DiagnosticKind::InvalidUnicodeEscape("\\uD800".to_string()));
        let d = first_error(r#"s = "\u12""#);
        assert!(matches!(d.kind, DiagnosticKind::InvalidUnicodeEscape(_)));
    }

    #[test]
    fn test_multiline_strings() {
        assert_eq!(
            kinds("s = \"\"\"\nline one\nline two\"\"\"")[2],
            string("line one\nline two", StringStyle::MultilineBasic)
        );
        assert_eq!(
            kinds("s = \"\"\"fox \\\n    jumps\"\"\"")[2],
            string("fox jumps", StringStyle::MultilineBasic)
        );
        assert_eq!(
            kinds("s = '''I [dw]on't need \\d{2}'''")[2],
            string("I [dw]on't need \\d{2}", StringStyle::MultilineLiteral)
        );
        assert_eq!(
            kinds("s = \"\"\"\"quoted\"\"\"\"\"")[2],
            string("\"quoted\"\"", StringStyle::MultilineBasic)
        );
    }

    #[test]
    fn test_unterminated_strings_point_at_opening_quote() {
        let d = first_error("a = 1\ns = \"open");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedString);
        assert_eq!((d.position.line, d.position.column), (2, 5));

        let d = first_error("s = '''never closed\n");
        assert_eq!(d.kind, DiagnosticKind::UnterminatedMultilineString);
        assert_eq!(d.position.column, 5);

        let d = first_error("s = \"split\nline\"");
        assert_eq!(d.kind, DiagnosticKind::NewlineInString);
    }

    #[test]
    fn test_integers() {
        assert_eq!(kinds("n = 1_000_000")[2], int(1_000_000));
        assert_eq!(kinds("n = -17")[2], int(-17));
        assert_eq!(kinds("n = +0")[2], int(0));
        assert_eq!(
            kinds("n = 0xDEAD_beef")[2],
            TokenKind::Integer {
                value: 0xdead_beef,
                base: IntegerBase::Hex
            }
        );
        assert_eq!(
            kinds("n = 0b1101")[2],
            TokenKind::Integer {
                value: 13,
                base: IntegerBase::Binary
            }
        );
        assert_eq!(kinds("n = -9223372036854775808")[2], int(i64::MIN));
    }

    #[test]
    fn test_malformed_numbers() {
        for input in ["n = 1__0", "n = _1", "n = 1_", "n = 01", "n = +0x1", "n = 0xG", "n = 1.", "n = .5", "n = 1e", "n = 1.e5"] {
            let d = first_error(input);
            assert_eq!(d.category(), crate::diagnostic::Category::Lexical, "{}", input);
        }
        assert_eq!(
            first_error("n = 9223372036854775808").kind,
            DiagnosticKind::IntegerOutOfRange("9223372036854775808".to_string())
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(kinds("f = 6.626e-34")[2], TokenKind::Float(6.626e-34));
        assert_eq!(kinds("f = 1e06")[2], TokenKind::Float(1e6));
        assert_eq!(kinds("f = -0.0")[2], TokenKind::Float(-0.0));
        assert_eq!(kinds("f = 224_617.445_991")[2], TokenKind::Float(224_617.445_991));
        assert_eq!(kinds("f = -inf")[2], TokenKind::Float(f64::NEG_INFINITY));
        match &kinds("f = +nan")[2] {
            TokenKind::Float(f) => assert!(f.is_nan()),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_datetime_lexemes() {
        let (tokens, _) = scan(b"a = 1979-05-27 07:32:00Z\nb = 07:32:00.5\nc = 1979-05-27");
        let lexemes: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::DateTime)
            .map(|t| t.lexeme.as_str())
            .collect();
        assert_eq!(lexemes, vec!["1979-05-27 07:32:00Z", "07:32:00.5", "1979-05-27"]);
    }

    #[test]
    fn test_unquoted_value() {
        assert_eq!(
            first_error("a = hello").kind,
            DiagnosticKind::UnquotedValue("hello".to_string())
        );
    }

    #[test]
    fn test_comments_are_trivia_but_validated() {
        assert_eq!(
            kinds("# leading\na = 1 # trailing\n"),
            vec![
                TokenKind::Newline,
                ident("a"),
                TokenKind::Equals,
                int(1),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            first_error("# bell \u{7}\n").kind,
            DiagnosticKind::ControlChar('\u{7}')
        );
    }

    #[test]
    fn test_crlf_and_lone_cr() {
        assert_eq!(
            kinds("a = 1\r\n"),
            vec![ident("a"), TokenKind::Equals, int(1), TokenKind::Newline, TokenKind::Eof]
        );
        assert_eq!(first_error("a = 1\rb = 2").kind, DiagnosticKind::LoneCarriageReturn);
    }

    #[test]
    fn test_line_ending_backslash_rejects_lone_cr() {
        let d = first_error("a = \"\"\"\nx\\\n\r y\"\"\"");
        assert_eq!(d.kind, DiagnosticKind::LoneCarriageReturn);
        assert_eq!(d.position, Position::new(3, 1, 11));

        let (tokens, diagnostics) = scan(b"a = \"\"\"\nx\\\r\n\r\n  y\"\"\"");
        assert!(diagnostics.is_empty());
        assert!(matches!(
            &tokens[2].kind,
            TokenKind::String { value, .. } if value == "xy"
        ));
    }

    #[test]
    fn test_invalid_utf8_offset() {
        let (tokens, diagnostics) = scan(b"a = 1\nb = \"\xff\"");
        assert!(tokens.is_empty());
        let d = diagnostics.first_error().unwrap();
        assert_eq!(d.kind, DiagnosticKind::InvalidUtf8);
        assert_eq!(d.position, Position::new(2, 6, 11));
    }

    #[test]
    fn test_positions_count_characters() {
        let (tokens, _) = scan("k = \"é\" # x\nz = 1".as_bytes());
        let z = tokens.iter().find(|t| t.kind == ident("z")).unwrap();
        assert_eq!((z.position.line, z.position.column), (2, 1));
        let newline = tokens.iter().find(|t| t.kind == TokenKind::Newline).unwrap();
        assert_eq!(newline.position.column, 12);
    }

    #[test]
    fn test_invalid_key_char() {
        assert_eq!(first_error("a$ = 1").kind, DiagnosticKind::InvalidKeyChar('$'));
    }
}
