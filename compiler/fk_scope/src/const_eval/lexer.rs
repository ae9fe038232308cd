//! Tokenizer for declaration expression text.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// `[A-Za-z_][A-Za-z0-9_$]*`
    Ident,
    /// Integer or real literal, including exponent and kind suffix.
    Number,
    Whitespace,
    /// Any other single character.
    Punct,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Split `text` into tokens; concatenating all token texts yields `text`.
pub(super) fn tokenize(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let b = bytes[pos];
        let kind = if b.is_ascii_alphabetic() || b == b'_' {
            pos = scan_while(bytes, pos, |c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$');
            TokenKind::Ident
        } else if b.is_ascii_digit()
            || (b == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            pos = scan_number(bytes, pos);
            TokenKind::Number
        } else if b.is_ascii_whitespace() {
            pos = scan_while(bytes, pos, |c| c.is_ascii_whitespace());
            TokenKind::Whitespace
        } else {
            // Advance one full character so multi-byte input stays intact.
            pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Punct
        };
        tokens.push(Token {
            kind,
            text: &text[start..pos],
        });
    }
    tokens
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn scan_number(bytes: &[u8], pos: usize) -> usize {
    let mut pos = scan_while(bytes, pos, |c| c.is_ascii_digit());
    // Fraction, unless the dot starts an operator such as `.and.`.
    if bytes.get(pos) == Some(&b'.') && !bytes.get(pos + 1).is_some_and(u8::is_ascii_alphabetic) {
        pos = scan_while(bytes, pos + 1, |c| c.is_ascii_digit());
    }
    // Exponent: e, E, d, D with optional sign, only if digits follow.
    if matches!(bytes.get(pos), Some(b'e' | b'E' | b'd' | b'D')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = scan_while(bytes, exp, |c| c.is_ascii_digit());
        }
    }
    // Kind suffix.
    if bytes.get(pos) == Some(&b'_') {
        pos = scan_while(bytes, pos + 1, |c| c.is_ascii_alphanumeric() || c == b'_');
    }
    pos
}
