use crate::PolicyParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Operator keywords; case is resolved by the parser
    Word(String),
    /// Threshold count inside `OutOf(...)`
    Int(u32),
    /// Contents of a single-quoted principal literal, quotes stripped
    Principal(String),
    LParen,
    RParen,
    Comma,
    Eof,
}

/// A token plus the byte range it covers in the source expression.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, PolicyParseError> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let simple = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = simple {
            chars.next();
            tokens.push(Spanned { token, start, end: start + 1 });
            continue;
        }

        if c == '\'' {
            chars.next();
            let mut end = None;
            for (i, inner) in chars.by_ref() {
                if inner == '\'' {
                    end = Some(i);
                    break;
                }
            }
            let close = end.ok_or_else(|| {
                PolicyParseError::syntax(src, start, src.len(), "unterminated principal literal")
            })?;
            tokens.push(Spanned {
                token: Token::Principal(src[start + 1..close].to_string()),
                start,
                end: close + 1,
            });
            continue;
        }

        if c.is_ascii_alphabetic() {
            let mut end = start;
            while let Some(&(i, w)) = chars.peek() {
                if w.is_ascii_alphanumeric() || w == '_' {
                    end = i + w.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Spanned { token: Token::Word(src[start..end].to_string()), start, end });
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            let value = src[start..end].parse::<u32>().map_err(|_| {
                PolicyParseError::syntax(src, start, end, "threshold count does not fit in 32 bits")
            })?;
            tokens.push(Spanned { token: Token::Int(value), start, end });
            continue;
        }

        return Err(PolicyParseError::syntax(
            src,
            start,
            start + c.len_utf8(),
            "unexpected character",
        ));
    }

    tokens.push(Spanned { token: Token::Eof, start: src.len(), end: src.len() });
    Ok(tokens)
}
