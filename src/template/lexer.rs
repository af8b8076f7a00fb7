use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse())]
    Number(f64),
    #[regex(r"~[^~]*~", |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Str(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("let")]
    Let,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("=")]
    Equal,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        match self {
            Number(n) => write!(f, "number {n}"),
            Str(s) => write!(f, "string ~{s}~"),
            Ident(name) => write!(f, "identifier `{name}`"),
            Let => f.write_str("'let'"),
            LeftParen => f.write_str("'('"),
            RightParen => f.write_str("')'"),
            LeftBracket => f.write_str("'['"),
            RightBracket => f.write_str("']'"),
            Comma => f.write_str("','"),
            Dot => f.write_str("'.'"),
            Semicolon => f.write_str("';'"),
            Question => f.write_str("'?'"),
            Colon => f.write_str("':'"),
            Plus => f.write_str("'+'"),
            Minus => f.write_str("'-'"),
            Star => f.write_str("'*'"),
            Slash => f.write_str("'/'"),
            Percent => f.write_str("'%'"),
            EqualEqual => f.write_str("'=='"),
            BangEqual => f.write_str("'!='"),
            LessEqual => f.write_str("'<='"),
            GreaterEqual => f.write_str("'>='"),
            LessThan => f.write_str("'<'"),
            GreaterThan => f.write_str("'>'"),
            AndAnd => f.write_str("'&&'"),
            OrOr => f.write_str("'||'"),
            Bang => f.write_str("'!'"),
            Equal => f.write_str("'='"),
            Error => f.write_str("<error>"),
        }
    }
}

pub type Spanned = (Token, Range<usize>);

/// Splits one expression source into tokens, failing on the first unknown character.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, String> {
    let mut out = Vec::new();
    for (token, span) in Token::lexer(src).spanned() {
        if token == Token::Error {
            return Err(format!(
                "unexpected input {:?} at position {}",
                &src[span.clone()],
                span.start
            ));
        }
        out.push((token, span));
    }
    Ok(out)
}
