//! Lexer for `.trip` sources.
//!
//! Produces span-based tokens; text is sliced from the source only when the
//! parser needs it. Keywords win over identifiers at equal length; `--`
//! starts a line comment.

use std::ops::Range;

use logos::Logos;

use super::error::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip(r"--[^\n]*", allow_greedy = true))]
pub enum TokenKind {
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("poly")]
    Poly,
    #[token("typed")]
    Typed,
    #[token("untyped")]
    Untyped,
    #[token("combinator")]
    Combinator,
    #[token("type")]
    Type,
    #[token("data")]
    Data,
    #[token("rec")]
    Rec,
    #[token("let")]
    Let,
    #[token("in")]
    In,
    #[token("match")]
    Match,
    #[token("return")]
    Return,

    #[regex("[A-Za-z][A-Za-z0-9_']*")]
    Ident,
    #[regex("[0-9]+")]
    Number,

    #[token("\\")]
    Backslash,
    #[token("#")]
    Hash,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,
    #[token("=")]
    Eq,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("|")]
    Pipe,
}

impl TokenKind {
    /// Human-readable image for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Module => "'module'",
            TokenKind::Import => "'import'",
            TokenKind::Export => "'export'",
            TokenKind::Poly => "'poly'",
            TokenKind::Typed => "'typed'",
            TokenKind::Untyped => "'untyped'",
            TokenKind::Combinator => "'combinator'",
            TokenKind::Type => "'type'",
            TokenKind::Data => "'data'",
            TokenKind::Rec => "'rec'",
            TokenKind::Let => "'let'",
            TokenKind::In => "'in'",
            TokenKind::Match => "'match'",
            TokenKind::Return => "'return'",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Backslash => "'\\'",
            TokenKind::Hash => "'#'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Arrow => "'->'",
            TokenKind::Eq => "'='",
            TokenKind::Colon => "':'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Pipe => "'|'",
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize the whole source, failing on the first unrecognized character.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span: lexer.span(),
            }),
            Err(()) => {
                return Err(ParseError::UnexpectedChar {
                    found: source[lexer.span()].to_owned(),
                });
            }
        }
    }
    Ok(tokens)
}
