//! Lexer for Compiscript source text.
//!
//! Produces span-based tokens; text is sliced from the source only when
//! needed. Whitespace and comments are skipped by the lexer itself.

use logos::Logos;

use crate::source::Span;

use super::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
#[logos(skip r"/\*(?:[^*]|\*[^/])*\*/")]
pub enum TokenKind {
    #[token("let")]
    KwLet,
    #[token("var")]
    KwVar,
    #[token("const")]
    KwConst,
    #[token("function")]
    KwFunction,
    #[token("class")]
    KwClass,
    #[token("if")]
    KwIf,
    #[token("else")]
    KwElse,
    #[token("while")]
    KwWhile,
    #[token("do")]
    KwDo,
    #[token("for")]
    KwFor,
    #[token("foreach")]
    KwForeach,
    #[token("in")]
    KwIn,
    #[token("switch")]
    KwSwitch,
    #[token("case")]
    KwCase,
    #[token("default")]
    KwDefault,
    #[token("break")]
    KwBreak,
    #[token("continue")]
    KwContinue,
    #[token("return")]
    KwReturn,
    #[token("print")]
    KwPrint,
    #[token("new")]
    KwNew,
    #[token("this")]
    KwThis,
    #[token("try")]
    KwTry,
    #[token("catch")]
    KwCatch,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    /// `1.5`, `12.0e3`, `12e-1`
    #[regex(r"[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+")]
    FloatLiteral,

    #[regex(r"[0-9]+")]
    IntLiteral,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    StringLiteral,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,

    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("=")]
    Assign,
    #[token("!")]
    Bang,
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

    /// Synthetic end-of-input token appended by [`lex`].
    Eof,
}

impl TokenKind {
    /// Human name used in syntax error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Eof => "end of input",
            TokenKind::KwLet => "`let`",
            TokenKind::KwVar => "`var`",
            TokenKind::KwConst => "`const`",
            TokenKind::KwFunction => "`function`",
            TokenKind::KwClass => "`class`",
            TokenKind::KwIf => "`if`",
            TokenKind::KwElse => "`else`",
            TokenKind::KwWhile => "`while`",
            TokenKind::KwDo => "`do`",
            TokenKind::KwFor => "`for`",
            TokenKind::KwForeach => "`foreach`",
            TokenKind::KwIn => "`in`",
            TokenKind::KwSwitch => "`switch`",
            TokenKind::KwCase => "`case`",
            TokenKind::KwDefault => "`default`",
            TokenKind::KwBreak => "`break`",
            TokenKind::KwContinue => "`continue`",
            TokenKind::KwReturn => "`return`",
            TokenKind::KwPrint => "`print`",
            TokenKind::KwNew => "`new`",
            TokenKind::KwThis => "`this`",
            TokenKind::KwTry => "`try`",
            TokenKind::KwCatch => "`catch`",
            TokenKind::KwTrue => "`true`",
            TokenKind::KwFalse => "`false`",
            TokenKind::KwNull => "`null`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Semi => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Colon => "`:`",
            TokenKind::Question => "`?`",
            TokenKind::Dot => "`.`",
            TokenKind::EqEq => "`==`",
            TokenKind::BangEq => "`!=`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::AndAnd => "`&&`",
            TokenKind::OrOr => "`||`",
            TokenKind::Assign => "`=`",
            TokenKind::Bang => "`!`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
        }
    }
}

/// Zero-copy token: kind plus span, text sliced from source when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenizes the whole input, appending a synthetic [`TokenKind::Eof`].
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let span = Span::new(span.start as u32, span.end as u32);
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                return Err(ParseError::unexpected_char(source, span));
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len() as u32, source.len() as u32),
    });
    Ok(tokens)
}

/// Slice the source text of a token.
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.span.start as usize..token.span.end as usize]
}
