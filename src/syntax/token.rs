//! Tokens and the logos-driven lexer.
//!
//! The lexer produces every token of the input, including whitespace and
//! comments. Those sit on the hidden channel: the parser skips them, the
//! [`CollectorTokenSource`](super::CollectorTokenSource) logs them.

use std::fmt;

use logos::Logos;
use smol_str::SmolStr;

use crate::base::{LineIndex, TextRange, TextSize};

/// Lexical token kinds of the supported Java subset.
#[derive(Logos, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    // ------------------------------------------------------------------
    // Hidden channel
    // ------------------------------------------------------------------
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+([^*/][^*]*\*+)*/")]
    BlockComment,

    // ------------------------------------------------------------------
    // Keywords
    // ------------------------------------------------------------------
    #[token("abstract")]
    Abstract,
    #[token("assert")]
    Assert,
    #[token("boolean")]
    Boolean,
    #[token("break")]
    Break,
    #[token("byte")]
    Byte,
    #[token("case")]
    Case,
    #[token("catch")]
    Catch,
    #[token("char")]
    Char,
    #[token("class")]
    Class,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("do")]
    Do,
    #[token("double")]
    Double,
    #[token("else")]
    Else,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("final")]
    Final,
    #[token("finally")]
    Finally,
    #[token("float")]
    Float,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("implements")]
    Implements,
    #[token("import")]
    Import,
    #[token("instanceof")]
    Instanceof,
    #[token("int")]
    Int,
    #[token("interface")]
    Interface,
    #[token("long")]
    Long,
    #[token("native")]
    Native,
    #[token("new")]
    New,
    #[token("package")]
    Package,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("public")]
    Public,
    #[token("return")]
    Return,
    #[token("short")]
    Short,
    #[token("static")]
    Static,
    #[token("strictfp")]
    Strictfp,
    #[token("super")]
    Super,
    #[token("switch")]
    Switch,
    #[token("synchronized")]
    Synchronized,
    #[token("this")]
    This,
    #[token("throw")]
    Throw,
    #[token("throws")]
    Throws,
    #[token("transient")]
    Transient,
    #[token("try")]
    Try,
    #[token("void")]
    Void,
    #[token("volatile")]
    Volatile,
    #[token("while")]
    While,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // ------------------------------------------------------------------
    // Identifiers and literals
    // ------------------------------------------------------------------
    #[regex(r"[a-zA-Z_$\x{80}-\x{10FFFF}][a-zA-Z0-9_$\x{80}-\x{10FFFF}]*")]
    Ident,
    #[regex(r"[0-9][0-9_]*[lL]?")]
    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*[lL]?")]
    #[regex(r"0[bB][01][01_]*[lL]?")]
    IntLiteral,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fFdD]?")]
    #[regex(r"[0-9][0-9_]*[fFdD]")]
    FloatLiteral,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,
    #[regex(r"'([^'\\\n]|\\.)+'")]
    CharLiteral,

    // ------------------------------------------------------------------
    // Punctuation and operators
    // ------------------------------------------------------------------
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
    Semicolon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("@")]
    At,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("->")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!")]
    Bang,
    #[token("!=")]
    BangEq,
    #[token("~")]
    Tilde,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    // `>>`, `>>>` and `>>=` are assembled by the parser from adjacent tokens so
    // that nested type arguments close cleanly.
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("%")]
    Percent,
    #[token("<<")]
    Shl,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("%=")]
    PercentEq,
    #[token("<<=")]
    ShlEq,

    /// Input the lexer could not match.
    Unknown,
    /// End of input, returned repeatedly once the text is exhausted.
    Eof,
}

impl TokenKind {
    /// Tokens on the hidden channel, never seen by the parser.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Declaration modifiers, excluding annotations.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Final
                | TokenKind::Abstract
                | TokenKind::Transient
                | TokenKind::Volatile
                | TokenKind::Synchronized
                | TokenKind::Native
                | TokenKind::Strictfp
                | TokenKind::Default
        )
    }

    /// Single-token assignment operators. `>>=` and `>>>=` are composite.
    pub fn is_assignment_op(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::PercentEq
                | TokenKind::ShlEq
        )
    }
}

/// The comment kinds collected by default.
pub const COMMENT_KINDS: [TokenKind; 2] = [TokenKind::LineComment, TokenKind::BlockComment];

/// A lexed token with its position.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub range: TextRange,
    /// 1-indexed line of the first character.
    pub line: u32,
    /// 0-indexed byte column of the first character.
    pub column: u32,
    /// Position in the full token stream, hidden tokens included.
    pub index: usize,
}

impl Token {
    /// `/** ... */` comments.
    pub fn is_doc_comment(&self) -> bool {
        self.kind == TokenKind::BlockComment && self.text.starts_with("/**") && self.text.len() > 4
    }

    /// 1-indexed line of the last character.
    pub fn end_line(&self) -> u32 {
        self.line + self.text.matches('\n').count() as u32
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{}:{}#{} {:?}",
            self.kind, self.line, self.column, self.index, self.text
        )
    }
}

/// A pull-based source of tokens.
pub trait TokenSource {
    /// Pull the next token. After the input is exhausted this keeps returning
    /// an [`TokenKind::Eof`] token.
    fn next_token(&mut self) -> Token;

    /// Human readable name of the source, used in logs.
    fn source_name(&self) -> String;
}

/// Lexer over one source text.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    line_index: LineIndex,
    name: SmolStr,
    next_index: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, name: impl Into<SmolStr>) -> Self {
        Self {
            inner: TokenKind::lexer(text),
            line_index: LineIndex::new(text),
            name: name.into(),
            next_index: 0,
        }
    }

    fn make_token(&mut self, kind: TokenKind, start: usize, end: usize, text: &str) -> Token {
        let range = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
        let pos = self.line_index.line_col(range.start());
        let token = Token {
            kind,
            text: text.into(),
            range,
            line: pos.line_one_indexed(),
            column: pos.col,
            index: self.next_index,
        };
        self.next_index += 1;
        token
    }
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        match self.inner.next() {
            Some(result) => {
                let span = self.inner.span();
                let slice = self.inner.slice();
                let kind = result.unwrap_or(TokenKind::Unknown);
                self.make_token(kind, span.start, span.end, slice)
            }
            None => {
                let end = self.inner.source().len();
                self.make_token(TokenKind::Eof, end, end, "")
            }
        }
    }

    fn source_name(&self) -> String {
        self.name.to_string()
    }
}

/// Lex a whole text, hidden tokens included, ending with one `Eof` token.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(text, "<text>");
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Whitespace)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("public class Foo"),
            vec![
                TokenKind::Public,
                TokenKind::Class,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
        // Keyword prefixes stay identifiers.
        assert_eq!(kinds("classy"), vec![TokenKind::Ident, TokenKind::Eof]);
    }

    #[test]
    fn test_comments_are_lexed() {
        let tokens = tokenize("a // line\n/* block */ /** doc */ b");
        let comments: Vec<_> = tokens.iter().filter(|t| t.kind.is_comment()).collect();

        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].kind, TokenKind::LineComment);
        assert_eq!(comments[0].text, "// line");
        assert!(!comments[1].is_doc_comment());
        assert!(comments[2].is_doc_comment());
    }

    #[test]
    fn test_block_comment_forms() {
        for text in ["/* x */", "/**/", "/***/", "/** a * b **/", "/* a / b */", "/*\n * doc\n */"] {
            let tokens = tokenize(&format!("a {text} b"));
            let kinds: Vec<_> = tokens.iter().map(|t| t.kind).filter(|k| *k != TokenKind::Whitespace).collect();

            assert_eq!(
                kinds,
                [TokenKind::Ident, TokenKind::BlockComment, TokenKind::Ident, TokenKind::Eof],
                "{text:?}"
            );
            assert_eq!(tokens[2].text, text);
        }
    }

    #[test]
    fn test_positions_and_indices() {
        let tokens = tokenize("int a;\n  b = 1;");
        let b = tokens.iter().find(|t| t.text == "b").unwrap();

        assert_eq!(b.line, 2);
        assert_eq!(b.column, 2);
        assert_eq!(tokens[b.index].text, "b");
    }

    #[test]
    fn test_nested_generics_lex_as_single_gt() {
        assert_eq!(
            kinds("List<List<T>>"),
            vec![
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Gt,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds(r#"42 0xFFL 3.14 1e9 2f "s\"q" 'c'"#),
            vec![
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::StringLiteral,
                TokenKind::CharLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unknown_input_does_not_stop_lexing() {
        assert_eq!(
            kinds("a # b"),
            vec![
                TokenKind::Ident,
                TokenKind::Unknown,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("", "empty");

        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_multiline_comment_end_line() {
        let tokens = tokenize("/*\n\n*/");

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].end_line(), 3);
    }
}
