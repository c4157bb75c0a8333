use std::fmt;

use logos::{Logos, SpannedIter};

#[derive(Default, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[default]
    InvalidToken,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(skip r"\s*", skip r"//([^/\n\r]([^\n\r]*))?[\n\r]*", error = LexicalError)]
//                          ^^   ^^^^^^  ^^^^^^^  ^^^^^^^
//                          (1)   (2)      (3)     (4)
// Comments start with "//" (1).
// Then we have to exclude the possibility of a doc comment which starts with "///":
// If the line is not empty, then the next character must not contain "/" (2)
// And this character can be followed by any number of characters which don't end the line (3)
// And finally many newlines (4)
pub enum Token {
    // Keywords
    //
    //
    #[token("let")]
    Let,
    #[token("structure")]
    Structure,
    #[token("namespace")]
    Namespace,
    #[token("end")]
    End,
    #[token("open")]
    Open,
    #[token("close")]
    Close,
    #[token("import")]
    Import,
    #[token("check")]
    Check,
    #[token("search")]
    Search,
    #[token("prove")]
    Prove,
    #[token("docs")]
    Docs,

    // Parens, Braces and Brackets
    //
    //
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

    // Symbols
    //
    //
    #[token(";")]
    Semicolon,
    #[token(":=")]
    ColonEq,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("%")]
    Percent,
    #[token("\\")]
    Backslash,
    #[token("λ")]
    Lambda,

    // Identifiers
    //
    // Letters of any script, digits and `_`, and `'` after the first character
    #[regex(r"[\p{L}_][\p{L}\p{N}_']*", |lex| lex.slice().to_string())]
    Ident(String),

    // Literals
    //
    //
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    NumLit(usize),
    /// The regexp is from `https://gist.github.com/cellularmitosis/6fd5fc2a65225364f72d3574abd9d5d5`
    /// We do not allow multi line strings.
    #[regex(r###""([^"\\]|\\.)*""###, |lex| {
        let slice = lex.slice();
        // Remove the surrounding quotation marks
        let inner = &slice[1..slice.len()-1];
        inner.to_string()
    })]
    StringLit(String),

    // DocComments
    //
    //
    #[regex(r"///[^\n\r]*[\n\r]*", |lex| lex.slice()[3..].trim().to_string())]
    //        ^^^ ^^^^^^^ ^^^^^^
    //        (1)   (2)    (3)
    // Doc comments start with "///" (1),
    // followed by any number of non-line-break characters (2),
    // followed by any number of empty lines (3).
    // Only the text after the slashes is kept.
    DocComment(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

pub struct Lexer<'input> {
    // instead of an iterator over characters, we have a token iterator
    token_stream: SpannedIter<'input, Token>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        // the Token::lexer() method is provided by the Logos trait
        Self { token_stream: Token::lexer(input).spanned() }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Spanned<Token, usize, (usize, LexicalError, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.token_stream.next().map(|(token, span)| match token {
            Ok(token) => Ok((span.start, token, span.end)),
            Err(err) => Err((span.start, err, span.end)),
        })
    }
}
