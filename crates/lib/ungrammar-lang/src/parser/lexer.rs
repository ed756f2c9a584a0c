/// Lossless tokenizer for the ungrammar notation using chumsky
/// Converts source text into a sequence of position-aware tokens
use super::token::{Token, TokenKind};
use chumsky::input::StrInput;
use chumsky::prelude::*;

type LexerError<'src> = chumsky::extra::Err<Rich<'src, char, SimpleSpan>>;

fn is_ident_char(c: &char) -> bool {
    c.is_ascii_alphabetic() || *c == '_'
}

fn is_error_tail_char(c: &char) -> bool {
    c.is_ascii_alphanumeric() || *c == '_' || *c == '-'
}

/// Attach the matched span to a token kind
fn spanned<'src, I, P>(parser: P) -> impl Parser<'src, I, Token, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
    P: Parser<'src, I, TokenKind, LexerError<'src>> + Clone,
{
    parser.map_with(|kind, e| {
        let span: SimpleSpan = e.span();
        Token::new(kind, span.start, span.end - span.start)
    })
}

/// Parser for whitespace, linebreaks, carriage returns and comments
fn trivia_parser<'src, I>() -> impl Parser<'src, I, TokenKind, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let comment = just("//")
        .ignore_then(none_of("\r\n").repeated())
        .to(TokenKind::SingleLineComment);
    let whitespace = one_of(" \t")
        .repeated()
        .at_least(1)
        .to(TokenKind::Whitespace);
    let linebreak = just('\n')
        .repeated()
        .at_least(1)
        .to(TokenKind::LineBreak);
    let whitespace_r = just('\r')
        .repeated()
        .at_least(1)
        .to(TokenKind::WhitespaceR);

    choice((comment, whitespace, linebreak, whitespace_r))
}

/// Parser for punctuation
fn punctuation_parser<'src, I>() -> impl Parser<'src, I, TokenKind, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    choice((
        just('=').to(TokenKind::Assign),
        just(':').to(TokenKind::Colon),
        just('|').to(TokenKind::Pipe),
        just('*').to(TokenKind::Star),
        just('?').to(TokenKind::Question),
        just('(').to(TokenKind::ParenBegin),
        just(')').to(TokenKind::ParenEnd),
    ))
}

/// Parser for identifiers. Digits and dashes are not identifier characters.
fn identifier_parser<'src, I>() -> impl Parser<'src, I, TokenKind, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    any()
        .filter(is_ident_char)
        .repeated()
        .at_least(1)
        .to(TokenKind::Ident)
}

/// Fallback: any character, plus the word characters glued to it
fn error_parser<'src, I>() -> impl Parser<'src, I, TokenKind, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    any()
        .then(any().filter(is_error_tail_char).repeated())
        .to(TokenKind::Error)
}

/// Parser for a quoted token, split into adjacent pieces.
/// A literal stops at its closing quote, a line break, or the end of input.
fn literal_parser<'src, I>() -> impl Parser<'src, I, Vec<Token>, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let text = choice((
        none_of("'\\\n\r").ignored(),
        just('\\').then(one_of("'\\")).ignored(),
    ))
    .repeated()
    .at_least(1)
    .to(TokenKind::LiteralText);

    let invalid_escape = just('\\')
        .then(none_of("\n\r").or_not())
        .to(TokenKind::InvalidEscape);

    spanned(just('\'').to(TokenKind::LiteralStart))
        .then(
            spanned(choice((text, invalid_escape)))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then(spanned(just('\'').to(TokenKind::LiteralEnd)).or_not())
        .map(|((start, body), end)| {
            let mut pieces = Vec::with_capacity(body.len() + 2);
            pieces.push(start);
            pieces.extend(body);
            pieces.extend(end);
            pieces
        })
}

/// Tokenize the source text into a sequence of lossless tokens.
/// The result always ends with a zero-width `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let single = spanned(choice((
        trivia_parser(),
        punctuation_parser(),
        identifier_parser(),
        error_parser(),
    )))
    .map(|token| vec![token]);

    let lexer = choice((literal_parser(), single))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end());

    match lexer.parse(source).into_result() {
        Ok(chunks) => {
            let mut tokens = chunks.into_iter().flatten().collect::<Vec<_>>();
            tokens.push(Token::new(TokenKind::Eof, source.len(), 0));
            tokens
        }
        Err(errors) => {
            // every character is claimed by the fallback, so this is not expected
            log::warn!("tokenization failed: {errors:?}");
            vec![
                Token::new(TokenKind::Error, 0, source.len()),
                Token::new(TokenKind::Eof, source.len(), 0),
            ]
        }
    }
}
