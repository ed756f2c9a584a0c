/// CST Parser - parses token indices into Green Tree
/// This is a simple recursive descent parser that produces a lossless CST.
/// It never fails: unexpected tokens are wrapped into `Error` nodes and
/// missing pieces become zero-width marker nodes.
use super::fragment::Fragment;
use super::green::{GreenNodeArena, GreenNodeId, GreenTreeBuilder, Marker, SyntaxKind};
use super::preparser::PreParsedTokens;
use super::token::{Token, TokenKind};

/// Helper trait to reduce node boilerplate
trait NodeBuilder {
    fn emit_node<F>(&mut self, kind: SyntaxKind, f: F) -> Option<GreenNodeId>
    where
        F: FnOnce(&mut Self);
}

impl NodeBuilder for Parser<'_> {
    fn emit_node<F>(&mut self, kind: SyntaxKind, f: F) -> Option<GreenNodeId>
    where
        F: FnOnce(&mut Self),
    {
        self.start_node(kind);
        f(self);
        self.builder.finish_node()
    }
}

/// Output of a CST parse
#[derive(Debug)]
pub struct ParsedCst {
    pub root: GreenNodeId,
    pub arena: GreenNodeArena,
    pub tokens: Vec<Token>,
    /// One fragment per top-level definition, ordered by position
    pub fragments: Vec<Fragment>,
}

/// Parser state
pub struct Parser<'a> {
    tokens: Vec<Token>,
    preparsed: &'a PreParsedTokens,
    current: usize, // Index into preparsed.token_indices
    emitted: usize, // Raw tokens already added to the tree
    group_depth: usize,
    builder: GreenTreeBuilder,
    reusable: Vec<Fragment>,
    next_reusable: usize,
    fragments: Vec<Fragment>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, preparsed: &'a PreParsedTokens) -> Self {
        Self::with_fragments(tokens, preparsed, GreenNodeArena::new(), Vec::new())
    }

    /// Parser building into `arena`, allowed to splice in the given fragments.
    /// Fragments must be ordered by `from` and refer to nodes living in `arena`.
    pub fn with_fragments(
        tokens: Vec<Token>,
        preparsed: &'a PreParsedTokens,
        arena: GreenNodeArena,
        reusable: Vec<Fragment>,
    ) -> Self {
        Self {
            tokens,
            preparsed,
            current: 0,
            emitted: 0,
            group_depth: 0,
            builder: GreenTreeBuilder::with_arena(arena),
            reusable,
            next_reusable: 0,
            fragments: Vec::new(),
        }
    }

    /// Get the current token kind
    fn peek(&self) -> TokenKind {
        self.peek_ahead(0)
    }

    /// Peek ahead n significant tokens
    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.preparsed
            .get_token(self.current + n, &self.tokens)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn current_token(&self) -> Option<&Token> {
        self.preparsed.get_token(self.current, &self.tokens)
    }

    fn current_start(&self) -> usize {
        self.current_token().map_or(0, |t| t.start)
    }

    /// Check if current token matches the expected kind
    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    /// Check if we've reached the end
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Add trivia that precedes the current token to the node being built
    fn flush_trivia(&mut self) {
        let trivia = self.preparsed.leading_trivia(self.current);
        for idx in trivia.start.max(self.emitted)..trivia.end {
            if let Some(token) = self.tokens.get(idx) {
                self.builder.add_token(token.kind, token.length);
            }
        }
        self.emitted = self.emitted.max(trivia.end);
    }

    /// Advance to the next token and add current to the tree
    fn bump(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.flush_trivia();
        if let Some(&token_idx) = self.preparsed.token_indices.get(self.current)
            && let Some(token) = self.tokens.get(token_idx)
        {
            self.builder.add_token(token.kind, token.length);
            self.emitted = token_idx + 1;
        }
        self.current += 1;
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    fn marker(&mut self) -> Marker {
        self.flush_trivia();
        self.builder.marker()
    }

    fn wrap_from(&mut self, marker: Marker, kind: SyntaxKind) {
        self.builder.start_node_at(marker, kind);
        self.builder.finish_node();
    }

    /// Zero-width node standing for something that is absent.
    /// Pending trivia stays outside so the node sits right after the last token.
    fn missing(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind);
        self.builder.finish_node();
    }

    /// A definition header starts here: `Ident Error* '='` or a bare `=`
    fn at_boundary(&self) -> bool {
        match self.peek() {
            TokenKind::Assign => true,
            TokenKind::Ident => {
                let mut n = 1;
                while self.peek_ahead(n) == TokenKind::Error {
                    n += 1;
                }
                self.peek_ahead(n) == TokenKind::Assign
            }
            _ => false,
        }
    }

    /// A rule cannot continue past this token
    fn at_rule_end(&self) -> bool {
        self.is_at_end()
            || self.at_boundary()
            || (self.group_depth > 0 && self.check(TokenKind::ParenEnd))
    }

    fn at_atom_start(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Ident | TokenKind::LiteralStart | TokenKind::ParenBegin
        )
    }

    /// Parse the entire grammar
    pub fn parse(mut self) -> ParsedCst {
        self.builder.start_node(SyntaxKind::Grammar);

        while !self.is_at_end() {
            if self.at_boundary() {
                if !self.try_reuse() {
                    self.parse_node();
                }
            } else {
                self.parse_stray();
            }
        }
        self.flush_trivia();

        let root = self.builder.finish_node();
        let mut arena = self.builder.into_arena();
        let root = root.unwrap_or_else(|| arena.alloc_internal(SyntaxKind::Grammar, Vec::new()));
        ParsedCst {
            root,
            arena,
            tokens: self.tokens,
            fragments: self.fragments,
        }
    }
}

impl Parser<'_> {
    /// Splice a fragment of the previous parse starting at the current token
    fn try_reuse(&mut self) -> bool {
        let start = self.current_start();
        while self
            .reusable
            .get(self.next_reusable)
            .is_some_and(|f| f.from < start)
        {
            self.next_reusable += 1;
        }
        let Some(&fragment) = self.reusable.get(self.next_reusable) else {
            return false;
        };
        let arena = self.builder.arena();
        if fragment.from != start
            || !arena.contains(fragment.green)
            || arena.kind(fragment.green) != Some(SyntaxKind::Node)
            || arena.width(fragment.green) != fragment.to - fragment.from
        {
            return false;
        }

        let mut end = self.current;
        while let Some(token) = self.preparsed.get_token(end, &self.tokens)
            && token.kind != TokenKind::Eof
            && token.end() <= fragment.to
        {
            end += 1;
        }
        let last = end
            .checked_sub(1)
            .filter(|&last| last >= self.current)
            .and_then(|last| self.preparsed.token_indices.get(last).copied());
        let Some(last_raw) = last.filter(|&i| self.tokens.get(i).map(Token::end) == Some(fragment.to))
        else {
            return false;
        };

        self.next_reusable += 1;
        self.flush_trivia();
        self.builder.add_node(fragment.green);
        self.emitted = last_raw + 1;
        self.current = end;
        log::trace!("reused definition at {}..{}", fragment.from, fragment.to);
        self.record_fragment(fragment.green, fragment.from);
        true
    }

    /// End of the next definition header, or of the text.
    /// Only valid right after a definition, where the current token starts a header or is `Eof`.
    fn lookahead_end(&self) -> usize {
        let mut n = 0;
        loop {
            match self.preparsed.get_token(self.current + n, &self.tokens) {
                Some(token) if token.kind == TokenKind::Assign => return token.end(),
                Some(token) if token.kind == TokenKind::Eof => return token.start,
                Some(_) => n += 1,
                None => return self.tokens.last().map_or(0, Token::end),
            }
        }
    }

    fn record_fragment(&mut self, green: GreenNodeId, from: usize) {
        let to = from + self.builder.arena().width(green);
        let lookahead_to = self.lookahead_end();
        self.fragments.push(Fragment {
            green,
            from,
            to,
            lookahead_to,
        });
    }

    /// node := name '=' rule
    fn parse_node(&mut self) {
        let from = self.current_start();
        let node = self.emit_node(SyntaxKind::Node, |p| {
            if p.check(TokenKind::Ident) {
                p.emit_node(SyntaxKind::Identifier, |p| p.bump());
            } else {
                p.emit_node(SyntaxKind::Identifier, |p| p.missing(SyntaxKind::Error));
            }
            while p.check(TokenKind::Error) {
                p.emit_node(SyntaxKind::Error, |p| p.bump());
            }
            if p.check(TokenKind::Assign) {
                p.bump();
            }
            if p.at_rule_end() {
                p.missing(SyntaxKind::Error);
            } else {
                p.parse_alternative();
            }
        });
        if let Some(node) = node {
            self.record_fragment(node, from);
        }
    }

    /// A token that fits nowhere. A whole quoted token is taken at once.
    fn parse_stray(&mut self) {
        self.emit_node(SyntaxKind::Error, |p| {
            if !p.check(TokenKind::LiteralStart) {
                p.bump();
                return;
            }
            p.bump();
            while matches!(
                p.peek(),
                TokenKind::LiteralText | TokenKind::InvalidEscape | TokenKind::LiteralEnd
            ) {
                let closing = p.check(TokenKind::LiteralEnd);
                p.bump();
                if closing {
                    break;
                }
            }
        });
    }

    /// alt := seq ('|' seq)*
    fn parse_alternative(&mut self) {
        let marker = self.marker();
        self.parse_sequence();
        let mut count = 1;
        while self.check(TokenKind::Pipe) {
            self.bump();
            self.parse_sequence();
            count += 1;
        }
        if count > 1 {
            self.wrap_from(marker, SyntaxKind::Alternative);
        }
    }

    /// seq := item+
    fn parse_sequence(&mut self) {
        let marker = self.marker();
        let mut count = 0;
        while !self.at_rule_end() && !self.check(TokenKind::Pipe) {
            self.parse_item();
            count += 1;
        }
        match count {
            0 => self.missing(SyntaxKind::Error),
            1 => {}
            _ => self.wrap_from(marker, SyntaxKind::Sequence),
        }
    }

    fn parse_item(&mut self) {
        if self.at_atom_start() {
            self.parse_postfix();
        } else {
            self.parse_stray();
        }
    }

    /// postfix := atom ('*' | '?')*
    fn parse_postfix(&mut self) {
        let marker = self.marker();
        self.parse_atom();
        loop {
            let kind = match self.peek() {
                TokenKind::Star => SyntaxKind::Repetition,
                TokenKind::Question => SyntaxKind::Optional,
                _ => break,
            };
            self.builder.start_node_at(marker, kind);
            self.bump();
            self.builder.finish_node();
        }
    }

    fn parse_atom(&mut self) {
        match self.peek() {
            TokenKind::Ident if self.peek_ahead(1) == TokenKind::Colon => self.parse_label(),
            TokenKind::Ident => {
                self.emit_node(SyntaxKind::Identifier, |p| p.bump());
            }
            TokenKind::LiteralStart => self.parse_token(),
            TokenKind::ParenBegin => self.parse_group(),
            _ => self.parse_stray(),
        }
    }

    /// label := Ident ':' postfix
    fn parse_label(&mut self) {
        self.emit_node(SyntaxKind::Label, |p| {
            p.emit_node(SyntaxKind::Identifier, |p| p.bump());
            p.bump();
            if p.at_atom_start() && !p.at_boundary() {
                p.parse_postfix();
            } else {
                p.missing(SyntaxKind::Error);
            }
        });
    }

    /// token := "'" text "'"
    fn parse_token(&mut self) {
        self.emit_node(SyntaxKind::Token, |p| {
            p.bump();
            while matches!(p.peek(), TokenKind::LiteralText | TokenKind::InvalidEscape) {
                p.bump();
            }
            if p.check(TokenKind::LiteralEnd) {
                p.bump();
            } else {
                p.missing(SyntaxKind::UnclosedToken);
            }
        });
    }

    /// group := '(' rule ')'
    fn parse_group(&mut self) {
        self.emit_node(SyntaxKind::Group, |p| {
            p.bump();
            p.group_depth += 1;
            if !p.at_rule_end() {
                p.parse_alternative();
            } else if p.check(TokenKind::ParenEnd) {
                p.missing(SyntaxKind::Error);
            }
            p.group_depth -= 1;
            if p.check(TokenKind::ParenEnd) {
                p.bump();
            } else {
                p.missing(SyntaxKind::UnclosedGroup);
            }
        });
    }
}

/// Parse a token stream from scratch
pub fn parse_cst(tokens: Vec<Token>, preparsed: &PreParsedTokens) -> ParsedCst {
    Parser::new(tokens, preparsed).parse()
}

/// Parse a token stream into an existing arena, reusing the given fragments where they still fit
pub fn reparse_cst(
    tokens: Vec<Token>,
    preparsed: &PreParsedTokens,
    arena: GreenNodeArena,
    reusable: Vec<Fragment>,
) -> ParsedCst {
    Parser::with_fragments(tokens, preparsed, arena, reusable).parse()
}
