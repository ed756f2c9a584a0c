//! Typed AST overlay on the concrete syntax tree.
//!
//! Every typed node keeps the [`SyntaxNodeId`] of the concrete element it
//! wraps and is rebuilt from scratch after each parse. Concrete children a
//! builder cannot classify are collected into a shared list of unknowns
//! instead of being dropped.
pub mod visitor;

use crate::parser::{SyntaxKind, SyntaxNodeId, SyntaxTree, TokenKind};
use visitor::AstVisitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub syntax: SyntaxNodeId,
    pub nodes: Vec<Node>,
}

/// A definition `name = rule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub syntax: SyntaxNodeId,
    pub name: Option<Identifier>,
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub syntax: SyntaxNodeId,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub syntax: SyntaxNodeId,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub syntax: SyntaxNodeId,
    pub rule: Option<Box<Rule>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    pub syntax: SyntaxNodeId,
    pub rule: Option<Box<Rule>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optional {
    pub syntax: SyntaxNodeId,
    pub rule: Option<Box<Rule>>,
}

/// `label:rule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub syntax: SyntaxNodeId,
    pub label: Option<Identifier>,
    pub rule: Option<Box<Rule>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    pub syntax: SyntaxNodeId,
}

/// A quoted token such as `'='`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub syntax: SyntaxNodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Identifier(Identifier),
    Token(Token),
    Sequence(Sequence),
    Alternative(Alternative),
    Group(Group),
    Repetition(Repetition),
    Optional(Optional),
    Label(Label),
}

/// Borrowed view over any typed node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstRef<'a> {
    Grammar(&'a Grammar),
    Node(&'a Node),
    Sequence(&'a Sequence),
    Alternative(&'a Alternative),
    Group(&'a Group),
    Repetition(&'a Repetition),
    Optional(&'a Optional),
    Label(&'a Label),
    Identifier(&'a Identifier),
    Token(&'a Token),
}

/// Common interface of typed nodes
pub trait AstAcceptor {
    /// The concrete element this node wraps
    fn syntax(&self) -> SyntaxNodeId;
    /// Dispatch to the visitor method of this node's variant
    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V);
    /// Immediate typed children in source order
    fn children(&self) -> Vec<AstRef<'_>>;
}

fn is_error_element(tree: &SyntaxTree, id: SyntaxNodeId) -> bool {
    tree.kind(id).is_some_and(SyntaxKind::is_error)
        || tree.token_kind(id) == Some(TokenKind::InvalidEscape)
}

impl Grammar {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        kind == Some(SyntaxKind::Grammar)
    }

    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Self {
        let mut nodes = Vec::new();
        for &child in tree.children(syntax) {
            if Node::can_cast(tree.kind(child)) {
                nodes.push(Node::build(tree, child, unknowns));
            } else {
                unknowns.push(child);
            }
        }
        Self { syntax, nodes }
    }
}

impl Node {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        kind == Some(SyntaxKind::Node)
    }

    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Self {
        let mut name = None;
        let mut rule = None;
        let mut after_assign = false;
        for &child in tree.children(syntax) {
            let kind = tree.kind(child);
            if !after_assign && name.is_none() && Identifier::can_cast(kind) {
                name = Some(Identifier::build(tree, child, unknowns));
            } else if !after_assign && tree.token_kind(child) == Some(TokenKind::Assign) {
                after_assign = true;
                unknowns.push(child);
            } else if after_assign && rule.is_none() && Rule::can_cast(kind) {
                rule = Rule::build(tree, child, unknowns);
            } else {
                unknowns.push(child);
            }
        }
        Self { syntax, name, rule }
    }
}

fn build_rule_list(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Vec<Rule> {
    let mut rules = Vec::new();
    for &child in tree.children(syntax) {
        match Rule::build(tree, child, unknowns) {
            Some(rule) => rules.push(rule),
            None => unknowns.push(child),
        }
    }
    rules
}

fn build_inner_rule(
    tree: &SyntaxTree,
    syntax: SyntaxNodeId,
    unknowns: &mut Vec<SyntaxNodeId>,
) -> Option<Box<Rule>> {
    let mut rule = None;
    for &child in tree.children(syntax) {
        if rule.is_none() && Rule::can_cast(tree.kind(child)) {
            rule = Rule::build(tree, child, unknowns).map(Box::new);
        } else {
            unknowns.push(child);
        }
    }
    rule
}

macro_rules! list_rule {
    ($name:ident) => {
        impl $name {
            pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
                kind == Some(SyntaxKind::$name)
            }

            pub fn build(
                tree: &SyntaxTree,
                syntax: SyntaxNodeId,
                unknowns: &mut Vec<SyntaxNodeId>,
            ) -> Self {
                let rules = build_rule_list(tree, syntax, unknowns);
                Self { syntax, rules }
            }
        }
    };
}

macro_rules! wrapping_rule {
    ($name:ident) => {
        impl $name {
            pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
                kind == Some(SyntaxKind::$name)
            }

            pub fn build(
                tree: &SyntaxTree,
                syntax: SyntaxNodeId,
                unknowns: &mut Vec<SyntaxNodeId>,
            ) -> Self {
                let rule = build_inner_rule(tree, syntax, unknowns);
                Self { syntax, rule }
            }
        }
    };
}

list_rule!(Sequence);
list_rule!(Alternative);
wrapping_rule!(Group);
wrapping_rule!(Repetition);
wrapping_rule!(Optional);

impl Label {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        kind == Some(SyntaxKind::Label)
    }

    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Self {
        let mut label = None;
        let mut rule = None;
        for &child in tree.children(syntax) {
            let kind = tree.kind(child);
            if label.is_none() && rule.is_none() && Identifier::can_cast(kind) {
                label = Some(Identifier::build(tree, child, unknowns));
            } else if rule.is_none() && Rule::can_cast(kind) {
                rule = Rule::build(tree, child, unknowns).map(Box::new);
            } else {
                unknowns.push(child);
            }
        }
        Self {
            syntax,
            label,
            rule,
        }
    }
}

impl Identifier {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        kind == Some(SyntaxKind::Identifier)
    }

    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Self {
        unknowns.extend(
            tree.children(syntax)
                .iter()
                .copied()
                .filter(|&c| is_error_element(tree, c)),
        );
        Self { syntax }
    }

    /// The name as written, empty for a missing definition name
    pub fn name<'a>(&self, tree: &SyntaxTree, source: &'a str) -> &'a str {
        tree.text(self.syntax, source)
    }
}

impl Token {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        kind == Some(SyntaxKind::Token)
    }

    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Self {
        unknowns.extend(
            tree.children(syntax)
                .iter()
                .copied()
                .filter(|&c| is_error_element(tree, c)),
        );
        Self { syntax }
    }
}

impl Rule {
    pub fn can_cast(kind: Option<SyntaxKind>) -> bool {
        Identifier::can_cast(kind)
            || Token::can_cast(kind)
            || Sequence::can_cast(kind)
            || Alternative::can_cast(kind)
            || Group::can_cast(kind)
            || Repetition::can_cast(kind)
            || Optional::can_cast(kind)
            || Label::can_cast(kind)
    }

    /// Classify a concrete element as a rule, `None` when it is not one
    pub fn build(tree: &SyntaxTree, syntax: SyntaxNodeId, unknowns: &mut Vec<SyntaxNodeId>) -> Option<Self> {
        let rule = match tree.kind(syntax)? {
            SyntaxKind::Identifier => Rule::Identifier(Identifier::build(tree, syntax, unknowns)),
            SyntaxKind::Token => Rule::Token(Token::build(tree, syntax, unknowns)),
            SyntaxKind::Sequence => Rule::Sequence(Sequence::build(tree, syntax, unknowns)),
            SyntaxKind::Alternative => Rule::Alternative(Alternative::build(tree, syntax, unknowns)),
            SyntaxKind::Group => Rule::Group(Group::build(tree, syntax, unknowns)),
            SyntaxKind::Repetition => Rule::Repetition(Repetition::build(tree, syntax, unknowns)),
            SyntaxKind::Optional => Rule::Optional(Optional::build(tree, syntax, unknowns)),
            SyntaxKind::Label => Rule::Label(Label::build(tree, syntax, unknowns)),
            _ => return None,
        };
        Some(rule)
    }

    pub fn as_ast(&self) -> AstRef<'_> {
        match self {
            Rule::Identifier(n) => AstRef::Identifier(n),
            Rule::Token(n) => AstRef::Token(n),
            Rule::Sequence(n) => AstRef::Sequence(n),
            Rule::Alternative(n) => AstRef::Alternative(n),
            Rule::Group(n) => AstRef::Group(n),
            Rule::Repetition(n) => AstRef::Repetition(n),
            Rule::Optional(n) => AstRef::Optional(n),
            Rule::Label(n) => AstRef::Label(n),
        }
    }
}

fn inner(rule: Option<&Rule>) -> Vec<AstRef<'_>> {
    rule.map(Rule::as_ast).into_iter().collect()
}

macro_rules! acceptor {
    ($name:ident, $visit:ident, |$this:ident| $children:expr) => {
        impl AstAcceptor for $name {
            fn syntax(&self) -> SyntaxNodeId {
                self.syntax
            }

            fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
                visitor.$visit(self);
            }

            fn children(&self) -> Vec<AstRef<'_>> {
                let $this = self;
                $children
            }
        }
    };
}

acceptor!(Grammar, visit_grammar, |this| this
    .nodes
    .iter()
    .map(AstRef::Node)
    .collect());
acceptor!(Node, visit_node, |this| {
    let name = this.name.iter().map(AstRef::Identifier);
    name.chain(this.rule.iter().map(Rule::as_ast)).collect()
});
acceptor!(Sequence, visit_sequence, |this| this
    .rules
    .iter()
    .map(Rule::as_ast)
    .collect());
acceptor!(Alternative, visit_alternative, |this| this
    .rules
    .iter()
    .map(Rule::as_ast)
    .collect());
acceptor!(Group, visit_group, |this| inner(this.rule.as_deref()));
acceptor!(Repetition, visit_repetition, |this| inner(this.rule.as_deref()));
acceptor!(Optional, visit_optional, |this| inner(this.rule.as_deref()));
acceptor!(Label, visit_label, |this| {
    let label = this.label.iter().map(AstRef::Identifier);
    label.chain(inner(this.rule.as_deref())).collect()
});
acceptor!(Identifier, visit_identifier, |_this| Vec::new());
acceptor!(Token, visit_token, |_this| Vec::new());

impl AstAcceptor for Rule {
    fn syntax(&self) -> SyntaxNodeId {
        self.as_ast().syntax()
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit_rule(self);
    }

    fn children(&self) -> Vec<AstRef<'_>> {
        match self {
            Rule::Identifier(n) => n.children(),
            Rule::Token(n) => n.children(),
            Rule::Sequence(n) => n.children(),
            Rule::Alternative(n) => n.children(),
            Rule::Group(n) => n.children(),
            Rule::Repetition(n) => n.children(),
            Rule::Optional(n) => n.children(),
            Rule::Label(n) => n.children(),
        }
    }
}

macro_rules! dispatch {
    ($value:expr, |$node:ident| $body:expr) => {
        match $value {
            AstRef::Grammar($node) => $body,
            AstRef::Node($node) => $body,
            AstRef::Sequence($node) => $body,
            AstRef::Alternative($node) => $body,
            AstRef::Group($node) => $body,
            AstRef::Repetition($node) => $body,
            AstRef::Optional($node) => $body,
            AstRef::Label($node) => $body,
            AstRef::Identifier($node) => $body,
            AstRef::Token($node) => $body,
        }
    };
}

impl AstAcceptor for AstRef<'_> {
    fn syntax(&self) -> SyntaxNodeId {
        dispatch!(self, |node| node.syntax)
    }

    fn accept<V: AstVisitor + ?Sized>(&self, visitor: &mut V) {
        dispatch!(self, |node| node.accept(visitor))
    }

    fn children(&self) -> Vec<AstRef<'_>> {
        dispatch!(self, |node| node.children())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_to_cst;

    fn build(source: &str) -> (SyntaxTree, Grammar, Vec<SyntaxNodeId>) {
        let (tree, _) = parse_to_cst(source);
        let mut unknowns = Vec::new();
        let grammar = Grammar::build(&tree, tree.root(), &mut unknowns);
        (tree, grammar, unknowns)
    }

    fn significant_unknowns(tree: &SyntaxTree, unknowns: &[SyntaxNodeId]) -> Vec<SyntaxNodeId> {
        unknowns
            .iter()
            .copied()
            .filter(|&u| !tree.token_kind(u).is_some_and(TokenKind::is_structural))
            .collect()
    }

    #[test]
    fn test_build_definition() {
        let source = "Foo = 'Bar' | lab:Baz*";
        let (tree, grammar, unknowns) = build(source);
        assert!(significant_unknowns(&tree, &unknowns).is_empty());
        assert_eq!(grammar.nodes.len(), 1);

        let node = &grammar.nodes[0];
        assert_eq!(node.name.map(|n| n.name(&tree, source)), Some("Foo"));
        let Some(Rule::Alternative(alt)) = &node.rule else {
            panic!("expected an alternative, got {:?}", node.rule);
        };
        assert!(matches!(alt.rules[0], Rule::Token(_)));
        let Rule::Label(label) = &alt.rules[1] else {
            panic!("expected a label");
        };
        assert_eq!(label.label.map(|l| l.name(&tree, source)), Some("lab"));
        assert!(matches!(label.rule.as_deref(), Some(Rule::Repetition(_))));
    }

    #[test]
    fn test_unknowns_are_collected() {
        let source = "Foo=Bar2Boo\nBar2Boo='Bar'";
        let (tree, grammar, unknowns) = build(source);
        assert_eq!(grammar.nodes.len(), 2);
        let texts = significant_unknowns(&tree, &unknowns)
            .into_iter()
            .map(|u| tree.text(u, source))
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["2Boo", "2Boo"]);
    }

    #[test]
    fn test_missing_name_is_unknown() {
        let source = "='Foo'";
        let (tree, grammar, unknowns) = build(source);
        let unknowns = significant_unknowns(&tree, &unknowns);
        assert_eq!(unknowns.len(), 1);
        assert_eq!(tree.range(unknowns[0]), 0..0);
        assert_eq!(grammar.nodes[0].name.map(|n| n.name(&tree, source)), Some(""));
    }

    #[test]
    fn test_token_errors() {
        let source = "Foo='a\\q'";
        let (tree, _, unknowns) = build(source);
        let unknowns = significant_unknowns(&tree, &unknowns);
        assert_eq!(unknowns.len(), 1);
        assert_eq!(tree.token_kind(unknowns[0]), Some(TokenKind::InvalidEscape));
    }

    #[test]
    fn test_children_in_source_order() {
        let source = "Foo = (A B)?";
        let (tree, grammar, _) = build(source);
        let node = AstRef::Node(&grammar.nodes[0]);
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], AstRef::Identifier(_)));
        let AstRef::Optional(optional) = children[1] else {
            panic!("expected an optional");
        };
        let group = optional.children();
        let AstRef::Group(group) = group[0] else {
            panic!("expected a group");
        };
        let seq = group.children();
        assert_eq!(tree.text(seq[0].syntax(), source), "A B");
    }

    #[test]
    fn test_rule_children_delegate_to_variant() {
        let (_, grammar, _) = build("Foo = A | 'b' | c:C");
        let rule = grammar.nodes[0].rule.as_ref().unwrap();
        assert!(matches!(rule, Rule::Alternative(_)));
        let children = rule.children();
        assert_eq!(children.len(), 3);
        assert!(matches!(children[0], AstRef::Identifier(_)));
        assert!(matches!(children[1], AstRef::Token(_)));
        assert!(matches!(children[2], AstRef::Label(_)));
    }
}
