//! Parse tree produced by the parser, and the listener-based walker over it.

use super::stream::TokenStream;
use crate::lexer::Token;

/// Grammar rules recorded in the parse tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// The whole script.
    SqlScript,
    /// One top-level unit of the script.
    UnitStatement,
    /// A SQL statement, at top level or inside PL/SQL.
    SqlStatement,
    /// SELECT, INSERT, UPDATE, DELETE, MERGE, LOCK TABLE, EXPLAIN PLAN.
    DataManipulation,
    /// DDL other than stored PL/SQL units.
    DataDefinition,
    /// COMMIT, ROLLBACK, SAVEPOINT, SET TRANSACTION.
    TransactionControl,
    /// A SQL*Plus client command such as `SET SERVEROUTPUT ON`.
    SqlPlusCommand,
    /// `CALL routine(...)`.
    CallStatement,
    /// 12c `WITH FUNCTION` inline PL/SQL declarations.
    WithClause,
    /// `[DECLARE ...] BEGIN ... END;`
    AnonymousBlock,
    /// `CREATE PROCEDURE`.
    CreateProcedureBody,
    /// `CREATE FUNCTION`.
    CreateFunctionBody,
    /// `CREATE PACKAGE` specification.
    CreatePackage,
    /// `CREATE PACKAGE BODY`.
    CreatePackageBody,
    /// `CREATE TRIGGER`.
    CreateTrigger,
    /// `CREATE TYPE` specification.
    CreateType,
    /// `CREATE TYPE BODY`.
    CreateTypeBody,
    /// Declarations between `IS`/`AS`/`DECLARE` and `BEGIN`.
    DeclareSection,
    /// A procedure or function declared inside another unit.
    SubprogramBody,
    /// `BEGIN ... [EXCEPTION ...] END [label]`.
    Body,
    /// Statements inside a body or a control branch.
    SeqOfStatements,
    /// One PL/SQL statement.
    PlsqlStatement,
    /// Nested `BEGIN ... END;` statement.
    Block,
    /// Nested `DECLARE ... BEGIN ... END;` statement.
    DeclareBlock,
    /// IF, LOOP, FOR, WHILE and CASE statements.
    ControlStatement,
    /// `WHEN ... THEN ...` in an exception section.
    ExceptionHandler,
}

/// What a rule means for statement boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleRole {
    /// Marks a statement when entered outside any block.
    Statement,
    /// Like [`RuleRole::Statement`], typed by its leading keyword.
    TransactionControl,
    /// Opens a block and is a statement of its own when outermost.
    ExecutableBlock,
    /// Opens a block nested in something else.
    NestedBlock,
    /// Structure only.
    Other,
}

impl RuleKind {
    /// Returns the boundary role of this rule.
    #[must_use]
    pub const fn role(self) -> RuleRole {
        match self {
            Self::UnitStatement
            | Self::SqlStatement
            | Self::DataManipulation
            | Self::DataDefinition
            | Self::SqlPlusCommand
            | Self::CallStatement => RuleRole::Statement,
            Self::TransactionControl => RuleRole::TransactionControl,
            Self::AnonymousBlock
            | Self::CreateProcedureBody
            | Self::CreateFunctionBody
            | Self::CreatePackage
            | Self::CreatePackageBody
            | Self::CreateTrigger
            | Self::CreateType
            | Self::CreateTypeBody => RuleRole::ExecutableBlock,
            Self::Block | Self::DeclareBlock | Self::DeclareSection | Self::WithClause => {
                RuleRole::NestedBlock
            }
            Self::SqlScript
            | Self::SubprogramBody
            | Self::Body
            | Self::SeqOfStatements
            | Self::PlsqlStatement
            | Self::ControlStatement
            | Self::ExceptionHandler => RuleRole::Other,
        }
    }
}

/// A node of the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    /// The grammar rule.
    pub kind: RuleKind,
    /// Index of the first token consumed by the rule.
    pub start: Option<usize>,
    /// Index of the last token consumed by the rule.
    pub stop: Option<usize>,
    /// Child node ids, in source order.
    pub children: Vec<usize>,
}

/// An arena-allocated parse tree. Node 0 is the root once parsing ran.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    nodes: Vec<RuleNode>,
}

/// The view of a rule handed to a [`ParseTreeListener`].
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'t> {
    /// The grammar rule.
    pub kind: RuleKind,
    /// First token of the rule, absent if the rule matched nothing.
    pub start: Option<&'t Token>,
    /// Last token of the rule, absent if the rule matched nothing.
    pub stop: Option<&'t Token>,
}

/// Receives rule events from [`ParseTree::walk`].
pub trait ParseTreeListener {
    /// Called before the children of a rule are walked.
    fn enter_rule(&mut self, _ctx: &RuleContext<'_>) {}

    /// Called after the children of a rule are walked.
    fn exit_rule(&mut self, _ctx: &RuleContext<'_>) {}
}

impl ParseTree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node under `parent` and returns its id.
    pub(crate) fn open(&mut self, kind: RuleKind, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(RuleNode {
            kind,
            start: None,
            stop: None,
            children: Vec::new(),
        });
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.push(id);
        }
        id
    }

    /// Records the token range of a finished node.
    pub(crate) fn close(&mut self, id: usize, range: Option<(usize, usize)>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.start = range.map(|(start, _)| start);
            node.stop = range.map(|(_, stop)| stop);
        }
    }

    /// Returns the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<&RuleNode> {
        self.nodes.first()
    }

    /// Returns the node with the given id.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&RuleNode> {
        self.nodes.get(id)
    }

    /// Returns all nodes in creation order, which is pre-order.
    #[must_use]
    pub fn nodes(&self) -> &[RuleNode] {
        &self.nodes
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks the tree depth-first from the root, calling `enter_rule`
    /// before and `exit_rule` after each node's children.
    pub fn walk<L: ParseTreeListener + ?Sized>(&self, tokens: &TokenStream<'_>, listener: &mut L) {
        if !self.nodes.is_empty() {
            self.walk_node(0, tokens, listener);
        }
    }

    fn walk_node<L: ParseTreeListener + ?Sized>(
        &self,
        id: usize,
        tokens: &TokenStream<'_>,
        listener: &mut L,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let ctx = RuleContext {
            kind: node.kind,
            start: node.start.and_then(|i| tokens.get(i)),
            stop: node.stop.and_then(|i| tokens.get(i)),
        };
        listener.enter_rule(&ctx);
        for &child in &node.children {
            self.walk_node(child, tokens, listener);
        }
        listener.exit_rule(&ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ParseTreeListener for Recorder {
        fn enter_rule(&mut self, ctx: &RuleContext<'_>) {
            self.events.push(format!("enter {:?}", ctx.kind));
        }

        fn exit_rule(&mut self, ctx: &RuleContext<'_>) {
            self.events.push(format!("exit {:?}", ctx.kind));
        }
    }

    #[test]
    fn test_roles() {
        assert_eq!(RuleKind::DataManipulation.role(), RuleRole::Statement);
        assert_eq!(RuleKind::TransactionControl.role(), RuleRole::TransactionControl);
        assert_eq!(RuleKind::CreateTrigger.role(), RuleRole::ExecutableBlock);
        assert_eq!(RuleKind::DeclareBlock.role(), RuleRole::NestedBlock);
        assert_eq!(RuleKind::SeqOfStatements.role(), RuleRole::Other);
    }

    #[test]
    fn test_walk_order() {
        let stream = TokenStream::new("BEGIN NULL; END;");
        let mut tree = ParseTree::new();
        let root = tree.open(RuleKind::SqlScript, None);
        let unit = tree.open(RuleKind::UnitStatement, Some(root));
        let block = tree.open(RuleKind::AnonymousBlock, Some(unit));
        tree.close(block, Some((0, 4)));
        tree.close(unit, Some((0, 4)));
        tree.close(root, Some((0, 4)));

        let mut recorder = Recorder::default();
        tree.walk(&stream, &mut recorder);
        assert_eq!(
            recorder.events,
            vec![
                "enter SqlScript",
                "enter UnitStatement",
                "enter AnonymousBlock",
                "exit AnonymousBlock",
                "exit UnitStatement",
                "exit SqlScript",
            ]
        );
    }

    #[test]
    fn test_context_tokens() {
        struct Capture(Vec<(Option<usize>, Option<usize>)>);
        impl ParseTreeListener for Capture {
            fn enter_rule(&mut self, ctx: &RuleContext<'_>) {
                self.0
                    .push((ctx.start.map(Token::column), ctx.stop.map(Token::column)));
            }
        }

        let stream = TokenStream::new("COMMIT;");
        let mut tree = ParseTree::new();
        let root = tree.open(RuleKind::SqlScript, None);
        let empty = tree.open(RuleKind::UnitStatement, Some(root));
        tree.close(empty, None);
        tree.close(root, Some((0, 1)));

        let mut capture = Capture(Vec::new());
        tree.walk(&stream, &mut capture);
        assert_eq!(capture.0, vec![(Some(0), Some(6)), (None, None)]);
    }

    #[test]
    fn test_empty_tree_walks_nothing() {
        let stream = TokenStream::new("");
        let mut recorder = Recorder::default();
        ParseTree::new().walk(&stream, &mut recorder);
        assert!(recorder.events.is_empty());
        assert!(ParseTree::new().root().is_none());
    }
}
