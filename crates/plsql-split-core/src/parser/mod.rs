//! PL/SQL Parser
//!
//! A hand-written structural recursive descent parser. It builds a parse
//! tree of rule nodes over the token stream, reports syntax errors to a
//! listener, and lets other components walk the tree with enter/exit events.

pub mod context;
mod error;
#[allow(clippy::module_inception)]
mod parser;
mod stream;
mod tree;

pub use context::render_context;
pub use error::{
    enhance_message, SyntaxError, SyntaxErrorCollector, SyntaxErrorListener, NESTED_BLOCK_HINT,
};
pub use parser::{ParseOptions, Parser};
pub use stream::TokenStream;
pub use tree::{ParseTree, ParseTreeListener, RuleContext, RuleKind, RuleNode, RuleRole};
