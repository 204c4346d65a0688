// Parsing subsystem facade: grammar registry plus the syntax-tree model.

pub mod registry;
pub mod tree;

pub use registry::{GrammarLoader, GrammarRegistry, ParseError};
pub use tree::{ParseResult, ParseStats, Point, SyntaxNode, SyntaxTree};
