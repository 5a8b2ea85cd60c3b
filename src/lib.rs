//! Compiler for the Biological Expression Language (BEL).
//!
//! Parses line-oriented BEL documents, resolves namespace and annotation
//! resources, validates statements, and builds a content-addressed
//! multigraph of typed biological entities and qualified relations.
//!
//! The pipeline is synchronous and streaming: the lexer yields logical
//! lines, the control parser maintains the citation/evidence/annotation
//! context, the term parser produces typed entities, and the graph assigns
//! every node and edge a stable SHA-512 identity derived from its canonical
//! form.

pub mod canon;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod resolver;

pub use error::{BelError, BelWarning, Severity, WarningKind};
pub use graph::{BelGraph, DocumentMetadata, EdgeKey, NodeId, ResourceSpec};
pub use parser::{
    CancelToken, Compiler, CompilerOptions, compile_with, parse, parse_with_options,
};
pub use resolver::{HttpLoader, ResourceLoader, Resolver, Validator};

/// Compile a BEL document, fetching namespace and annotation resources over
/// HTTP. Use [`compile_with`] to supply a custom [`Resolver`].
pub fn compile<I>(lines: I, options: CompilerOptions) -> Result<BelGraph, BelError>
where
    I: IntoIterator<Item = String>,
{
    let resolver = Resolver::with_http()?;
    compile_with(lines, options, resolver)
}
