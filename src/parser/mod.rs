//! The compiler driver: a synchronous state machine over logical lines.
//!
//! Each line is either a control directive (applied to the context, the
//! resolver, or the graph) or a BEL statement (parsed, validated, and
//! committed). A statement that fails any check appends exactly one warning
//! and commits nothing; fatal conditions abort with [`BelError`].

pub mod context;
pub mod control;
pub mod scan;
pub mod term;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;
use tracing::debug;

use crate::error::{BelError, BelWarning, WarningKind};
use crate::graph::{BelGraph, ResourceSpec};
use crate::lexer::{LexEvent, LogicalLines};
use crate::model::edge::{Annotations, EdgeData};
use crate::model::{Citation, CitationType};
use crate::parser::context::ParserContext;
use crate::parser::control::{ControlError, DefineSpec, Directive, UnsetTarget};
use crate::parser::term::{ParsedStatement, RelationStatement, TermParser, Trace};
use crate::resolver::{ResourceLoader, Resolver, ValidationFailure, Validator};

/// Parsing modes, fixed for one compilation.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    pub allow_nested: bool,
    pub allow_naked_names: bool,
    pub citation_clearing: bool,
    pub disallow_unqualified_translocations: bool,
    /// Annotation keywords that every qualified statement must carry.
    pub required_annotations: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            allow_nested: false,
            allow_naked_names: false,
            citation_clearing: true,
            disallow_unqualified_translocations: true,
            required_annotations: Vec::new(),
        }
    }
}

/// Cooperative cancellation, checked between logical lines.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Provenance snapshot for one qualified statement.
struct QualifiedContext {
    citation: Citation,
    evidence: String,
    annotations: Annotations,
}

pub struct Compiler<L> {
    graph: BelGraph,
    context: ParserContext,
    resolver: Resolver<L>,
    options: CompilerOptions,
    namespace_validators: BTreeMap<String, Arc<Validator>>,
    annotation_validators: BTreeMap<String, Arc<Validator>>,
    cancel: Option<CancelToken>,
}

impl<L: ResourceLoader> Compiler<L> {
    pub fn new(options: CompilerOptions, resolver: Resolver<L>) -> Self {
        Self {
            graph: BelGraph::new(),
            context: ParserContext::new(),
            resolver,
            options,
            namespace_validators: BTreeMap::new(),
            annotation_validators: BTreeMap::new(),
            cancel: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Drive the full pipeline over a stream of physical lines.
    pub fn compile<I>(mut self, lines: I) -> Result<BelGraph, BelError>
    where
        I: IntoIterator<Item = String>,
    {
        for event in LogicalLines::new(lines.into_iter()) {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(BelError::Cancelled);
            }
            match event {
                LexEvent::Line { number, text } => self.process_line(number, &text)?,
                LexEvent::UnterminatedQuote { number, text } => {
                    self.graph.push_warning(BelWarning::new(
                        number,
                        text,
                        WarningKind::BelSyntax,
                        "unterminated quoted string at end of input",
                    ));
                }
            }
        }

        if self.graph.metadata.name.is_none() {
            return Err(BelError::MissingDocumentMetadata("Name"));
        }
        if self.graph.metadata.version.is_none() {
            return Err(BelError::MissingDocumentMetadata("Version"));
        }
        Ok(self.graph)
    }

    fn process_line(&mut self, number: u64, text: &str) -> Result<(), BelError> {
        match control::classify(text) {
            Ok(Some(directive)) => self.apply_directive(number, text, directive),
            Ok(None) => {
                self.process_statement(number, text);
                Ok(())
            }
            Err(ControlError::MalformedDefine { message }) => Err(BelError::MalformedDefine {
                line: number,
                message,
            }),
            Err(ControlError::Recoverable(issue)) => {
                self.graph
                    .push_warning(BelWarning::new(number, text, issue.kind, issue.message));
                Ok(())
            }
        }
    }

    fn apply_directive(
        &mut self,
        number: u64,
        text: &str,
        directive: Directive,
    ) -> Result<(), BelError> {
        match directive {
            Directive::SetDocument { key, value } => {
                if key == "Version" && semver::Version::parse(&value).is_err() {
                    self.graph.push_warning(BelWarning::new(
                        number,
                        text,
                        WarningKind::VersionFormat,
                        format!("document version \"{value}\" is not semantic"),
                    ));
                }
                if !self.graph.metadata.set(&key, value) {
                    self.graph.push_warning(BelWarning::new(
                        number,
                        text,
                        WarningKind::BelSyntax,
                        format!("unknown document metadata key \"{key}\""),
                    ));
                }
                Ok(())
            }
            Directive::DefineNamespace { keyword, spec } => {
                self.define_namespace(number, text, keyword, spec)
            }
            Directive::DefineAnnotation { keyword, spec } => {
                self.define_annotation(number, keyword, spec)
            }
            Directive::SetCitation { parts } => {
                self.set_citation(number, text, parts);
                Ok(())
            }
            Directive::SetEvidence { text: evidence, legacy } => {
                if legacy {
                    self.graph.push_warning(BelWarning::debug(
                        number,
                        text,
                        WarningKind::BelSyntax,
                        24,
                        "legacy SET SupportingText normalized to SET Evidence",
                    ));
                }
                self.context.evidence = Some(evidence);
                Ok(())
            }
            Directive::SetStatementGroup { name } => {
                self.context.statement_group = Some(name);
                Ok(())
            }
            Directive::SetAnnotation { key, values } => {
                self.set_annotation(number, text, key, values);
                Ok(())
            }
            Directive::Unset { target } => {
                self.unset(number, text, target);
                Ok(())
            }
        }
    }

    fn define_namespace(
        &mut self,
        number: u64,
        text: &str,
        keyword: String,
        spec: DefineSpec,
    ) -> Result<(), BelError> {
        let (resource_spec, validator) = match spec {
            DefineSpec::Url(url) => {
                let resource = self.resolver.resolve(&url)?;
                if let Some(remote) = resource.keyword.as_deref() {
                    if remote != keyword {
                        self.graph.push_warning(BelWarning::new(
                            number,
                            text,
                            WarningKind::NamespaceKeywordMismatch,
                            format!(
                                "namespace defined as \"{keyword}\" but its resource declares \"{remote}\""
                            ),
                        ));
                    }
                }
                (ResourceSpec::Url(url), Arc::clone(&resource.validator))
            }
            DefineSpec::Pattern(pattern) => {
                let regex = Regex::new(&pattern).map_err(|err| BelError::MalformedDefine {
                    line: number,
                    message: format!("invalid namespace pattern: {err}"),
                })?;
                (
                    ResourceSpec::Pattern(pattern),
                    Arc::new(Validator::Regex(regex)),
                )
            }
            DefineSpec::List(values) => (
                ResourceSpec::List(values.clone()),
                Arc::new(Validator::enumerated(values)),
            ),
        };

        if !self.graph.declare_namespace(&keyword, resource_spec) {
            return Err(BelError::RedefinedNamespace { keyword });
        }
        debug!(keyword = %keyword, "namespace declared");
        self.namespace_validators.insert(keyword, validator);
        Ok(())
    }

    fn define_annotation(
        &mut self,
        number: u64,
        keyword: String,
        spec: DefineSpec,
    ) -> Result<(), BelError> {
        let (resource_spec, validator) = match spec {
            DefineSpec::Url(url) => {
                let resource = self.resolver.resolve(&url)?;
                (ResourceSpec::Url(url), Arc::clone(&resource.validator))
            }
            DefineSpec::Pattern(pattern) => {
                let regex = Regex::new(&pattern).map_err(|err| BelError::MalformedDefine {
                    line: number,
                    message: format!("invalid annotation pattern: {err}"),
                })?;
                (
                    ResourceSpec::Pattern(pattern),
                    Arc::new(Validator::Regex(regex)),
                )
            }
            DefineSpec::List(values) => (
                ResourceSpec::List(values.clone()),
                Arc::new(Validator::enumerated(values)),
            ),
        };

        if !self.graph.declare_annotation(&keyword, resource_spec) {
            return Err(BelError::RedefinedAnnotation { keyword });
        }
        debug!(keyword = %keyword, "annotation declared");
        self.annotation_validators.insert(keyword, validator);
        Ok(())
    }

    fn set_citation(&mut self, number: u64, text: &str, parts: Vec<String>) {
        if parts.len() < 2 || parts.len() > 6 {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::InvalidCitation,
                format!("citation takes 2 to 6 fields, found {}", parts.len()),
            ));
            return;
        }

        let Some(citation_type) = CitationType::parse(&parts[0]) else {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::InvalidCitationType,
                format!("unknown citation type \"{}\"", parts[0]),
            ));
            return;
        };

        let (title, reference) = if parts.len() == 2 {
            (None, parts[1].clone())
        } else {
            (Some(parts[1].clone()), parts[2].clone())
        };

        if citation_type.requires_numeric_reference()
            && !(!reference.is_empty() && reference.chars().all(|c| c.is_ascii_digit()))
        {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::InvalidPubMedIdentifier,
                format!("PubMed reference \"{reference}\" is not numeric"),
            ));
            return;
        }

        let mut citation = Citation::new(citation_type, reference);
        citation.title = title;
        citation.date = parts.get(3).cloned().filter(|v| !v.is_empty());
        citation.authors = parts
            .get(4)
            .map(|authors| {
                authors
                    .split('|')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        citation.comment = parts.get(5).cloned().filter(|v| !v.is_empty());

        self.context
            .set_citation(citation, self.options.citation_clearing);
    }

    fn set_annotation(&mut self, number: u64, text: &str, key: String, values: Vec<String>) {
        let Some(validator) = self.annotation_validators.get(&key) else {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::UndefinedAnnotation,
                format!("annotation \"{key}\" is not defined"),
            ));
            return;
        };

        for value in &values {
            if let Err(failure) = validator.validate(value, None) {
                let kind = match failure {
                    ValidationFailure::PatternMismatch => WarningKind::MissingAnnotationRegex,
                    _ => WarningKind::IllegalAnnotationValue,
                };
                self.graph.push_warning(BelWarning::new(
                    number,
                    text,
                    kind,
                    format!("\"{value}\" is not a valid value for annotation \"{key}\""),
                ));
                return;
            }
        }

        self.context
            .annotations
            .insert(key, values.into_iter().collect());
    }

    fn unset(&mut self, number: u64, text: &str, target: UnsetTarget) {
        match target {
            UnsetTarget::All => self.context.unset_all(),
            UnsetTarget::Keys(keys) => {
                for key in keys {
                    if !self.context.unset(&key) {
                        self.graph.push_warning(BelWarning::new(
                            number,
                            text,
                            WarningKind::MissingAnnotationKey,
                            format!("cannot unset \"{key}\"; it is not set"),
                        ));
                    }
                }
            }
        }
    }

    fn process_statement(&mut self, number: u64, text: &str) {
        let mut parser = TermParser::new(&self.options, Some(&self.namespace_validators));
        let parsed = match parser.parse_statement(text) {
            Ok(parsed) => parsed,
            Err(issue) => {
                self.graph
                    .push_warning(BelWarning::new(number, text, issue.kind, issue.message));
                return;
            }
        };
        let traces = std::mem::take(&mut parser.traces);

        // A statement that parsed commits its entities and their inferred
        // unqualified edges regardless of the provenance context; only the
        // qualified edge itself is withheld when the context check fails.
        match parsed {
            ParsedStatement::Term(term) => {
                self.commit_traces(number, text, traces);
                self.graph.add_entity(term.entity);
            }
            ParsedStatement::Relation(statement) => {
                self.commit_traces(number, text, traces);
                let ctx = if statement.relation.allows_unqualified() {
                    None
                } else {
                    self.qualified_context(number, text)
                };
                self.add_statement_edge(number, text, *statement, ctx.as_ref());
            }
            ParsedStatement::Nested {
                source,
                relation,
                inner,
            } => {
                self.commit_traces(number, text, traces);
                let needs_context =
                    !relation.allows_unqualified() || !inner.relation.allows_unqualified();
                let ctx = if needs_context {
                    self.qualified_context(number, text)
                } else {
                    None
                };
                let outer = RelationStatement {
                    source,
                    relation,
                    target: inner.source.clone(),
                };
                self.add_statement_edge(number, text, outer, ctx.as_ref());
                self.add_statement_edge(number, text, *inner, ctx.as_ref());
            }
        }
    }

    /// Snapshot and check the provenance context for a qualified statement;
    /// records the single warning and returns `None` on failure.
    fn qualified_context(&mut self, number: u64, text: &str) -> Option<QualifiedContext> {
        let Some(citation) = self.context.citation.clone() else {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::MissingCitation,
                "qualified statement outside a citation context",
            ));
            return None;
        };
        if !citation.is_consistent() {
            self.graph.push_warning(BelWarning::new(
                number,
                text,
                WarningKind::InvalidCitation,
                "citation database and reference are inconsistent",
            ));
            return None;
        }
        let evidence = match self
            .context
            .evidence
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
        {
            Some(evidence) => evidence.to_string(),
            None => {
                self.graph.push_warning(BelWarning::new(
                    number,
                    text,
                    WarningKind::MissingEvidence,
                    "qualified statement without evidence",
                ));
                return None;
            }
        };
        for key in &self.options.required_annotations {
            if !self.context.annotations.contains_key(key) {
                self.graph.push_warning(BelWarning::new(
                    number,
                    text,
                    WarningKind::MissingAnnotationKey,
                    format!("required annotation \"{key}\" is not set"),
                ));
                return None;
            }
        }
        Some(QualifiedContext {
            citation,
            evidence,
            annotations: self.context.annotations.clone(),
        })
    }

    fn add_statement_edge(
        &mut self,
        number: u64,
        text: &str,
        statement: RelationStatement,
        ctx: Option<&QualifiedContext>,
    ) {
        let RelationStatement {
            source,
            relation,
            target,
        } = statement;
        let source_id = self.graph.add_entity(source.entity);
        let target_id = self.graph.add_entity(target.entity);

        if relation.allows_unqualified() {
            self.graph.add_unqualified_edge(source_id, target_id, relation);
            return;
        }
        let Some(ctx) = ctx else {
            return;
        };

        let data = EdgeData {
            relation,
            source: source.participant,
            target: target.participant,
            citation: Some(ctx.citation.clone()),
            evidence: Some(ctx.evidence.clone()),
            annotations: ctx.annotations.clone(),
            line: Some(number),
        };
        let reversed = relation.is_two_way().then(|| data.reversed());
        if let Err(err) = self.graph.add_qualified_edge(source_id, target_id, data) {
            self.graph
                .push_warning(BelWarning::new(number, text, err.kind(), err.to_string()));
            return;
        }
        if let Some(reversed) = reversed {
            self.graph.insert_edge(target_id, source_id, reversed);
        }
    }

    fn commit_traces(&mut self, number: u64, text: &str, traces: Vec<Trace>) {
        for trace in traces {
            self.graph
                .push_warning(BelWarning::debug(number, text, trace.kind, trace.code, trace.message));
        }
    }
}

/// Compile a document with an explicit resolver.
pub fn compile_with<L, I>(
    lines: I,
    options: CompilerOptions,
    resolver: Resolver<L>,
) -> Result<BelGraph, BelError>
where
    L: ResourceLoader,
    I: IntoIterator<Item = String>,
{
    Compiler::new(options, resolver).compile(lines)
}

/// Parse one statement without validation or graph construction.
pub fn parse(statement: &str) -> Result<ParsedStatement, BelWarning> {
    parse_with_options(statement, &CompilerOptions::default())
}

pub fn parse_with_options(
    statement: &str,
    options: &CompilerOptions,
) -> Result<ParsedStatement, BelWarning> {
    let mut parser = TermParser::new(options, None);
    parser
        .parse_statement(statement)
        .map_err(|issue| BelWarning::new(1, statement, issue.kind, issue.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::model::Relation;
    use crate::model::entity::Entity;
    use crate::resolver::LoadError;

    const SAMPLE_BELNS: &str = "\
[Namespace]
Keyword=HGNC

[Values]
AKT1|GRP
EGFR|GRP
A|GRP
B|GRP
C|GRP
";

    struct StaticLoader;

    impl ResourceLoader for StaticLoader {
        fn load(&self, url: &str) -> Result<String, LoadError> {
            if url.contains("missing") {
                return Err(LoadError {
                    message: "not found".to_string(),
                });
            }
            Ok(SAMPLE_BELNS.to_string())
        }
    }

    /// Route compiler tracing to the test output, honoring `RUST_LOG`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn compile_text(text: &str) -> Result<BelGraph, BelError> {
        compile_options_text(text, CompilerOptions::default())
    }

    fn compile_options_text(text: &str, options: CompilerOptions) -> Result<BelGraph, BelError> {
        init_tracing();
        compile_with(
            text.lines().map(str::to_string),
            options,
            Resolver::new(StaticLoader),
        )
    }

    const HEADER: &str = "\
SET DOCUMENT Name = \"T1\"
SET DOCUMENT Version = \"1.0.0\"
DEFINE NAMESPACE HGNC AS URL \"https://example/hgnc.belns\"
";

    fn with_header(body: &str) -> String {
        format!("{HEADER}{body}")
    }

    #[test]
    fn minimal_qualified_edge_compiles() {
        let graph = compile_text(&with_header(
            "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\np(HGNC:AKT1) -> p(HGNC:EGFR)\n",
        ))
        .expect("compiles");

        assert!(graph.warnings().is_empty());
        // 2 proteins + 2 rnas + 2 genes
        assert_eq!(graph.node_count(), 6);
        let qualified: Vec<_> = graph
            .edges()
            .filter(|(_, _, d)| d.relation == Relation::Increases)
            .collect();
        assert_eq!(qualified.len(), 1);
        let (_, _, data) = qualified[0];
        assert_eq!(data.citation.as_ref().map(|c| c.db.as_str()), Some("pubmed"));
        assert_eq!(
            data.citation.as_ref().map(|c| c.reference.as_str()),
            Some("12345")
        );
        assert_eq!(data.evidence.as_deref(), Some("ex"));
        assert_eq!(data.line, Some(6));
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::TranslatedTo)
                .count(),
            2
        );
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::TranscribedTo)
                .count(),
            2
        );
    }

    #[test]
    fn missing_citation_is_recoverable() {
        let graph = compile_text(&with_header("p(HGNC:A) -- p(HGNC:B)\n")).expect("compiles");
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::Association)
                .count(),
            0
        );
        let warnings = graph.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingCitation);
        assert_eq!(warnings[0].line, 4);
        // The endpoints and their inferred chains still commit; only the
        // qualified edge is withheld.
        assert_eq!(graph.node_count(), 6);
        assert!(graph.edges().all(|(_, _, d)| d.relation.allows_unqualified()));
    }

    #[test]
    fn correlations_emit_both_directions_under_one_hash() {
        let graph = compile_text(&with_header(
            "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\np(HGNC:A) positiveCorrelation p(HGNC:B)\n",
        ))
        .expect("compiles");

        let correlations: Vec<_> = graph
            .edges()
            .filter(|(_, _, d)| d.relation == Relation::PositiveCorrelation)
            .collect();
        assert_eq!(correlations.len(), 2);
        let (src0, tgt0, _) = correlations[0];
        let (src1, tgt1, _) = correlations[1];
        assert_eq!(src0, tgt1);
        assert_eq!(tgt0, src1);

        let keys: Vec<_> = graph
            .edge_entries()
            .filter(|(_, data)| data.relation == Relation::PositiveCorrelation)
            .map(|(key, _)| key.key.clone())
            .collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
    }

    #[test]
    fn nested_statements_are_rejected_by_default() {
        let graph = compile_text(&with_header(
            "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\np(HGNC:A) -> (p(HGNC:B) -> p(HGNC:C))\n",
        ))
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::NestedRelation);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nested_statements_expand_when_allowed() {
        let options = CompilerOptions {
            allow_nested: true,
            ..CompilerOptions::default()
        };
        let graph = compile_options_text(
            &with_header(
                "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\np(HGNC:A) -> (p(HGNC:B) -| p(HGNC:C))\n",
            ),
            options,
        )
        .expect("compiles");
        assert!(graph.warnings().is_empty());
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::Increases)
                .count(),
            1
        );
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::Decreases)
                .count(),
            1
        );
    }

    #[test]
    fn citation_clearing_drops_evidence_and_annotations() {
        let graph = compile_text(&with_header(
            "DEFINE ANNOTATION CellLine AS LIST {\"HeLa\"}\n\
             SET STATEMENT_GROUP = \"g1\"\n\
             SET Citation = {\"PubMed\",\"Title\",\"11111\"}\n\
             SET Evidence = \"first\"\n\
             SET CellLine = \"HeLa\"\n\
             SET Citation = {\"PubMed\",\"Title\",\"22222\"}\n\
             p(HGNC:A) -> p(HGNC:B)\n",
        ))
        .expect("compiles");

        let warnings = graph.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingEvidence);
    }

    #[test]
    fn statement_group_survives_citation_clearing() {
        let graph = compile_text(&with_header(
            "SET STATEMENT_GROUP = \"g1\"\n\
             SET Citation = {\"PubMed\",\"Title\",\"11111\"}\n\
             UNSET STATEMENT_GROUP\n",
        ))
        .expect("compiles");
        // If clearing had dropped the group, UNSET would warn.
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn undeclared_annotations_warn() {
        let graph = compile_text(&with_header("SET CellLine = \"HeLa\"\n")).expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::UndefinedAnnotation);
    }

    #[test]
    fn illegal_annotation_values_warn() {
        let graph = compile_text(&with_header(
            "DEFINE ANNOTATION CellLine AS LIST {\"HeLa\"}\nSET CellLine = \"HEK293\"\n",
        ))
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::IllegalAnnotationValue);
    }

    #[test]
    fn pattern_annotations_report_regex_mismatches() {
        let graph = compile_text(&with_header(
            "DEFINE ANNOTATION Dosage AS PATTERN \"\\d+\"\nSET Dosage = \"high\"\n",
        ))
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::MissingAnnotationRegex);
    }

    #[test]
    fn unsetting_an_unset_key_warns() {
        let graph = compile_text(&with_header("UNSET CellLine\n")).expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::MissingAnnotationKey);
    }

    #[test]
    fn annotations_land_on_edges_as_sets() {
        let graph = compile_text(&with_header(
            "DEFINE ANNOTATION CellLine AS LIST {\"HeLa\", \"HEK293\"}\n\
             SET Citation = {\"PubMed\",\"Title\",\"12345\"}\n\
             SET Evidence = \"ex\"\n\
             SET CellLine = {\"HeLa\", \"HEK293\"}\n\
             p(HGNC:A) -> p(HGNC:B)\n",
        ))
        .expect("compiles");

        let (_, _, data) = graph
            .edges()
            .find(|(_, _, d)| d.relation == Relation::Increases)
            .expect("edge exists");
        let values = data.annotations.get("CellLine").expect("annotation set");
        assert_eq!(values.len(), 2);
        assert!(values.contains("HeLa"));
    }

    #[test]
    fn invalid_pubmed_references_warn() {
        let graph = compile_text(&with_header(
            "SET Citation = {\"PubMed\",\"Title\",\"PMC123\"}\n",
        ))
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::InvalidPubMedIdentifier);
    }

    #[test]
    fn unknown_citation_types_warn() {
        let graph = compile_text(&with_header("SET Citation = {\"Book\",\"Title\",\"1\"}\n"))
            .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::InvalidCitationType);
    }

    #[test]
    fn non_semver_versions_warn_but_compile() {
        let graph = compile_text(
            "SET DOCUMENT Name = \"T\"\nSET DOCUMENT Version = \"one\"\nDEFINE NAMESPACE HGNC AS URL \"https://example/hgnc.belns\"\n",
        )
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::VersionFormat);
        assert_eq!(graph.metadata.version.as_deref(), Some("one"));
    }

    #[test]
    fn missing_document_name_is_fatal() {
        let err = compile_text("SET DOCUMENT Version = \"1.0.0\"\n").expect_err("must fail");
        assert!(matches!(err, BelError::MissingDocumentMetadata("Name")));
    }

    #[test]
    fn missing_document_version_is_fatal() {
        let err = compile_text("SET DOCUMENT Name = \"T\"\n").expect_err("must fail");
        assert!(matches!(err, BelError::MissingDocumentMetadata("Version")));
    }

    #[test]
    fn namespace_redefinition_with_a_different_source_is_fatal() {
        let err = compile_text(
            "SET DOCUMENT Name = \"T\"\nSET DOCUMENT Version = \"1.0.0\"\n\
             DEFINE NAMESPACE HGNC AS URL \"https://example/a.belns\"\n\
             DEFINE NAMESPACE HGNC AS URL \"https://example/b.belns\"\n",
        )
        .expect_err("must fail");
        assert!(matches!(err, BelError::RedefinedNamespace { .. }));
    }

    #[test]
    fn identical_redefinition_is_a_no_op() {
        let graph = compile_text(
            "SET DOCUMENT Name = \"T\"\nSET DOCUMENT Version = \"1.0.0\"\n\
             DEFINE NAMESPACE HGNC AS URL \"https://example/a.belns\"\n\
             DEFINE NAMESPACE HGNC AS URL \"https://example/a.belns\"\n",
        )
        .expect("compiles");
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn resource_failures_are_fatal() {
        let err = compile_text(
            "SET DOCUMENT Name = \"T\"\nSET DOCUMENT Version = \"1.0.0\"\n\
             DEFINE NAMESPACE X AS URL \"https://example/missing.belns\"\n",
        )
        .expect_err("must fail");
        assert!(matches!(err, BelError::ResourceUnavailable { .. }));
    }

    #[test]
    fn keyword_mismatches_warn() {
        let graph = compile_text(
            "SET DOCUMENT Name = \"T\"\nSET DOCUMENT Version = \"1.0.0\"\n\
             DEFINE NAMESPACE HUGO AS URL \"https://example/hgnc.belns\"\n",
        )
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::NamespaceKeywordMismatch);
    }

    #[test]
    fn required_annotations_are_enforced() {
        let options = CompilerOptions {
            required_annotations: vec!["CellLine".to_string()],
            ..CompilerOptions::default()
        };
        let graph = compile_options_text(
            &with_header(
                "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\np(HGNC:A) -> p(HGNC:B)\n",
            ),
            options,
        )
        .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::MissingAnnotationKey);
        assert_eq!(
            graph
                .edges()
                .filter(|(_, _, d)| d.relation == Relation::Increases)
                .count(),
            0
        );
    }

    #[test]
    fn structural_relations_compile_without_citation() {
        let graph = compile_text(&with_header("g(HGNC:A) transcribedTo r(HGNC:A)\n"))
            .expect("compiles");
        assert!(graph.warnings().is_empty());
        assert!(
            graph
                .edges()
                .any(|(_, _, d)| d.relation == Relation::TranscribedTo)
        );
    }

    #[test]
    fn legacy_traces_are_debug_severity_warnings() {
        let graph = compile_text(&with_header(
            "SET Citation = {\"PubMed\",\"Title\",\"12345\"}\nSET Evidence = \"ex\"\nkin(p(HGNC:AKT1)) -> p(HGNC:EGFR)\n",
        ))
        .expect("compiles");
        let debug_warnings: Vec<_> = graph
            .warnings()
            .iter()
            .filter(|w| w.severity == Severity::Debug)
            .collect();
        assert_eq!(debug_warnings.len(), 1);
        assert!(debug_warnings[0].message.starts_with("001: "));
    }

    #[test]
    fn warning_lines_are_monotonic() {
        let graph = compile_text(&with_header(
            "p(HGNC:A) -- p(HGNC:B)\np(NOPE:A) -> p(HGNC:B)\nUNSET CellLine\n",
        ))
        .expect("compiles");
        let lines: Vec<u64> = graph.warnings().iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![4, 5, 6]);
    }

    #[test]
    fn cancellation_aborts_compilation() {
        let token = CancelToken::new();
        token.cancel();
        let compiler = Compiler::new(CompilerOptions::default(), Resolver::new(StaticLoader))
            .with_cancel_token(token);
        let err = compiler
            .compile(HEADER.lines().map(str::to_string))
            .expect_err("must cancel");
        assert!(matches!(err, BelError::Cancelled));
    }

    #[test]
    fn statement_parsing_without_a_graph() {
        let statement = parse("p(HGNC:AKT1) -> p(HGNC:EGFR)").expect("parses");
        let ParsedStatement::Relation(statement) = statement else {
            panic!("expected a relation statement");
        };
        assert_eq!(statement.relation, Relation::Increases);
        assert!(matches!(statement.source.entity, Entity::Protein { .. }));
    }

    #[test]
    fn unterminated_quotes_become_syntax_warnings() {
        let graph = compile_text(&format!("{HEADER}SET Evidence = \"never closed\n"))
            .expect("compiles");
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::BelSyntax);
    }
}
