//! Recursive-descent parser for BEL terms, modifiers, and statements.
//!
//! The grammar is LL(1): one word of lookahead decides every production.
//! Legacy BEL-1 surface forms are normalized here and reported as debug
//! traces; semantic checks run against the declared namespace validators.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::WarningKind;
use crate::model::concept::{Concept, Function};
use crate::model::entity::Entity;
use crate::model::fusion::{Fusion, FusionRange};
use crate::model::modifier::{Modifier, Participant};
use crate::model::relation::Relation;
use crate::model::variant::{AminoAcid, FragmentBound, Variant, legacy_pmod_label};
use crate::parser::CompilerOptions;
use crate::parser::scan::{Cursor, ParseIssue};
use crate::resolver::{ValidationFailure, Validator};

/// An automatic legacy-form normalization, surfaced as a debug-severity
/// entry in the warning stream.
#[derive(Debug, Clone)]
pub struct Trace {
    pub kind: WarningKind,
    pub code: u16,
    pub message: String,
}

/// One endpoint of a statement: the entity plus its edge-side record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTerm {
    pub entity: Entity,
    pub participant: Participant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationStatement {
    pub source: ParsedTerm,
    pub relation: Relation,
    pub target: ParsedTerm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStatement {
    /// A lone term; inserts its nodes and nothing else.
    Term(ParsedTerm),
    Relation(Box<RelationStatement>),
    /// `a R1 (b R2 c)` — only with `allow_nested`.
    Nested {
        source: ParsedTerm,
        relation: Relation,
        inner: Box<RelationStatement>,
    },
}

const LEGACY_ACTIVITIES: &[&str] = &[
    "kin", "phos", "cat", "pep", "ribo", "tscript", "tport", "gtp", "chap",
];

pub struct TermParser<'a> {
    options: &'a CompilerOptions,
    /// Validators per declared namespace keyword. `None` switches semantic
    /// validation off (the standalone `parse` entry point).
    namespaces: Option<&'a BTreeMap<String, Arc<Validator>>>,
    pub traces: Vec<Trace>,
}

impl<'a> TermParser<'a> {
    pub fn new(
        options: &'a CompilerOptions,
        namespaces: Option<&'a BTreeMap<String, Arc<Validator>>>,
    ) -> Self {
        Self {
            options,
            namespaces,
            traces: Vec::new(),
        }
    }

    pub fn parse_statement(&mut self, text: &'a str) -> Result<ParsedStatement, ParseIssue> {
        let mut cursor = Cursor::new(text);
        let source = self.outer_term(&mut cursor)?;
        cursor.skip_ws();
        if cursor.is_at_end() {
            return Ok(ParsedStatement::Term(source));
        }

        let relation = self.relation(&mut cursor)?;
        cursor.skip_ws();
        if cursor.peek() == Some('(') {
            if !self.options.allow_nested {
                return Err(ParseIssue::new(
                    WarningKind::NestedRelation,
                    "nested statements are disabled; set allow_nested to accept them",
                ));
            }
            cursor.expect('(')?;
            let inner_source = self.outer_term(&mut cursor)?;
            let inner_relation = self.relation(&mut cursor)?;
            let inner_target = self.outer_term(&mut cursor)?;
            cursor.expect(')')?;
            self.finish(&mut cursor)?;
            return Ok(ParsedStatement::Nested {
                source,
                relation,
                inner: Box::new(RelationStatement {
                    source: inner_source,
                    relation: inner_relation,
                    target: inner_target,
                }),
            });
        }

        let target = self.outer_term(&mut cursor)?;
        self.finish(&mut cursor)?;
        Ok(ParsedStatement::Relation(Box::new(RelationStatement {
            source,
            relation,
            target,
        })))
    }

    fn finish(&self, cursor: &mut Cursor) -> Result<(), ParseIssue> {
        cursor.skip_ws();
        if cursor.is_at_end() {
            Ok(())
        } else {
            Err(ParseIssue::syntax(format!(
                "unexpected trailing content \"{}\"",
                cursor.excerpt()
            )))
        }
    }

    fn relation(&self, cursor: &mut Cursor) -> Result<Relation, ParseIssue> {
        let token = cursor.relation_token();
        if token.is_empty() {
            return Err(ParseIssue::syntax("expected a relation"));
        }
        Relation::from_keyword(token)
            .ok_or_else(|| ParseIssue::syntax(format!("unknown relation \"{token}\"")))
    }

    /// A statement endpoint: a plain term, or a term wrapped in one
    /// subject/object modifier.
    fn outer_term(&mut self, cursor: &mut Cursor<'a>) -> Result<ParsedTerm, ParseIssue> {
        let save = cursor.clone();
        let word = cursor.word();
        match word {
            "act" | "activity" => self.activity(cursor),
            "tloc" | "translocation" => self.translocation(cursor),
            "sec" | "cellSecretion" => self.shorthand_translocation(cursor, Modifier::secretion()),
            "surf" | "cellSurfaceExpression" => {
                self.shorthand_translocation(cursor, Modifier::cell_surface_expression())
            }
            "deg" | "degradation" => self.degradation(cursor),
            _ if LEGACY_ACTIVITIES.contains(&word) => self.legacy_activity(cursor, word),
            _ => {
                *cursor = save;
                let (entity, location) = self.entity_term(cursor)?;
                Ok(ParsedTerm {
                    entity,
                    participant: Participant {
                        modifier: None,
                        location,
                    },
                })
            }
        }
    }

    fn activity(&mut self, cursor: &mut Cursor<'a>) -> Result<ParsedTerm, ParseIssue> {
        cursor.expect('(')?;
        let (entity, location) = self.entity_term(cursor)?;
        let mut effect = None;
        if cursor.eat(',') {
            let word = cursor.word();
            if word != "ma" && word != "molecularActivity" {
                return Err(ParseIssue::syntax(format!(
                    "expected ma(...) in activity, found \"{word}\""
                )));
            }
            cursor.expect('(')?;
            effect = Some(self.modification_concept(cursor)?);
            cursor.expect(')')?;
        }
        cursor.expect(')')?;
        Ok(ParsedTerm {
            entity,
            participant: Participant {
                modifier: Some(Modifier::Activity { effect }),
                location,
            },
        })
    }

    fn legacy_activity(
        &mut self,
        cursor: &mut Cursor<'a>,
        keyword: &str,
    ) -> Result<ParsedTerm, ParseIssue> {
        cursor.expect('(')?;
        let (entity, location) = self.entity_term(cursor)?;
        cursor.expect(')')?;
        self.trace(
            WarningKind::BelSyntax,
            1,
            format!("legacy activity {keyword}(...) normalized to act(..., ma({keyword}))"),
        );
        Ok(ParsedTerm {
            entity,
            participant: Participant {
                modifier: Some(Modifier::Activity {
                    effect: Concept::named(crate::model::variant::DEFAULT_MODIFICATION_NAMESPACE, keyword),
                }),
                location,
            },
        })
    }

    fn translocation(&mut self, cursor: &mut Cursor<'a>) -> Result<ParsedTerm, ParseIssue> {
        cursor.expect('(')?;
        let (entity, location) = self.entity_term(cursor)?;
        if !cursor.eat(',') {
            cursor.expect(')')?;
            if self.options.disallow_unqualified_translocations {
                return Err(ParseIssue::new(
                    WarningKind::MalformedTranslocation,
                    "translocation without fromLoc/toLoc",
                ));
            }
            self.trace(
                WarningKind::MalformedTranslocation,
                16,
                "legacy unqualified translocation".to_string(),
            );
            return Ok(ParsedTerm {
                entity,
                participant: Participant {
                    modifier: Some(Modifier::Translocation {
                        from_loc: None,
                        to_loc: None,
                    }),
                    location,
                },
            });
        }

        let from_loc = self.translocation_leg(cursor, "fromLoc")?;
        if !cursor.eat(',') {
            return Err(ParseIssue::new(
                WarningKind::MalformedTranslocation,
                "translocation is missing toLoc",
            ));
        }
        let to_loc = self.translocation_leg(cursor, "toLoc")?;
        cursor.expect(')')?;
        Ok(ParsedTerm {
            entity,
            participant: Participant {
                modifier: Some(Modifier::Translocation {
                    from_loc: Some(from_loc),
                    to_loc: Some(to_loc),
                }),
                location,
            },
        })
    }

    fn translocation_leg(
        &mut self,
        cursor: &mut Cursor<'a>,
        keyword: &str,
    ) -> Result<Concept, ParseIssue> {
        let word = cursor.word();
        if word != keyword {
            return Err(ParseIssue::new(
                WarningKind::MalformedTranslocation,
                format!("expected {keyword}(...), found \"{word}\""),
            ));
        }
        cursor.expect('(')?;
        let concept = self.concept(cursor, None)?;
        cursor.expect(')')?;
        Ok(concept)
    }

    fn shorthand_translocation(
        &mut self,
        cursor: &mut Cursor<'a>,
        modifier: Modifier,
    ) -> Result<ParsedTerm, ParseIssue> {
        cursor.expect('(')?;
        let (entity, location) = self.entity_term(cursor)?;
        cursor.expect(')')?;
        Ok(ParsedTerm {
            entity,
            participant: Participant {
                modifier: Some(modifier),
                location,
            },
        })
    }

    fn degradation(&mut self, cursor: &mut Cursor<'a>) -> Result<ParsedTerm, ParseIssue> {
        cursor.expect('(')?;
        let (entity, location) = self.entity_term(cursor)?;
        cursor.expect(')')?;
        Ok(ParsedTerm {
            entity,
            participant: Participant {
                modifier: Some(Modifier::Degradation),
                location,
            },
        })
    }

    /// A full entity term. The returned location belongs to the enclosing
    /// participant; list members must not carry one.
    fn entity_term(&mut self, cursor: &mut Cursor<'a>) -> Result<(Entity, Option<Concept>), ParseIssue> {
        let word = cursor.word();
        let function = Function::from_keyword(word)
            .ok_or_else(|| ParseIssue::syntax(format!("unknown function \"{word}\"")))?;
        match function {
            Function::Complex => self.complex_term(cursor),
            Function::Composite => self.composite_term(cursor),
            Function::Reaction => self.reaction_term(cursor),
            _ => self.simple_term(cursor, function),
        }
    }

    fn member_term(&mut self, cursor: &mut Cursor<'a>) -> Result<Entity, ParseIssue> {
        let (entity, location) = self.entity_term(cursor)?;
        if location.is_some() {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "loc(...) is not allowed on list or reaction members",
            ));
        }
        Ok(entity)
    }

    fn simple_term(
        &mut self,
        cursor: &mut Cursor<'a>,
        function: Function,
    ) -> Result<(Entity, Option<Concept>), ParseIssue> {
        cursor.expect('(')?;

        let save = cursor.clone();
        let word = cursor.word();
        if (word == "fus" || word == "fusion") && cursor.peek() == Some('(') {
            let entity = self.fusion_term(cursor, function)?;
            cursor.expect(')')?;
            return Ok((entity, None));
        }
        *cursor = save;

        let concept = self.concept(cursor, Some(function))?;
        let mut variants = Vec::new();
        let mut location = None;

        while cursor.eat(',') {
            let save = cursor.clone();
            let word = cursor.word();
            match word {
                "loc" | "location" => {
                    if location.is_some() {
                        return Err(ParseIssue::syntax("duplicate loc(...)"));
                    }
                    cursor.expect('(')?;
                    location = Some(self.concept(cursor, None)?);
                    cursor.expect(')')?;
                }
                "var" | "variant" => variants.push(self.hgvs_variant(cursor)?),
                "pmod" | "proteinModification" => {
                    variants.push(self.pmod_variant(cursor, function)?)
                }
                "gmod" | "geneModification" => variants.push(self.gmod_variant(cursor, function)?),
                "frag" | "fragment" => variants.push(self.fragment_variant(cursor, function)?),
                "sub" | "substitution" => variants.push(self.legacy_substitution(cursor, function)?),
                "trunc" | "truncation" => variants.push(self.legacy_truncation(cursor, function)?),
                _ => {
                    *cursor = save;
                    return Err(ParseIssue::syntax(format!(
                        "unexpected term argument near \"{}\"",
                        cursor.excerpt()
                    )));
                }
            }
        }
        cursor.expect(')')?;

        if variants.is_empty() {
            let entity = Entity::simple(function, concept)
                .ok_or_else(|| ParseIssue::syntax("function cannot take a plain concept"))?;
            return Ok((entity, location));
        }
        let entity = Entity::with_variants(function, concept, variants).ok_or_else(|| {
            ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                format!("{} cannot carry variants", function.long_form()),
            )
        })?;
        Ok((entity, location))
    }

    fn complex_term(
        &mut self,
        cursor: &mut Cursor<'a>,
    ) -> Result<(Entity, Option<Concept>), ParseIssue> {
        cursor.expect('(')?;
        if cursor.eat(')') {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "empty complex",
            ));
        }

        let mut concept = None;
        let mut members = Vec::new();
        loop {
            let save = cursor.clone();
            let word = cursor.word();
            let is_term = Function::from_keyword(word).is_some() && cursor.peek() == Some('(');
            *cursor = save;
            if is_term {
                members.push(self.member_term(cursor)?);
            } else {
                if concept.is_some() || !members.is_empty() {
                    return Err(ParseIssue::syntax(format!(
                        "unexpected complex argument near \"{}\"",
                        cursor.excerpt()
                    )));
                }
                concept = Some(self.concept(cursor, Some(Function::Complex))?);
            }
            if !cursor.eat(',') {
                break;
            }
        }
        cursor.expect(')')?;
        Ok((Entity::complex_of(concept, members), None))
    }

    fn composite_term(
        &mut self,
        cursor: &mut Cursor<'a>,
    ) -> Result<(Entity, Option<Concept>), ParseIssue> {
        cursor.expect('(')?;
        if cursor.eat(')') {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "empty composite",
            ));
        }
        let mut members = vec![self.member_term(cursor)?];
        while cursor.eat(',') {
            members.push(self.member_term(cursor)?);
        }
        cursor.expect(')')?;
        Ok((Entity::composite_of(members), None))
    }

    fn reaction_term(
        &mut self,
        cursor: &mut Cursor<'a>,
    ) -> Result<(Entity, Option<Concept>), ParseIssue> {
        cursor.expect('(')?;

        let save = cursor.clone();
        let word = cursor.word();
        let named = !(word == "reactants" && cursor.peek() == Some('('));
        *cursor = save;
        let concept = if named {
            let concept = self.concept(cursor, Some(Function::Reaction))?;
            if !cursor.eat(',') {
                return Err(ParseIssue::syntax("reaction is missing reactants(...)"));
            }
            Some(concept)
        } else {
            None
        };

        let reactants = self.reaction_side(cursor, "reactants")?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("reaction is missing products(...)"));
        }
        let products = self.reaction_side(cursor, "products")?;
        cursor.expect(')')?;
        Ok((Entity::reaction_of(concept, reactants, products), None))
    }

    fn reaction_side(
        &mut self,
        cursor: &mut Cursor<'a>,
        keyword: &str,
    ) -> Result<Vec<Entity>, ParseIssue> {
        let word = cursor.word();
        if word != keyword {
            return Err(ParseIssue::syntax(format!(
                "expected {keyword}(...), found \"{word}\""
            )));
        }
        cursor.expect('(')?;
        let mut members = vec![self.member_term(cursor)?];
        while cursor.eat(',') {
            members.push(self.member_term(cursor)?);
        }
        cursor.expect(')')?;
        Ok(members)
    }

    fn fusion_term(&mut self, cursor: &mut Cursor<'a>, function: Function) -> Result<Entity, ParseIssue> {
        cursor.expect('(')?;
        let partner5 = self.concept(cursor, Some(function))?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("fusion is missing its 5' range"));
        }
        let range5 = self.fusion_range(cursor)?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("fusion is missing its 3' partner"));
        }
        let partner3 = self.concept(cursor, Some(function))?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("fusion is missing its 3' range"));
        }
        let range3 = self.fusion_range(cursor)?;
        cursor.expect(')')?;

        Entity::fusion(
            function,
            Fusion {
                partner5,
                range5,
                partner3,
                range3,
            },
        )
        .ok_or_else(|| {
            ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                format!("{} cannot hold a fusion", function.long_form()),
            )
        })
    }

    fn fusion_range(&mut self, cursor: &mut Cursor<'a>) -> Result<FusionRange, ParseIssue> {
        let text = cursor.quoted_string()?;
        FusionRange::parse(&text)
            .ok_or_else(|| ParseIssue::syntax(format!("malformed fusion range \"{text}\"")))
    }

    fn hgvs_variant(&mut self, cursor: &mut Cursor<'a>) -> Result<Variant, ParseIssue> {
        cursor.expect('(')?;
        let text = cursor.quoted_string()?;
        cursor.expect(')')?;
        Ok(Variant::hgvs(text))
    }

    fn pmod_variant(&mut self, cursor: &mut Cursor<'a>, function: Function) -> Result<Variant, ParseIssue> {
        if function != Function::Protein {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "pmod(...) is only legal on proteins",
            ));
        }
        cursor.expect('(')?;
        let concept = self.modification_concept(cursor)?;
        let concept = self.normalize_pmod_letter(concept);

        let mut code = None;
        let mut position = None;
        if cursor.eat(',') {
            let raw = cursor.string_or_word()?;
            code = Some(self.amino_acid(&raw)?);
            if cursor.eat(',') {
                position = Some(cursor.integer()?);
            }
        }
        cursor.expect(')')?;
        Ok(Variant::ProteinModification {
            concept,
            code,
            position,
        })
    }

    fn normalize_pmod_letter(&mut self, concept: Concept) -> Concept {
        if concept.namespace != crate::model::variant::DEFAULT_MODIFICATION_NAMESPACE {
            return concept;
        }
        let Some(name) = concept.name.as_deref() else {
            return concept;
        };
        match legacy_pmod_label(name) {
            Some(label) if label != name => {
                self.trace(
                    WarningKind::BelSyntax,
                    5,
                    format!("legacy modification \"{name}\" normalized to \"{label}\""),
                );
                Concept {
                    namespace: concept.namespace,
                    identifier: None,
                    name: Some(label.to_string()),
                }
            }
            _ => concept,
        }
    }

    fn gmod_variant(&mut self, cursor: &mut Cursor<'a>, function: Function) -> Result<Variant, ParseIssue> {
        if function != Function::Gene {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "gmod(...) is only legal on genes",
            ));
        }
        cursor.expect('(')?;
        let concept = self.modification_concept(cursor)?;
        cursor.expect(')')?;
        Ok(Variant::GeneModification { concept })
    }

    fn fragment_variant(
        &mut self,
        cursor: &mut Cursor<'a>,
        function: Function,
    ) -> Result<Variant, ParseIssue> {
        if function != Function::Protein {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "frag(...) is only legal on proteins",
            ));
        }
        cursor.expect('(')?;
        let range = cursor.quoted_string()?;
        let (start, stop) = parse_fragment_range(&range)
            .ok_or_else(|| ParseIssue::syntax(format!("malformed fragment range \"{range}\"")))?;
        let descriptor = if cursor.eat(',') {
            Some(cursor.quoted_string()?)
        } else {
            None
        };
        cursor.expect(')')?;
        Ok(Variant::Fragment {
            start,
            stop,
            descriptor,
        })
    }

    fn legacy_substitution(
        &mut self,
        cursor: &mut Cursor<'a>,
        function: Function,
    ) -> Result<Variant, ParseIssue> {
        cursor.expect('(')?;
        let reference = cursor.string_or_word()?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("sub(...) is missing its position"));
        }
        let position = cursor.integer()?;
        if !cursor.eat(',') {
            return Err(ParseIssue::syntax("sub(...) is missing its replacement"));
        }
        let replacement = cursor.string_or_word()?;
        cursor.expect(')')?;

        match function {
            Function::Protein => {
                let from = self.amino_acid(&reference)?;
                let to = self.amino_acid(&replacement)?;
                let hgvs = format!("p.{}{}{}", from.three_letter(), position, to.three_letter());
                self.trace(
                    WarningKind::BelSyntax,
                    6,
                    format!("protein substitution normalized to var(\"{hgvs}\")"),
                );
                Ok(Variant::hgvs(hgvs))
            }
            Function::Gene => {
                let from = nucleotide(&reference)?;
                let to = nucleotide(&replacement)?;
                let hgvs = format!("c.{position}{from}>{to}");
                self.trace(
                    WarningKind::BelSyntax,
                    9,
                    format!("gene substitution normalized to var(\"{hgvs}\")"),
                );
                Ok(Variant::hgvs(hgvs))
            }
            _ => Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "sub(...) is only legal on proteins and genes",
            )),
        }
    }

    fn legacy_truncation(
        &mut self,
        cursor: &mut Cursor<'a>,
        function: Function,
    ) -> Result<Variant, ParseIssue> {
        if function != Function::Protein {
            return Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                "trunc(...) is only legal on proteins",
            ));
        }
        cursor.expect('(')?;
        let position = cursor.integer()?;
        cursor.expect(')')?;
        let hgvs = format!("p.{position}*");
        self.trace(
            WarningKind::BelSyntax,
            25,
            format!("truncation normalized to var(\"{hgvs}\")"),
        );
        Ok(Variant::hgvs(hgvs))
    }

    fn amino_acid(&mut self, raw: &str) -> Result<AminoAcid, ParseIssue> {
        let code = AminoAcid::from_code(raw).ok_or_else(|| {
            ParseIssue::new(
                WarningKind::PlaceholderAminoAcid,
                format!("unknown amino acid code \"{raw}\""),
            )
        })?;
        if AminoAcid::is_legacy_code(raw) {
            self.trace(
                WarningKind::BelSyntax,
                5,
                format!("single-letter amino acid \"{raw}\" normalized to {}", code.three_letter()),
            );
        }
        Ok(code)
    }

    /// A modification concept: `ns:name`, or a bare name from the default
    /// vocabulary.
    fn modification_concept(&mut self, cursor: &mut Cursor<'a>) -> Result<Concept, ParseIssue> {
        let save = cursor.clone();
        let word = cursor.word();
        if !word.is_empty() && cursor.peek() == Some(':') {
            *cursor = save;
            return self.concept(cursor, None);
        }
        let name = if word.is_empty() {
            *cursor = save;
            cursor.quoted_string()?
        } else {
            word.to_string()
        };
        Concept::named(crate::model::variant::DEFAULT_MODIFICATION_NAMESPACE, name)
            .ok_or_else(|| ParseIssue::syntax("empty modification name"))
    }

    /// `namespace:name`, `namespace:identifier ! name`, or (when permitted)
    /// a naked name.
    fn concept(
        &mut self,
        cursor: &mut Cursor<'a>,
        function: Option<Function>,
    ) -> Result<Concept, ParseIssue> {
        cursor.skip_ws();
        if cursor.peek() == Some('"') {
            let name = cursor.quoted_string()?;
            return self.naked(name);
        }

        let word = cursor.word();
        if word.is_empty() {
            return Err(ParseIssue::syntax(format!(
                "expected a term near \"{}\"",
                cursor.excerpt()
            )));
        }
        if cursor.peek() != Some(':') {
            return self.naked(word.to_string());
        }
        cursor.bump();

        let namespace = word.to_string();
        let first = cursor.string_or_word()?;
        cursor.skip_ws();
        let concept = if cursor.peek() == Some('!') {
            cursor.bump();
            let name = cursor.string_or_word()?;
            Concept::new(namespace, Some(first), Some(name))
        } else {
            Concept::new(namespace, None, Some(first))
        };
        let concept = concept.ok_or_else(|| ParseIssue::syntax("empty name"))?;
        self.validate(&concept, function)?;
        Ok(concept)
    }

    fn naked(&mut self, name: String) -> Result<Concept, ParseIssue> {
        if !self.options.allow_naked_names {
            return Err(ParseIssue::new(
                WarningKind::NakedName,
                format!("name \"{name}\" has no namespace"),
            ));
        }
        debug!(name = %name, "naked name accepted");
        Concept::new(String::new(), None, Some(name))
            .ok_or_else(|| ParseIssue::syntax("empty name"))
    }

    fn validate(&self, concept: &Concept, function: Option<Function>) -> Result<(), ParseIssue> {
        let Some(namespaces) = self.namespaces else {
            return Ok(());
        };
        let Some(validator) = namespaces.get(&concept.namespace) else {
            return Err(ParseIssue::new(
                WarningKind::UndefinedNamespace,
                format!("namespace \"{}\" is not defined", concept.namespace),
            ));
        };
        let label = concept.label();
        match validator.validate(label, function) {
            Ok(()) => Ok(()),
            Err(ValidationFailure::UnknownName) => Err(ParseIssue::new(
                WarningKind::MissingNamespaceName,
                format!("\"{label}\" is not in namespace \"{}\"", concept.namespace),
            )),
            Err(ValidationFailure::PatternMismatch) => Err(ParseIssue::new(
                WarningKind::MissingNamespaceRegex,
                format!(
                    "\"{label}\" does not match the pattern of namespace \"{}\"",
                    concept.namespace
                ),
            )),
            Err(ValidationFailure::FunctionForbidden) => Err(ParseIssue::new(
                WarningKind::InvalidFunctionSemantic,
                format!(
                    "\"{label}\" is not encoded for {} in namespace \"{}\"",
                    function.map(Function::long_form).unwrap_or("this function"),
                    concept.namespace
                ),
            )),
        }
    }

    fn trace(&mut self, kind: WarningKind, code: u16, message: String) {
        debug!(code, message = %message, "legacy normalization");
        self.traces.push(Trace {
            kind,
            code,
            message,
        });
    }
}

/// `"5_20"`, `"5_?"`, or `"?"`.
fn parse_fragment_range(range: &str) -> Option<(FragmentBound, FragmentBound)> {
    let range = range.trim();
    if range == "?" {
        return Some((FragmentBound::Unknown, FragmentBound::Unknown));
    }
    let (start, stop) = range.split_once('_')?;
    Some((FragmentBound::parse(start)?, FragmentBound::parse(stop)?))
}

fn nucleotide(raw: &str) -> Result<String, ParseIssue> {
    let raw = raw.trim();
    if raw.len() == 1 && raw.chars().all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T')) {
        Ok(raw.to_ascii_uppercase())
    } else {
        Err(ParseIssue::syntax(format!("invalid nucleotide \"{raw}\"")))
    }
}
