//! Namespace and annotation resource resolution.
//!
//! `DEFINE NAMESPACE ... AS URL` triggers a blocking fetch of a `.belns`
//! document (same INI-style layout for `.belanno` annotations); the parsed
//! result is a [`Validator`] cached by URL. The transport sits behind the
//! [`ResourceLoader`] trait so compilation is testable without a network.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::error::BelError;
use crate::model::Function;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport failure, carried into [`BelError::ResourceUnavailable`].
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Blocking transport for resource documents.
pub trait ResourceLoader {
    fn load(&self, url: &str) -> Result<String, LoadError>;
}

/// Default transport: a blocking HTTP client with a fixed timeout.
pub struct HttpLoader {
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    pub fn new() -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| LoadError::new(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

impl ResourceLoader for HttpLoader {
    fn load(&self, url: &str) -> Result<String, LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| LoadError::new(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::new(format!("HTTP {status}")));
        }
        response
            .text()
            .map_err(|err| LoadError::new(err.to_string()))
    }
}

/// How a name is checked against a declared namespace or annotation.
#[derive(Debug)]
pub enum Validator {
    /// A closed set of names, each optionally restricted to a set of BEL
    /// functions via its encoding.
    Enumerated {
        names: BTreeMap<String, BTreeSet<Function>>,
    },
    Regex(Regex),
    /// A closed set of names with a parent relation, e.g. a tissue hierarchy.
    Hierarchical {
        names: BTreeSet<String>,
        parents: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The name is not part of the vocabulary.
    UnknownName,
    /// The name exists but its encoding forbids this function.
    FunctionForbidden,
    /// The name does not match the declared pattern.
    PatternMismatch,
}

impl Validator {
    pub fn enumerated<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enumerated {
            names: names
                .into_iter()
                .map(|name| (name.into(), BTreeSet::new()))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Enumerated { names } => names.contains_key(name),
            Self::Regex(regex) => regex.is_match(name),
            Self::Hierarchical { names, .. } => names.contains(name),
        }
    }

    pub fn validate(&self, name: &str, function: Option<Function>) -> Result<(), ValidationFailure> {
        match self {
            Self::Enumerated { names } => {
                let encoding = names.get(name).ok_or(ValidationFailure::UnknownName)?;
                if let Some(function) = function {
                    if !encoding.is_empty() && !encoding.contains(&function) {
                        return Err(ValidationFailure::FunctionForbidden);
                    }
                }
                Ok(())
            }
            Self::Regex(regex) => {
                if regex.is_match(name) {
                    Ok(())
                } else {
                    Err(ValidationFailure::PatternMismatch)
                }
            }
            Self::Hierarchical { names, .. } => {
                if names.contains(name) {
                    Ok(())
                } else {
                    Err(ValidationFailure::UnknownName)
                }
            }
        }
    }

    /// The parent of a name in a hierarchical vocabulary.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        match self {
            Self::Hierarchical { parents, .. } => parents.get(name).map(String::as_str),
            _ => None,
        }
    }
}

/// Map one encoding letter onto the functions it licenses. Unknown letters
/// are ignored; an empty encoding licenses every function.
fn encoding_functions(letter: char) -> &'static [Function] {
    match letter {
        'G' => &[Function::Gene],
        'R' => &[Function::Rna, Function::MicroRna],
        'M' => &[Function::MicroRna],
        'P' => &[Function::Protein],
        'A' => &[
            Function::Abundance,
            Function::Gene,
            Function::Rna,
            Function::MicroRna,
            Function::Protein,
            Function::Complex,
            Function::Composite,
            Function::Population,
        ],
        'B' => &[Function::BiologicalProcess, Function::Pathology],
        'O' => &[Function::Pathology],
        'C' => &[Function::Complex],
        _ => &[],
    }
}

/// A parsed `.belns` / `.belanno` document.
#[derive(Debug, Default)]
pub struct ResourceDocument {
    /// The `Keyword` declared in the header block, when present.
    pub keyword: Option<String>,
    pub names: BTreeMap<String, BTreeSet<Function>>,
}

/// Parse the INI-style resource format: header sections of `Key=Value` pairs
/// followed by a `[Values]` section of `name|encoding` lines.
pub fn parse_resource_document(text: &str) -> ResourceDocument {
    let mut document = ResourceDocument::default();
    let mut in_values = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_values = line.eq_ignore_ascii_case("[Values]");
            continue;
        }
        if in_values {
            let (name, encoding) = match line.rsplit_once('|') {
                Some((name, encoding)) => (name, encoding),
                None => (line, ""),
            };
            let functions = encoding
                .chars()
                .flat_map(encoding_functions)
                .copied()
                .collect();
            document.names.insert(name.to_string(), functions);
        } else if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "Keyword" {
                document.keyword = Some(value.trim().to_string());
            }
        }
    }

    document
}

/// A resolved resource: the remote document's own keyword plus its validator.
#[derive(Debug)]
pub struct Resource {
    pub keyword: Option<String>,
    pub validator: Arc<Validator>,
}

/// URL-caching resolver. Identical URLs yield the identical validator.
pub struct Resolver<L = HttpLoader> {
    loader: L,
    cache: HashMap<String, Arc<Resource>>,
}

impl Resolver<HttpLoader> {
    pub fn with_http() -> Result<Self, BelError> {
        let loader = HttpLoader::new().map_err(|err| BelError::ResourceUnavailable {
            url: String::new(),
            message: err.to_string(),
        })?;
        Ok(Self::new(loader))
    }
}

impl<L: ResourceLoader> Resolver<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, url: &str) -> Result<Arc<Resource>, BelError> {
        if let Some(resource) = self.cache.get(url) {
            return Ok(Arc::clone(resource));
        }
        let text = self
            .loader
            .load(url)
            .map_err(|err| BelError::ResourceUnavailable {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let document = parse_resource_document(&text);
        debug!(url, names = document.names.len(), "resolved resource");
        let resource = Arc::new(Resource {
            keyword: document.keyword,
            validator: Arc::new(Validator::Enumerated {
                names: document.names,
            }),
        });
        self.cache.insert(url.to_string(), Arc::clone(&resource));
        Ok(resource)
    }
}
