// Copyright 2025 Quarry Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Grammar registry: maps file extensions to loadable tree-sitter
//! grammars. Built once from configuration, then read-only; grammar
//! loading is gated so concurrent first-use callers resolve a language
//! exactly once.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Display};
use tree_sitter::{Language, Parser};

use tree_sitter_c_sharp as ts_c_sharp;
use tree_sitter_cpp as ts_cpp;
use tree_sitter_go as ts_go;
use tree_sitter_java as ts_java;
use tree_sitter_javascript as ts_javascript;
use tree_sitter_python as ts_python;
use tree_sitter_rust as ts_rust;
use tree_sitter_typescript as ts_typescript;

use crate::parse::tree::{build_tree, ParseResult, ParseStats};

/// Recoverable parse-layer failures. The import pipeline downgrades both
/// variants to "no parse result" and keeps going.
#[derive(Debug)]
pub enum ParseError {
    /// No grammar is registered for the file extension.
    UnsupportedLanguage(String),
    /// A grammar is registered but could not be loaded or applied.
    GrammarLoad(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnsupportedLanguage(ext) => write!(f, "no grammar for extension: {}", ext),
            ParseError::GrammarLoad(s) => write!(f, "grammar load failed: {}", s),
        }
    }
}

impl Error for ParseError {}

/// Resolves a language name to a compiled grammar. Returning `None`
/// models a missing grammar artifact.
pub type GrammarLoader = fn() -> Option<Language>;

fn load_rust() -> Option<Language> {
    Some(ts_rust::LANGUAGE.into())
}
fn load_python() -> Option<Language> {
    Some(ts_python::LANGUAGE.into())
}
fn load_javascript() -> Option<Language> {
    Some(ts_javascript::LANGUAGE.into())
}
fn load_typescript() -> Option<Language> {
    Some(ts_typescript::LANGUAGE_TYPESCRIPT.into())
}
fn load_tsx() -> Option<Language> {
    Some(ts_typescript::LANGUAGE_TSX.into())
}
fn load_go() -> Option<Language> {
    Some(ts_go::LANGUAGE.into())
}
fn load_java() -> Option<Language> {
    Some(ts_java::LANGUAGE.into())
}
fn load_cpp() -> Option<Language> {
    Some(ts_cpp::LANGUAGE.into())
}
fn load_c_sharp() -> Option<Language> {
    Some(ts_c_sharp::LANGUAGE.into())
}

const BUILTIN: &[(&str, GrammarLoader, &[&str])] = &[
    ("rust", load_rust, &["rs"]),
    ("python", load_python, &["py"]),
    ("javascript", load_javascript, &["js", "jsx"]),
    ("typescript", load_typescript, &["ts"]),
    ("tsx", load_tsx, &["tsx"]),
    ("go", load_go, &["go"]),
    ("java", load_java, &["java"]),
    ("cpp", load_cpp, &["cpp", "cc", "cxx", "hpp", "h"]),
    ("c_sharp", load_c_sharp, &["cs"]),
];

/// Owned capability object for parsing. Construct once at startup, share
/// by reference; parses run freely in parallel once grammars are resident.
pub struct GrammarRegistry {
    by_ext: HashMap<String, String>,
    loaders: HashMap<String, GrammarLoader>,
    loaded: RwLock<HashMap<String, Language>>,
}

impl GrammarRegistry {
    /// Registry with every built-in grammar registered.
    pub fn builtin() -> Self {
        Self::with_languages(Self::builtin_languages())
    }

    /// Language names compiled into this build, in registration order.
    pub fn builtin_languages() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _, _)| *name)
    }

    /// Registry restricted to the named built-in languages. Unknown names
    /// are ignored so a configured list can outlive the compiled-in set.
    pub fn with_languages<'a>(langs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut reg = Self {
            by_ext: HashMap::new(),
            loaders: HashMap::new(),
            loaded: RwLock::new(HashMap::new()),
        };
        for want in langs {
            if let Some((name, loader, exts)) = BUILTIN.iter().find(|(n, _, _)| *n == want) {
                reg.register(name, *loader, exts);
            }
        }
        reg
    }

    /// Register a grammar loader for `language`, reachable from the given
    /// extensions. Deployments carrying extra grammar artifacts hook in
    /// here; registration happens before the registry is shared.
    pub fn register(&mut self, language: &str, loader: GrammarLoader, extensions: &[&str]) {
        self.loaders.insert(language.to_string(), loader);
        for ext in extensions {
            self.by_ext.insert((*ext).to_string(), language.to_string());
        }
    }

    /// Language name a file extension resolves to, if any.
    pub fn language_for_extension(&self, ext: &str) -> Option<&str> {
        self.by_ext.get(ext).map(String::as_str)
    }

    fn grammar(&self, language: &str) -> Result<Language, ParseError> {
        if let Some(l) = self.loaded.read().get(language) {
            return Ok(l.clone());
        }
        // The write lock is the one-time load gate: the winner loads,
        // every later caller observes the cached grammar.
        let mut loaded = self.loaded.write();
        if let Some(l) = loaded.get(language) {
            return Ok(l.clone());
        }
        let loader = self
            .loaders
            .get(language)
            .ok_or_else(|| ParseError::GrammarLoad(format!("no loader for {}", language)))?;
        match loader() {
            Some(l) => {
                loaded.insert(language.to_string(), l.clone());
                Ok(l)
            }
            None => Err(ParseError::GrammarLoad(format!(
                "grammar artifact for {} is unavailable",
                language
            ))),
        }
    }

    /// Parse `contents` according to the grammar registered for
    /// `extension`. Parsing the same input twice yields structurally
    /// identical trees.
    pub fn parse(&self, extension: &str, contents: &str) -> Result<ParseResult, ParseError> {
        let language = self
            .by_ext
            .get(extension)
            .cloned()
            .ok_or_else(|| ParseError::UnsupportedLanguage(extension.to_string()))?;
        let grammar = self.grammar(&language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| ParseError::GrammarLoad(format!("{}: {}", language, e)))?;
        let tree = parser.parse(contents, None).ok_or_else(|| {
            ParseError::GrammarLoad(format!("{}: parser produced no tree", language))
        })?;
        let root = tree.root_node();
        let (syntax, node_count) = build_tree(root, contents);
        Ok(ParseResult {
            language,
            s_expression: root.to_sexp(),
            stats: ParseStats { node_count },
            tree: syntax,
        })
    }
}
