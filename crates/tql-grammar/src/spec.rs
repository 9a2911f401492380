//! The parser specification: runtime tables and their on-disk artifact.
//!
//! A [`Spec`] holds the ACTION/GOTO tables, the production metadata, and
//! the resolved reduce behavior for each production. It is built either
//! directly from the compiled-in grammar or from a serialized `.bc`
//! artifact produced offline.
//!
//! The artifact layout is a single format-version byte followed by a
//! [`postcard`] body carrying, in order: the per-state action maps
//! (sorted `(terminal_name, action)` pairs), the per-state goto maps,
//! the inline table, the start symbol name, and the production-name
//! vector. Incompatible changes bump the version byte.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::grammar::generate;
use crate::grammar::generate::Action;
use crate::grammar::generate::GenerateError;
use crate::grammar::Grammar;
use crate::grammar::ReduceKind;
use crate::token::TokenKind;

/// The current artifact format version.
pub const SPEC_VERSION: u8 = 1;

/// The artifact file extension.
pub const SPEC_EXTENSION: &str = "bc";

/// A failure to load or decode a spec artifact.
#[derive(thiserror::Error, Debug)]
pub enum SpecError {
    /// The artifact could not be read.
    #[error("failed to read parser spec: {0}")]
    Io(#[from] std::io::Error),
    /// The artifact does not match this build of the grammar.
    #[error("parser spec is incompatible: {0}")]
    Incompatible(String),
}

/// Metadata and reduce behavior of one production.
pub struct ProductionInfo {
    /// The left-hand side nonterminal index (a key into the goto maps).
    pub lhs: u32,
    /// The left-hand side nonterminal name.
    pub nonterm: String,
    /// The production method name.
    pub method: String,
    /// The number of right-hand side symbols.
    pub rhs_len: u16,
    /// The forwarded child index, for inline productions.
    pub inline: Option<u8>,
    /// The resolved reduce behavior.
    pub reduce: ReduceKind,
}

/// The loaded parser specification.
pub struct Spec {
    /// Per-state action maps, sorted by token kind.
    actions: Vec<Vec<(TokenKind, Action)>>,
    /// Per-state goto maps, keyed by nonterminal index.
    goto: Vec<Vec<(u32, u32)>>,
    /// Nonterminal names, indexed by the goto keys.
    nonterms: Vec<String>,
    /// Production metadata, indexed by production id.
    productions: Vec<ProductionInfo>,
    /// The start symbol name.
    start: String,
}

impl Spec {
    /// Builds a spec by running table generation on the grammar.
    pub fn from_grammar(grammar: &Grammar) -> Result<Self, GenerateError> {
        let tables = generate::generate(grammar)?;
        let nt_index: HashMap<&str, u32> = tables
            .nonterms
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i as u32))
            .collect();

        let productions = grammar
            .productions
            .iter()
            .map(|p| ProductionInfo {
                lhs: nt_index[p.lhs],
                nonterm: p.lhs.to_string(),
                method: p.method.clone(),
                rhs_len: p.rhs.len() as u16,
                inline: match p.reduce {
                    ReduceKind::Inline(index) => Some(index),
                    ReduceKind::Call(_) => None,
                },
                reduce: p.reduce,
            })
            .collect();

        Ok(Self {
            actions: tables.actions,
            goto: tables.goto,
            nonterms: tables.nonterms,
            productions,
            start: grammar.start.to_string(),
        })
    }

    /// Looks up the action for a state and token.
    pub fn action(&self, state: u32, token: TokenKind) -> Option<Action> {
        let row = &self.actions[state as usize];
        row.binary_search_by(|(t, _)| t.cmp(&token))
            .ok()
            .map(|index| row[index].1)
    }

    /// The tokens with any action in the given state, in table order.
    pub fn actionable_tokens(&self, state: u32) -> impl Iterator<Item = TokenKind> + '_ {
        self.actions[state as usize].iter().map(|(t, _)| *t)
    }

    /// Looks up the goto state for a nonterminal.
    pub fn goto(&self, state: u32, nonterm: u32) -> Option<u32> {
        let row = &self.goto[state as usize];
        row.binary_search_by(|(nt, _)| nt.cmp(&nonterm))
            .ok()
            .map(|index| row[index].1)
    }

    /// Gets a production's metadata.
    pub fn production(&self, id: u32) -> &ProductionInfo {
        &self.productions[id as usize]
    }

    /// Gets a nonterminal's name.
    pub fn nonterm_name(&self, id: u32) -> &str {
        &self.nonterms[id as usize]
    }

    /// The number of productions.
    pub fn production_count(&self) -> usize {
        self.productions.len()
    }

    /// The start symbol name.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Serializes the spec to its artifact form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let data = SpecData {
            actions: self
                .actions
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(token, action)| {
                            let action = match action {
                                Action::Shift(next) => ActionData::Shift(*next),
                                Action::Reduce(p) => {
                                    let info = self.production(*p);
                                    ActionData::Reduce {
                                        production_id: *p,
                                        non_term: info.nonterm.clone(),
                                        cnt: info.rhs_len,
                                    }
                                }
                                Action::Accept => ActionData::Accept,
                            };
                            (token.terminal_name(), action)
                        })
                        .collect()
                })
                .collect(),
            goto: self
                .goto
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(nt, state)| (self.nonterms[*nt as usize].clone(), *state))
                        .collect()
                })
                .collect(),
            inlines: self
                .productions
                .iter()
                .enumerate()
                .filter_map(|(id, p)| p.inline.map(|index| (id as u32, index)))
                .collect(),
            start: self.start.clone(),
            production_names: self
                .productions
                .iter()
                .map(|p| (p.nonterm.clone(), p.method.clone()))
                .collect(),
        };

        let mut bytes = vec![SPEC_VERSION];
        bytes.extend(postcard::to_allocvec(&data).expect("spec serialization does not fail"));
        bytes
    }

    /// Decodes a spec artifact, resolving its names against the
    /// compiled-in grammar.
    pub fn from_bytes(bytes: &[u8], grammar: &Grammar) -> Result<Self, SpecError> {
        let (&version, body) = bytes
            .split_first()
            .ok_or_else(|| SpecError::Incompatible("artifact is empty".to_string()))?;
        if version != SPEC_VERSION {
            return Err(SpecError::Incompatible(format!(
                "format version {version} is not supported (expected {SPEC_VERSION})"
            )));
        }

        let data: SpecData = postcard::from_bytes(body)
            .map_err(|e| SpecError::Incompatible(format!("malformed artifact body: {e}")))?;

        // Rebuild the nonterminal index from the goto maps.
        let mut nonterms: Vec<String> = Vec::new();
        let mut nt_index: HashMap<String, u32> = HashMap::new();
        let mut goto = Vec::with_capacity(data.goto.len());
        for row in &data.goto {
            let mut out = Vec::with_capacity(row.len());
            for (name, state) in row {
                let id = *nt_index.entry(name.clone()).or_insert_with(|| {
                    nonterms.push(name.clone());
                    (nonterms.len() - 1) as u32
                });
                out.push((id, *state));
            }
            out.sort_unstable();
            goto.push(out);
        }

        let inline_by_id: HashMap<u32, u8> = data.inlines.iter().copied().collect();

        let mut productions = Vec::with_capacity(data.production_names.len());
        for (id, (nonterm, method)) in data.production_names.iter().enumerate() {
            let reduce = grammar.reduce_by_name(nonterm, method).ok_or_else(|| {
                SpecError::Incompatible(format!(
                    "production `{nonterm}.{method}` is not part of this grammar"
                ))
            })?;
            let declared = grammar
                .productions
                .iter()
                .find(|p| p.lhs == nonterm && p.method == *method)
                .expect("reduce_by_name found the production");
            let lhs = *nt_index.entry(nonterm.clone()).or_insert_with(|| {
                nonterms.push(nonterm.clone());
                (nonterms.len() - 1) as u32
            });
            productions.push(ProductionInfo {
                lhs,
                nonterm: nonterm.clone(),
                method: method.clone(),
                rhs_len: declared.rhs.len() as u16,
                inline: inline_by_id.get(&(id as u32)).copied(),
                reduce,
            });
        }

        let mut actions = Vec::with_capacity(data.actions.len());
        for row in &data.actions {
            let mut out = Vec::with_capacity(row.len());
            for (name, action) in row {
                let token = TokenKind::from_terminal_name(name).ok_or_else(|| {
                    SpecError::Incompatible(format!("unknown terminal `{name}`"))
                })?;
                let action = match action {
                    ActionData::Shift(next) => Action::Shift(*next),
                    ActionData::Reduce { production_id, .. } => Action::Reduce(*production_id),
                    ActionData::Accept => Action::Accept,
                };
                out.push((token, action));
            }
            out.sort_by(|a, b| a.0.cmp(&b.0));
            actions.push(out);
        }

        debug!(
            states = actions.len(),
            productions = productions.len(),
            "loaded parser spec artifact"
        );

        Ok(Self {
            actions,
            goto,
            nonterms,
            productions,
            start: data.start,
        })
    }

    /// Loads a spec artifact from a file.
    pub fn load(path: impl AsRef<Path>, grammar: &Grammar) -> Result<Self, SpecError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, grammar)
    }

    /// Writes the spec artifact to a file.
    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}

/// The serialized artifact body.
#[derive(Serialize, Deserialize)]
struct SpecData {
    /// Per-state action maps as sorted `(terminal_name, action)` pairs.
    actions: Vec<Vec<(String, ActionData)>>,
    /// Per-state goto maps keyed by nonterminal name.
    goto: Vec<Vec<(String, u32)>>,
    /// `(production_id, child_index)` pairs for inline productions.
    inlines: Vec<(u32, u8)>,
    /// The start symbol name.
    start: String,
    /// `(nonterminal, method)` names indexed by production id.
    production_names: Vec<(String, String)>,
}

/// A serialized action cell.
#[derive(Serialize, Deserialize)]
enum ActionData {
    /// Shift and enter the state.
    Shift(u32),
    /// Reduce by the production.
    Reduce {
        /// The production id.
        production_id: u32,
        /// The left-hand side nonterminal name.
        non_term: String,
        /// The number of right-hand side symbols.
        cnt: u16,
    },
    /// The parse is complete.
    Accept,
}
