//! Offline LALR(1) table generation.
//!
//! The construction is the classic one: build the LR(0) canonical
//! collection, discover spontaneous lookaheads and propagation links
//! from the kernels, propagate to a fixpoint, then fill the ACTION and
//! GOTO tables. Every shift/reduce conflict must be resolved by the
//! declared precedence ladder and any reduce/reduce conflict fails the
//! build: the runtime driver relies on the tables being pure LR.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;

use tracing::debug;

use super::Assoc;
use super::Grammar;
use super::Symbol;
use crate::token::TokenKind;

/// A parse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Shift the token and enter the state.
    Shift(u32),
    /// Reduce by the production.
    Reduce(u32),
    /// The parse is complete.
    Accept,
}

/// The generated tables.
#[derive(Debug)]
pub struct Tables {
    /// Per-state action maps, sorted by token kind.
    pub actions: Vec<Vec<(TokenKind, Action)>>,
    /// Per-state goto maps, keyed by nonterminal index.
    pub goto: Vec<Vec<(u32, u32)>>,
    /// The nonterminal names, indexed by the goto keys.
    pub nonterms: Vec<String>,
}

/// A table generation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// A production references a nonterminal that has none of its own.
    #[error("nonterminal `{0}` is referenced but has no productions")]
    Undefined(String),
    /// The start symbol is missing.
    #[error("start symbol `{0}` has no productions")]
    NoStart(String),
    /// An unresolvable shift/reduce conflict.
    #[error(
        "state {state}: shift/reduce conflict on {token} against `{production}`; \
         assign precedence to resolve it"
    )]
    ShiftReduce {
        /// The state the conflict occurred in.
        state: usize,
        /// The conflicting lookahead token.
        token: String,
        /// The production that wanted to reduce.
        production: String,
    },
    /// A reduce/reduce conflict.
    #[error("state {state}: reduce/reduce conflict on {token} between `{first}` and `{second}`")]
    ReduceReduce {
        /// The state the conflict occurred in.
        state: usize,
        /// The conflicting lookahead token.
        token: String,
        /// One conflicting production.
        first: String,
        /// The other conflicting production.
        second: String,
    },
}

/// An internal grammar symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Sym {
    /// A terminal, by index.
    T(u32),
    /// A nonterminal, by index.
    N(u32),
}

/// An LR(0) item: a production and a dot position.
type Item = (u32, u32);

/// The lookahead standing for "propagated from the kernel".
const DUMMY: u32 = u32::MAX;

struct Builder<'g> {
    grammar: &'g Grammar,
    terms: Vec<TokenKind>,
    nts: Vec<&'static str>,
    /// Production right-hand sides, the augmented one last.
    rhs: Vec<Vec<Sym>>,
    /// Production left-hand sides, by nonterminal index.
    lhs: Vec<u32>,
    /// Production indices grouped by their left-hand side.
    by_nt: Vec<Vec<u32>>,
    nullable: Vec<bool>,
    first: Vec<BTreeSet<u32>>,
    eoi: u32,
}

/// Generates LALR(1) tables for the grammar.
pub fn generate(grammar: &Grammar) -> Result<Tables, GenerateError> {
    let builder = Builder::index(grammar)?;
    builder.run()
}

impl<'g> Builder<'g> {
    fn index(grammar: &'g Grammar) -> Result<Self, GenerateError> {
        let mut term_ids: HashMap<TokenKind, u32> = HashMap::new();
        let mut terms = Vec::new();
        let mut nt_ids: HashMap<&'static str, u32> = HashMap::new();
        let mut nts: Vec<&'static str> = Vec::new();

        let mut term_of = |kind: TokenKind, terms: &mut Vec<TokenKind>| {
            *term_ids.entry(kind).or_insert_with(|| {
                terms.push(kind);
                (terms.len() - 1) as u32
            })
        };

        // Nonterminals are those with productions.
        for p in &grammar.productions {
            if !nt_ids.contains_key(p.lhs) {
                nt_ids.insert(p.lhs, nts.len() as u32);
                nts.push(p.lhs);
            }
        }
        let start = *nt_ids
            .get(grammar.start)
            .ok_or_else(|| GenerateError::NoStart(grammar.start.to_string()))?;

        let eoi = term_of(TokenKind::Eoi, &mut terms);

        let mut rhs: Vec<Vec<Sym>> = Vec::with_capacity(grammar.productions.len() + 1);
        let mut lhs: Vec<u32> = Vec::with_capacity(grammar.productions.len() + 1);
        for p in &grammar.productions {
            let mut symbols = Vec::with_capacity(p.rhs.len());
            for s in &p.rhs {
                symbols.push(match s {
                    Symbol::Term(kind) => Sym::T(term_of(*kind, &mut terms)),
                    Symbol::NonTerm(name) => Sym::N(
                        *nt_ids
                            .get(name)
                            .ok_or_else(|| GenerateError::Undefined((*name).to_string()))?,
                    ),
                });
            }
            rhs.push(symbols);
            lhs.push(nt_ids[p.lhs]);
        }

        // The augmented start production.
        let accept_nt = nts.len() as u32;
        nts.push("$accept");
        rhs.push(vec![Sym::N(start)]);
        lhs.push(accept_nt);

        let mut by_nt = vec![Vec::new(); nts.len()];
        for (id, l) in lhs.iter().enumerate() {
            by_nt[*l as usize].push(id as u32);
        }

        let mut builder = Builder {
            grammar,
            terms,
            nts,
            rhs,
            lhs,
            by_nt,
            nullable: Vec::new(),
            first: Vec::new(),
            eoi,
        };
        builder.compute_first();
        Ok(builder)
    }

    fn compute_first(&mut self) {
        let n = self.nts.len();
        self.nullable = vec![false; n];
        self.first = vec![BTreeSet::new(); n];

        let mut changed = true;
        while changed {
            changed = false;
            for (p, symbols) in self.rhs.iter().enumerate() {
                let lhs = self.lhs[p] as usize;
                let mut all_nullable = true;
                let mut acc: BTreeSet<u32> = BTreeSet::new();
                for sym in symbols {
                    match sym {
                        Sym::T(t) => {
                            acc.insert(*t);
                            all_nullable = false;
                        }
                        Sym::N(nt) => {
                            acc.extend(self.first[*nt as usize].iter().copied());
                            if !self.nullable[*nt as usize] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !self.nullable[lhs] {
                    self.nullable[lhs] = true;
                    changed = true;
                }
                let before = self.first[lhs].len();
                self.first[lhs].extend(acc);
                if self.first[lhs].len() != before {
                    changed = true;
                }
            }
        }
    }

    /// FIRST of a symbol sequence followed by a lookahead set.
    fn first_of(&self, symbols: &[Sym], lookahead: &BTreeSet<u32>) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        for sym in symbols {
            match sym {
                Sym::T(t) => {
                    out.insert(*t);
                    return out;
                }
                Sym::N(nt) => {
                    out.extend(self.first[*nt as usize].iter().copied());
                    if !self.nullable[*nt as usize] {
                        return out;
                    }
                }
            }
        }
        out.extend(lookahead.iter().copied());
        out
    }

    fn next_sym(&self, item: Item) -> Option<Sym> {
        self.rhs[item.0 as usize].get(item.1 as usize).copied()
    }

    /// The LR(1) closure of a set of items with lookahead sets.
    fn closure(&self, kernel: &[(Item, BTreeSet<u32>)]) -> BTreeMap<Item, BTreeSet<u32>> {
        let mut items: BTreeMap<Item, BTreeSet<u32>> = BTreeMap::new();
        let mut queue: VecDeque<Item> = VecDeque::new();

        for (item, la) in kernel {
            items.entry(*item).or_default().extend(la.iter().copied());
            queue.push_back(*item);
        }

        while let Some(item) = queue.pop_front() {
            let Some(Sym::N(nt)) = self.next_sym(item) else {
                continue;
            };
            let la = items[&item].clone();
            let beta = &self.rhs[item.0 as usize][(item.1 + 1) as usize..];
            let firsts = self.first_of(beta, &la);
            for &p in &self.by_nt[nt as usize] {
                let is_new = !items.contains_key(&(p, 0));
                let entry = items.entry((p, 0)).or_default();
                let before = entry.len();
                entry.extend(firsts.iter().copied());
                if is_new || entry.len() != before {
                    queue.push_back((p, 0));
                }
            }
        }

        items
    }

    fn run(self) -> Result<Tables, GenerateError> {
        let accept_prod = (self.rhs.len() - 1) as u32;

        // LR(0) canonical collection, keyed by sorted kernels.
        let mut kernels: Vec<Vec<Item>> = vec![vec![(accept_prod, 0)]];
        let mut state_of: BTreeMap<Vec<Item>, u32> = BTreeMap::new();
        state_of.insert(kernels[0].clone(), 0);
        let mut transitions: Vec<BTreeMap<Sym, u32>> = Vec::new();

        let mut pending = 0usize;
        while pending < kernels.len() {
            let kernel = kernels[pending].clone();
            let seed: Vec<(Item, BTreeSet<u32>)> = kernel
                .iter()
                .map(|item| (*item, BTreeSet::new()))
                .collect();
            let closure = self.closure(&seed);

            let mut moves: BTreeMap<Sym, BTreeSet<Item>> = BTreeMap::new();
            for item in closure.keys() {
                if let Some(sym) = self.next_sym(*item) {
                    moves.entry(sym).or_default().insert((item.0, item.1 + 1));
                }
            }

            let mut out = BTreeMap::new();
            for (sym, kernel_items) in moves {
                let key: Vec<Item> = kernel_items.into_iter().collect();
                let next = match state_of.get(&key) {
                    Some(id) => *id,
                    None => {
                        let id = kernels.len() as u32;
                        state_of.insert(key.clone(), id);
                        kernels.push(key);
                        id
                    }
                };
                out.insert(sym, next);
            }
            transitions.push(out);
            pending += 1;
        }

        // Lookahead discovery: spontaneous lookaheads and propagation
        // links from each kernel item, probed with the dummy lookahead.
        let mut lookaheads: Vec<BTreeMap<Item, BTreeSet<u32>>> =
            vec![BTreeMap::new(); kernels.len()];
        lookaheads[0]
            .entry((accept_prod, 0))
            .or_default()
            .insert(self.eoi);

        let mut props: Vec<((u32, Item), (u32, Item))> = Vec::new();
        for (state, kernel) in kernels.iter().enumerate() {
            for &kernel_item in kernel {
                let mut dummy_set = BTreeSet::new();
                dummy_set.insert(DUMMY);
                let closure = self.closure(&[(kernel_item, dummy_set)]);
                for (item, la) in &closure {
                    let Some(sym) = self.next_sym(*item) else {
                        continue;
                    };
                    let target_state = transitions[state][&sym];
                    let target_item = (item.0, item.1 + 1);
                    for &a in la {
                        if a == DUMMY {
                            props.push((
                                (state as u32, kernel_item),
                                (target_state, target_item),
                            ));
                        } else {
                            lookaheads[target_state as usize]
                                .entry(target_item)
                                .or_default()
                                .insert(a);
                        }
                    }
                }
            }
        }

        // Propagate to a fixpoint.
        let mut changed = true;
        while changed {
            changed = false;
            for ((from_state, from_item), (to_state, to_item)) in &props {
                let source: Vec<u32> = lookaheads[*from_state as usize]
                    .get(from_item)
                    .map(|s| s.iter().copied().collect())
                    .unwrap_or_default();
                if source.is_empty() {
                    continue;
                }
                let entry = lookaheads[*to_state as usize]
                    .entry(*to_item)
                    .or_default();
                let before = entry.len();
                entry.extend(source);
                if entry.len() != before {
                    changed = true;
                }
            }
        }

        debug!(
            states = kernels.len(),
            productions = self.rhs.len(),
            terminals = self.terms.len(),
            nonterminals = self.nts.len(),
            "built LALR automaton"
        );

        // Fill the tables.
        let mut actions: Vec<Vec<(TokenKind, Action)>> = Vec::with_capacity(kernels.len());
        let mut goto: Vec<Vec<(u32, u32)>> = Vec::with_capacity(kernels.len());

        for (state, kernel) in kernels.iter().enumerate() {
            let seed: Vec<(Item, BTreeSet<u32>)> = kernel
                .iter()
                .map(|item| {
                    (
                        *item,
                        lookaheads[state].get(item).cloned().unwrap_or_default(),
                    )
                })
                .collect();
            let closure = self.closure(&seed);

            let mut row: BTreeMap<u32, Action> = BTreeMap::new();

            for (sym, target) in &transitions[state] {
                if let Sym::T(t) = sym {
                    row.insert(*t, Action::Shift(*target));
                }
            }

            for (item, la) in &closure {
                if self.next_sym(*item).is_some() {
                    continue;
                }
                let action = if item.0 == accept_prod {
                    Action::Accept
                } else {
                    Action::Reduce(item.0)
                };
                for &token in la {
                    self.insert_action(state, &mut row, token, action)?;
                }
            }

            actions.push(
                row.into_iter()
                    .map(|(t, a)| (self.terms[t as usize], a))
                    .collect(),
            );
            let mut nt_row: Vec<(u32, u32)> = transitions[state]
                .iter()
                .filter_map(|(sym, target)| match sym {
                    Sym::N(nt) => Some((*nt, *target)),
                    Sym::T(_) => None,
                })
                .collect();
            nt_row.sort_unstable();
            goto.push(nt_row);
        }

        let mut sorted_actions = actions;
        for row in &mut sorted_actions {
            row.sort_by(|a, b| a.0.cmp(&b.0));
        }

        Ok(Tables {
            actions: sorted_actions,
            goto,
            nonterms: self.nts.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// Inserts an action, resolving conflicts through the precedence
    /// ladder.
    fn insert_action(
        &self,
        state: usize,
        row: &mut BTreeMap<u32, Action>,
        token: u32,
        action: Action,
    ) -> Result<(), GenerateError> {
        let Some(&existing) = row.get(&token) else {
            row.insert(token, action);
            return Ok(());
        };
        if existing == action {
            return Ok(());
        }

        let token_kind = self.terms[token as usize];
        match (existing, action) {
            (Action::Shift(_), Action::Reduce(p)) | (Action::Reduce(p), Action::Shift(_)) => {
                let shift = if matches!(existing, Action::Shift(_)) {
                    existing
                } else {
                    action
                };
                let prod_prec = self.production_prec(p);
                let token_prec = self.grammar.token_prec.get(&token_kind).copied();
                match (prod_prec, token_prec) {
                    (Some(pp), Some(tp)) => {
                        use std::cmp::Ordering;
                        match (pp as u32).cmp(&(tp as u32)) {
                            Ordering::Greater => {
                                row.insert(token, Action::Reduce(p));
                            }
                            Ordering::Less => {
                                row.insert(token, shift);
                            }
                            Ordering::Equal => match pp.assoc() {
                                Assoc::Left => {
                                    row.insert(token, Action::Reduce(p));
                                }
                                Assoc::Right => {
                                    row.insert(token, shift);
                                }
                                Assoc::NonAssoc => {
                                    row.remove(&token);
                                }
                            },
                        }
                    }
                    _ => {
                        return Err(GenerateError::ShiftReduce {
                            state,
                            token: token_kind.terminal_name(),
                            production: self.production_name(p),
                        });
                    }
                }
            }
            (Action::Reduce(a), Action::Reduce(b)) => {
                return Err(GenerateError::ReduceReduce {
                    state,
                    token: token_kind.terminal_name(),
                    first: self.production_name(a),
                    second: self.production_name(b),
                });
            }
            (other, _) => {
                // Accept conflicts cannot arise: the accept item's only
                // lookahead is the end of input.
                unreachable!("unexpected action conflict with {other:?}");
            }
        }
        Ok(())
    }

    /// The effective precedence of a production: the explicit class when
    /// declared, the rightmost terminal's class otherwise.
    fn production_prec(&self, p: u32) -> Option<super::Prec> {
        let production = &self.grammar.productions[p as usize];
        if let Some(prec) = production.prec {
            return Some(prec);
        }
        production.rhs.iter().rev().find_map(|sym| match sym {
            Symbol::Term(kind) => self.grammar.token_prec.get(kind).copied(),
            Symbol::NonTerm(_) => None,
        })
    }

    fn production_name(&self, p: u32) -> String {
        let production = &self.grammar.productions[p as usize];
        format!("{}.{}", production.lhs, production.method)
    }
}
