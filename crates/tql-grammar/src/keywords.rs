//! The keyword classification table.
//!
//! Every keyword belongs to exactly one class. Reserved keywords
//! (current and future) cannot be used as bare identifiers; unreserved
//! keywords always can; partial-reserved keywords can serve as pointer
//! names in disambiguating contexts (after `.`, `.<`, `@`, or another
//! reserved keyword).
//!
//! The table is fixed at build time and declared sorted by keyword text,
//! so lookup is a binary search over a static slice.

/// The classification of a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordClass {
    /// Usable as an ordinary identifier anywhere.
    Unreserved,
    /// Usable as an identifier only in disambiguating contexts.
    PartialReserved,
    /// Reserved by the current grammar.
    CurrentReserved,
    /// Reserved for future use.
    FutureReserved,
}

macro_rules! keywords {
    ($(($variant:ident, $text:literal, $class:ident),)*) => {
        /// A keyword of the language.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum Keyword {
            $(
                #[doc = concat!("The `", $text, "` keyword.")]
                $variant,
            )*
        }

        impl Keyword {
            /// Every keyword, sorted by its text.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Gets the source text of the keyword.
            pub fn text(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }

            /// Gets the classification of the keyword.
            pub fn class(self) -> KeywordClass {
                match self {
                    $(Keyword::$variant => KeywordClass::$class,)*
                }
            }
        }
    };
}

keywords! {
    (DunderDefault, "__default__", CurrentReserved),
    (DunderNew, "__new__", CurrentReserved),
    (DunderOld, "__old__", CurrentReserved),
    (DunderSource, "__source__", CurrentReserved),
    (DunderSpecified, "__specified__", CurrentReserved),
    (DunderStd, "__std__", CurrentReserved),
    (DunderSubject, "__subject__", CurrentReserved),
    (DunderType, "__type__", CurrentReserved),
    (Abort, "abort", Unreserved),
    (Abstract, "abstract", Unreserved),
    (Access, "access", Unreserved),
    (Administer, "administer", CurrentReserved),
    (After, "after", Unreserved),
    (Alias, "alias", Unreserved),
    (All, "all", Unreserved),
    (Allow, "allow", Unreserved),
    (Alter, "alter", CurrentReserved),
    (Analyze, "analyze", CurrentReserved),
    (And, "and", CurrentReserved),
    (Annotation, "annotation", Unreserved),
    (Anytype, "anytype", CurrentReserved),
    (Applied, "applied", Unreserved),
    (As, "as", Unreserved),
    (Asc, "asc", Unreserved),
    (Assignment, "assignment", Unreserved),
    (Before, "before", Unreserved),
    (Begin, "begin", CurrentReserved),
    (By, "by", CurrentReserved),
    (Cardinality, "cardinality", Unreserved),
    (Case, "case", FutureReserved),
    (Cast, "cast", Unreserved),
    (Check, "check", FutureReserved),
    (Commit, "commit", CurrentReserved),
    (Committed, "committed", Unreserved),
    (Config, "config", Unreserved),
    (Configure, "configure", CurrentReserved),
    (Conflict, "conflict", Unreserved),
    (Constraint, "constraint", Unreserved),
    (Create, "create", CurrentReserved),
    (Cube, "cube", Unreserved),
    (Current, "current", Unreserved),
    (Database, "database", Unreserved),
    (Ddl, "ddl", Unreserved),
    (Deallocate, "deallocate", FutureReserved),
    (Declare, "declare", Unreserved),
    (Default, "default", Unreserved),
    (Deferrable, "deferrable", Unreserved),
    (Deferred, "deferred", Unreserved),
    (Delegated, "delegated", Unreserved),
    (Delete, "delete", CurrentReserved),
    (Deny, "deny", Unreserved),
    (Desc, "desc", Unreserved),
    (Describe, "describe", CurrentReserved),
    (Detached, "detached", CurrentReserved),
    (Discard, "discard", FutureReserved),
    (Distinct, "distinct", CurrentReserved),
    (Do, "do", FutureReserved),
    (Drop, "drop", CurrentReserved),
    (Each, "each", Unreserved),
    (Else, "else", CurrentReserved),
    (Empty, "empty", Unreserved),
    (End, "end", FutureReserved),
    (Except, "except", PartialReserved),
    (Execute, "execute", FutureReserved),
    (Exists, "exists", CurrentReserved),
    (Explain, "explain", FutureReserved),
    (Expression, "expression", Unreserved),
    (Extending, "extending", CurrentReserved),
    (Extension, "extension", Unreserved),
    (False, "false", CurrentReserved),
    (Fetch, "fetch", FutureReserved),
    (Filter, "filter", CurrentReserved),
    (Final, "final", Unreserved),
    (First, "first", Unreserved),
    (For, "for", CurrentReserved),
    (Force, "force", Unreserved),
    (From, "from", Unreserved),
    (Function, "function", Unreserved),
    (Future, "future", Unreserved),
    (Get, "get", FutureReserved),
    (Global, "global", CurrentReserved),
    (Grant, "grant", FutureReserved),
    (Group, "group", CurrentReserved),
    (If, "if", CurrentReserved),
    (Ilike, "ilike", CurrentReserved),
    (Implicit, "implicit", Unreserved),
    (Import, "import", FutureReserved),
    (In, "in", CurrentReserved),
    (Index, "index", Unreserved),
    (Infix, "infix", Unreserved),
    (Inheritable, "inheritable", Unreserved),
    (Insert, "insert", CurrentReserved),
    (Instance, "instance", Unreserved),
    (Intersect, "intersect", PartialReserved),
    (Into, "into", Unreserved),
    (Introspect, "introspect", CurrentReserved),
    (Is, "is", CurrentReserved),
    (Isolation, "isolation", Unreserved),
    (Json, "json", Unreserved),
    (Last, "last", Unreserved),
    (Like, "like", CurrentReserved),
    (Limit, "limit", CurrentReserved),
    (Link, "link", Unreserved),
    (Listen, "listen", FutureReserved),
    (Load, "load", FutureReserved),
    (Lock, "lock", FutureReserved),
    (Match, "match", FutureReserved),
    (Migration, "migration", Unreserved),
    (Module, "module", CurrentReserved),
    (Move, "move", FutureReserved),
    (Multi, "multi", Unreserved),
    (Named, "named", Unreserved),
    (Never, "never", FutureReserved),
    (Not, "not", CurrentReserved),
    (Notify, "notify", FutureReserved),
    (Object, "object", Unreserved),
    (Of, "of", Unreserved),
    (Offset, "offset", CurrentReserved),
    (On, "on", CurrentReserved),
    (Only, "only", Unreserved),
    (Onto, "onto", Unreserved),
    (Operator, "operator", Unreserved),
    (Optional, "optional", CurrentReserved),
    (Optionality, "optionality", Unreserved),
    (Or, "or", CurrentReserved),
    (Order, "order", Unreserved),
    (Orphan, "orphan", Unreserved),
    (Over, "over", FutureReserved),
    (Overloaded, "overloaded", Unreserved),
    (Owned, "owned", Unreserved),
    (Package, "package", Unreserved),
    (Partition, "partition", FutureReserved),
    (Policy, "policy", Unreserved),
    (Populate, "populate", Unreserved),
    (Postfix, "postfix", Unreserved),
    (Prefix, "prefix", Unreserved),
    (Prepare, "prepare", FutureReserved),
    (Property, "property", Unreserved),
    (Proposed, "proposed", Unreserved),
    (Pseudo, "pseudo", Unreserved),
    (Raise, "raise", FutureReserved),
    (Read, "read", Unreserved),
    (Refresh, "refresh", FutureReserved),
    (Reindex, "reindex", FutureReserved),
    (Reject, "reject", Unreserved),
    (Release, "release", Unreserved),
    (Rename, "rename", Unreserved),
    (Repeatable, "repeatable", Unreserved),
    (Required, "required", Unreserved),
    (Reset, "reset", Unreserved),
    (Restrict, "restrict", Unreserved),
    (Revoke, "revoke", FutureReserved),
    (Rewrite, "rewrite", Unreserved),
    (Role, "role", Unreserved),
    (Roles, "roles", Unreserved),
    (Rollback, "rollback", CurrentReserved),
    (Rollup, "rollup", Unreserved),
    (Savepoint, "savepoint", Unreserved),
    (Scalar, "scalar", Unreserved),
    (Schema, "schema", Unreserved),
    (Sdl, "sdl", Unreserved),
    (Select, "select", CurrentReserved),
    (Serializable, "serializable", Unreserved),
    (Session, "session", Unreserved),
    (Set, "set", CurrentReserved),
    (Single, "single", CurrentReserved),
    (Source, "source", Unreserved),
    (Start, "start", CurrentReserved),
    (Superuser, "superuser", Unreserved),
    (System, "system", Unreserved),
    (Target, "target", Unreserved),
    (Ternary, "ternary", Unreserved),
    (Text, "text", Unreserved),
    (Then, "then", Unreserved),
    (To, "to", Unreserved),
    (Transaction, "transaction", Unreserved),
    (Trigger, "trigger", Unreserved),
    (True, "true", CurrentReserved),
    (Type, "type", Unreserved),
    (Typeof, "typeof", CurrentReserved),
    (Union, "union", PartialReserved),
    (Unless, "unless", Unreserved),
    (Update, "update", CurrentReserved),
    (Using, "using", Unreserved),
    (Variadic, "variadic", CurrentReserved),
    (Verbose, "verbose", Unreserved),
    (Version, "version", Unreserved),
    (View, "view", Unreserved),
    (When, "when", FutureReserved),
    (Window, "window", FutureReserved),
    (With, "with", CurrentReserved),
    (Write, "write", Unreserved),
}

impl Keyword {
    /// Looks up an identifier in the keyword table.
    ///
    /// The identifier must already be lowercase; keyword matching is
    /// case-insensitive and the tokenizer lowercases before lookup.
    pub fn lookup(ident: &str) -> Option<Keyword> {
        Self::ALL
            .binary_search_by(|kw| kw.text().cmp(ident))
            .ok()
            .map(|index| Self::ALL[index])
    }

    /// Determines if the keyword is reserved (currently or for the
    /// future).
    pub fn is_reserved(self) -> bool {
        matches!(
            self.class(),
            KeywordClass::CurrentReserved | KeywordClass::FutureReserved
        )
    }

    /// Determines if the keyword is a dunder name (`__type__`, …).
    pub fn is_dunder(self) -> bool {
        self.text().starts_with("__")
    }

    /// Gets the token name of the keyword as used in the parser tables:
    /// the uppercased text, with dunder names rendered as `DUNDER<NAME>`.
    pub fn token_name(self) -> String {
        let text = self.text();
        if self.is_dunder() {
            format!("DUNDER{}", text.trim_matches('_').to_uppercase())
        } else {
            text.to_uppercase()
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn table_is_sorted_by_text() {
        for pair in Keyword::ALL.windows(2) {
            assert!(
                pair[0].text() < pair[1].text(),
                "keywords out of order: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn lookup_finds_every_keyword() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::lookup(kw.text()), Some(*kw));
        }
        assert_eq!(Keyword::lookup("username"), None);
    }

    #[test]
    fn classes_are_consistent() {
        assert_eq!(Keyword::lookup("select").unwrap().class(), KeywordClass::CurrentReserved);
        assert_eq!(Keyword::lookup("explain").unwrap().class(), KeywordClass::FutureReserved);
        assert_eq!(Keyword::lookup("union").unwrap().class(), KeywordClass::PartialReserved);
        assert_eq!(Keyword::lookup("property").unwrap().class(), KeywordClass::Unreserved);
        assert!(Keyword::DunderType.is_dunder());
        assert_eq!(Keyword::DunderType.token_name(), "DUNDERTYPE");
        assert_eq!(Keyword::Order.token_name(), "ORDER");
    }
}
