//! Parser-spec artifact round-trip.

use pretty_assertions::assert_eq;
use tql_grammar::default_grammar;
use tql_grammar::parse;
use tql_grammar::tokenize;
use tql_grammar::Dialect;
use tql_grammar::Spec;
use tql_grammar::SpecError;

#[test]
fn artifact_round_trips() {
    let spec = Spec::from_grammar(default_grammar()).unwrap();
    let bytes = spec.to_bytes();
    assert_eq!(bytes[0], tql_grammar::spec::SPEC_VERSION);

    let reloaded = Spec::from_bytes(&bytes, default_grammar()).unwrap();
    assert_eq!(reloaded.start(), spec.start());
    assert_eq!(reloaded.production_count(), spec.production_count());

    // A reloaded spec drives the parser identically.
    let tokens = tokenize("select User { name } filter .name = 'x'").unwrap();
    let fresh = parse(Dialect::Block, &tokens, &spec);
    let loaded = parse(Dialect::Block, &tokens, &reloaded);
    assert!(fresh.errors.is_empty());
    assert!(loaded.errors.is_empty());
    assert_eq!(fresh.out, loaded.out);
}

#[test]
fn artifact_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grammar.bc");

    let spec = Spec::from_grammar(default_grammar()).unwrap();
    spec.write(&path).unwrap();

    let loaded = Spec::load(&path, default_grammar()).unwrap();
    assert_eq!(loaded.production_count(), spec.production_count());
}

#[test]
fn version_mismatches_are_incompatible() {
    let spec = Spec::from_grammar(default_grammar()).unwrap();
    let mut bytes = spec.to_bytes();
    bytes[0] = 99;

    let error = Spec::from_bytes(&bytes, default_grammar())
        .err()
        .expect("a bumped version byte must not load");
    match error {
        SpecError::Incompatible(message) => {
            assert!(message.contains("version"), "message: {message}");
        }
        other => panic!("expected an incompatibility error, got {other}"),
    }
}

#[test]
fn empty_artifacts_are_incompatible() {
    let error = Spec::from_bytes(&[], default_grammar())
        .err()
        .expect("an empty artifact must not load");
    assert!(matches!(error, SpecError::Incompatible(_)));
}
