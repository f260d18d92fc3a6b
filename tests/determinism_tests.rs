//! Assignment resolution and compilation must be byte-identical across
//! runs and independent of selection order.

mod common;

use std::collections::BTreeMap;

use common::SourceFixture;
use proptest::prelude::*;
use tempfile::tempdir;

use skillweaver::compile::{DocumentCompiler, load_agents};
use skillweaver::matrix::{StackAgentEntry, load_layers, merge_layers};
use skillweaver::resolve::{AssignmentConfig, ResolveOptions, resolve_assignments};

fn stack_config() -> AssignmentConfig {
    let mut roles: BTreeMap<String, StackAgentEntry> = BTreeMap::new();
    roles.insert(
        "framework".to_string(),
        StackAgentEntry {
            skill: "alpha".to_string(),
            preloaded: true,
        },
    );
    roles.insert(
        "testing".to_string(),
        StackAgentEntry {
            skill: "beta".to_string(),
            preloaded: false,
        },
    );
    roles.insert(
        "database".to_string(),
        StackAgentEntry {
            skill: "gamma".to_string(),
            preloaded: false,
        },
    );
    let mut agents = BTreeMap::new();
    agents.insert("writer".to_string(), roles);
    AssignmentConfig::Stack(agents)
}

proptest! {
    #[test]
    fn assignment_is_order_independent(
        selection in Just(vec![
            "alpha".to_string(),
            "beta".to_string(),
            "gamma".to_string(),
            "delta".to_string(),
        ])
        .prop_shuffle()
    ) {
        let baseline = resolve_assignments(
            &["alpha".to_string(), "beta".to_string(), "gamma".to_string(), "delta".to_string()],
            &["writer".to_string()],
            &stack_config(),
            ResolveOptions::default(),
        );
        let permuted = resolve_assignments(
            &selection,
            &["writer".to_string()],
            &stack_config(),
            ResolveOptions::default(),
        );
        prop_assert_eq!(baseline, permuted);
    }
}

#[test]
fn compiled_document_is_identical_for_permuted_selection() {
    let tmp = tempdir().unwrap();
    let source = SourceFixture::new(tmp.path().join("source"));
    for id in ["alpha", "beta", "gamma"] {
        source.skill(id, "misc").write();
    }
    source.agent("writer", None);
    source.agent_template("writer");

    let layers = load_layers(&source.root, None).unwrap();
    let (matrix, _) = merge_layers(layers.shared, layers.local);
    let agents = load_agents(&source.root, None).unwrap();
    let compiler = DocumentCompiler::new(&matrix, &agents, source.root.clone(), None);

    let forward = resolve_assignments(
        &["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
        &["writer".to_string()],
        &stack_config(),
        ResolveOptions::default(),
    );
    let backward = resolve_assignments(
        &["gamma".to_string(), "beta".to_string(), "alpha".to_string()],
        &["writer".to_string()],
        &stack_config(),
        ResolveOptions::default(),
    );

    let doc_forward = compiler.compile(&forward[0]).unwrap();
    let doc_backward = compiler.compile(&backward[0]).unwrap();
    assert_eq!(doc_forward.as_bytes(), doc_backward.as_bytes());
}
