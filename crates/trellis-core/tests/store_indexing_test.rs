/// Store and Index Integration Test
///
/// Validates idempotent insertion, the containment invariant between facts
/// and field indices, and the shared-mutable id-set contract.
use std::cell::RefCell;
use std::rc::Rc;
use trellis_core::*;

fn t(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(s, p, o)
}

#[test]
fn test_add_fact_is_idempotent() {
    let mut store = TripleStore::new();

    assert!(store.add_fact(t("alice", "friend", "bob")));
    assert!(!store.add_fact(t("alice", "friend", "bob")));

    assert_eq!(store.len(), 1);
    let stats = store.stats();
    assert_eq!(stats.fact_count, 1);
    assert_eq!(stats.subject.indexed_facts, 1);
    assert_eq!(stats.predicate.indexed_facts, 1);
    assert_eq!(stats.object.indexed_facts, 1);
}

#[test]
fn test_containment_invariant_after_insert() {
    let mut store = TripleStore::new();
    let facts = vec![
        t("alice", "friend", "bob"),
        t("alice", "age", "30"),
        t("bob", "friend", "carol"),
    ];
    assert!(store.add_facts(facts.clone()));

    for (id, fact) in facts.iter().enumerate() {
        assert!(store.has_fact(fact));
        for field in Field::ALL {
            let ids = store
                .ids_for(field, fact.field(field))
                .expect("field value must be indexed");
            assert!(
                ids.contains(&(id as FactId)),
                "identifier {id} missing from {field} index"
            );
        }
    }
}

#[test]
fn test_has_fact_distinguishes_field_positions() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));

    // Same values, different positions: a different fact.
    assert!(!store.has_fact(&t("bob", "friend", "alice")));
    assert!(store.has_fact(&t("alice", "friend", "bob")));
}

#[test]
fn test_add_facts_reports_any_duplicate() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));

    let outcome = store.add_facts(vec![
        t("carol", "friend", "dave"),
        t("alice", "friend", "bob"), // duplicate
        t("erin", "friend", "frank"),
    ]);

    assert!(!outcome, "a duplicate in the batch must flip the result");
    // Later facts were still inserted.
    assert_eq!(store.len(), 3);
    assert!(store.has_fact(&t("erin", "friend", "frank")));
}

#[test]
fn test_identifiers_are_monotonic_and_never_reused() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));
    store.add_fact(t("alice", "friend", "bob")); // rejected, must not burn an id
    store.add_fact(t("carol", "friend", "dave"));

    assert_eq!(store.get_fact(0), Some(t("alice", "friend", "bob")));
    assert_eq!(store.get_fact(1), Some(t("carol", "friend", "dave")));
    assert_eq!(store.get_fact(2), None);
}

#[test]
fn test_index_sets_are_shared_and_grow_in_place() {
    let mut store = TripleStore::new();
    let selection = store.selection(Field::Subject, &Value::from("alice"));

    // Capture the delivered set handle, not a snapshot.
    let captured: Rc<RefCell<Option<IdSet>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&captured);
    selection.subscribe(move |ids: &IdSet| {
        sink.borrow_mut().replace(Rc::clone(ids));
    });

    store.add_fact(t("alice", "friend", "bob"));
    let handle = captured.borrow().clone().expect("selection must have fired");
    assert_eq!(handle.borrow().len(), 1);

    // The same underlying set observes the later insertion.
    store.add_fact(t("alice", "friend", "carol"));
    assert_eq!(handle.borrow().len(), 2);
    assert!(handle.borrow().contains(&1));
}

#[test]
fn test_single_insert_emits_global_then_field_deltas_in_order() {
    let mut store = TripleStore::new();
    let fact = t("alice", "friend", "bob");
    let sequence = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&sequence);
    store.global_channel().observe(move |_: &IdSet| sink.borrow_mut().push("global"));
    for field in Field::ALL {
        let sink = Rc::clone(&sequence);
        let expected_key = fact.field(field).clone();
        store.field_channel(field).observe(move |delta: &IndexDelta| {
            assert_eq!(delta.key, expected_key);
            assert!(delta.ids.borrow().contains(&0));
            sink.borrow_mut().push(field.as_str());
        });
    }

    store.add_fact(fact);
    assert_eq!(
        *sequence.borrow(),
        vec!["global", "subject", "predicate", "object"],
        "one insert must deliver the global set before the field deltas"
    );
}

#[test]
fn test_duplicate_insert_emits_nothing() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));

    let deliveries = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&deliveries);
    store.global_channel().observe(move |_: &IdSet| *sink.borrow_mut() += 1);

    store.add_fact(t("alice", "friend", "bob"));
    assert_eq!(*deliveries.borrow(), 0);
}

#[test]
fn test_resolve_materializes_identifier_sets() {
    let mut store = TripleStore::new();
    store.add_facts(vec![t("alice", "friend", "bob"), t("carol", "friend", "dave")]);

    let ids: FactIdSet = [0, 1].into_iter().collect();
    let triples = store.resolve(&ids);
    assert_eq!(triples.len(), 2);
    assert!(triples.contains(&t("alice", "friend", "bob")));

    // Unknown identifiers are skipped, not errors.
    let ids: FactIdSet = [0, 99].into_iter().collect();
    assert_eq!(store.resolve(&ids).len(), 1);
}

#[test]
fn test_facts_round_trip_through_json() {
    let fact = t("alice", "friend", "bob");
    let encoded = serde_json::to_string(&fact).expect("triples serialize");
    let decoded: Triple = serde_json::from_str(&encoded).expect("triples deserialize");
    assert_eq!(decoded, fact);
}

#[test]
fn test_selection_cache_survives_duplicate_inserts() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));

    let key = Value::from("alice");
    let first = store.selection(Field::Subject, &key);
    store.add_fact(t("alice", "friend", "bob")); // duplicate
    let second = store.selection(Field::Subject, &key);

    assert!(first.ptr_eq(&second), "selection must be reused, not rebuilt");
    assert_eq!(store.stats().subject.cached_selections, 1);
}
