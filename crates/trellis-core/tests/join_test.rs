/// Join Engine Integration Test
///
/// Validates natural-join composition of two live solution streams and the
/// suppression of empty join results, asserted by callback count rather
/// than empty-set delivery.
use std::cell::RefCell;
use std::rc::Rc;
use trellis_core::*;

fn t(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(s, p, o)
}

fn record(channel: &Channel<SolutionSet>) -> Rc<RefCell<Vec<SolutionSet>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    channel.subscribe(move |solutions: &SolutionSet| sink.borrow_mut().push(solutions.clone()));
    seen
}

#[test]
fn test_join_combines_solutions_on_shared_variables() {
    let mut store = TripleStore::new();
    store.add_facts(vec![
        t("alice", "friend", "bob"),
        t("bob", "member", "chess-club"),
    ]);

    let friends = store.param_query(&Pattern::new("?x", "friend", "?y")).unwrap();
    let members = store.param_query(&Pattern::new("?y", "member", "?club")).unwrap();
    let joined = join(&friends, &members);

    let result = joined.last().expect("both sides carry solutions");
    assert_eq!(result.len(), 1);
    let only = result.iter().next().unwrap();
    assert_eq!(only.get("x"), Some(&Value::from("alice")));
    assert_eq!(only.get("y"), Some(&Value::from("bob")));
    assert_eq!(only.get("club"), Some(&Value::from("chess-club")));
}

#[test]
fn test_incompatible_bindings_suppress_the_update() {
    let mut store = TripleStore::new();
    store.add_facts(vec![
        t("alice", "friend", "bob"),
        t("carol", "member", "gym"),
    ]);

    let friends = store.param_query(&Pattern::new("?y", "friend", "?z")).unwrap();
    let members = store.param_query(&Pattern::new("?y", "member", "?club")).unwrap();
    let joined = join(&friends, &members);

    // alice vs carol disagree on ?y: no callback at all, not an empty set.
    let seen = record(&joined);
    assert!(seen.borrow().is_empty());
    assert!(joined.last().is_none());
}

#[test]
fn test_join_reacts_to_later_insertions() {
    let mut store = TripleStore::new();
    store.add_fact(t("alice", "friend", "bob"));

    let friends = store.param_query(&Pattern::new("?x", "friend", "?y")).unwrap();
    let members = store.param_query(&Pattern::new("?y", "member", "?club")).unwrap();
    let joined = join(&friends, &members);
    let seen = record(&joined);
    assert!(seen.borrow().is_empty(), "nothing to join yet");

    store.add_fact(t("bob", "member", "chess-club"));

    let last = seen.borrow().last().cloned().expect("join must fire");
    let mut expected = Solution::new();
    expected.bind("x", Value::from("alice"));
    expected.bind("y", Value::from("bob"));
    expected.bind("club", Value::from("chess-club"));
    let expected: SolutionSet = [expected].into_iter().collect();
    assert_eq!(last, expected);
}

#[test]
fn test_one_sided_streams_never_join() {
    let mut store = TripleStore::new();
    let friends = store.param_query(&Pattern::new("?x", "friend", "?y")).unwrap();
    let members = store.param_query(&Pattern::new("?y", "member", "?club")).unwrap();
    let joined = join(&friends, &members);
    let seen = record(&joined);

    // Only the friend side ever fires.
    store.add_fact(t("alice", "friend", "bob"));
    store.add_fact(t("carol", "friend", "dave"));

    assert!(seen.borrow().is_empty());
}
