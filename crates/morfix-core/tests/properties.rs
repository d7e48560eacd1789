// Interning and affix round-trip properties

use std::sync::Arc;

use morfix_core::{
    Condition, ConditionPool, Direction, EntrySpec, FlagPool, FlagSet, Rules, parse_conditions,
};
use proptest::prelude::*;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        "[a-e]".prop_map(|s| Condition::literal(s.chars().next().unwrap_or('a'))),
        ("[a-e]{2,3}", any::<bool>()).prop_map(|(s, neg)| Condition::range(s.chars(), neg)),
        any::<bool>().prop_map(|negated| Condition::Wildcard { negated }),
    ]
}

proptest! {
    #[test]
    fn flag_interning_ignores_order_and_repetition(flags in "[A-H]{0,8}") {
        let mut pool = FlagPool::new();
        let a = pool.intern(&flags);
        let mut reversed: Vec<char> = flags.chars().rev().collect();
        reversed.extend(flags.chars());
        let b = pool.intern(&reversed.into_iter().collect::<String>());
        prop_assert!(FlagSet::same(&a, &b));
        for c in flags.chars() {
            prop_assert!(a.contains(c));
        }
    }

    #[test]
    fn distinct_flag_content_never_shares(x in "[A-H]{1,6}", y in "[A-H]{1,6}") {
        let mut pool = FlagPool::new();
        let a = pool.intern(&x);
        let b = pool.intern(&y);
        prop_assert_eq!(FlagSet::same(&a, &b), a.as_str() == b.as_str());
    }

    #[test]
    fn condition_interning_by_content(
        xs in prop::collection::vec(condition(), 0..4),
        ys in prop::collection::vec(condition(), 0..4),
    ) {
        let mut pool = ConditionPool::new();
        let a = pool.intern(xs.clone());
        let b = pool.intern(ys.clone());
        let again = pool.intern(xs.clone());
        prop_assert!(Arc::ptr_eq(&a, &again));
        prop_assert_eq!(a.id() == b.id(), xs == ys);
        prop_assert_eq!(Arc::ptr_eq(&a, &b), xs == ys);
    }

    #[test]
    fn suffix_round_trip(stem in "[a-z]{1,8}", strip_len in 0usize..3, append in "[a-z]{0,4}") {
        let strip_len = strip_len.min(stem.len());
        let strip: String = stem[stem.len() - strip_len..].to_string();
        let mut b = Rules::builder();
        b.add_affix('S', Direction::Suffix, false).unwrap();
        let id = b.add_entry('S', EntrySpec::new(&strip, &append, vec![])).unwrap();
        let rules = b.build();
        let e = rules.entry(id);

        let s = chars(&stem);
        prop_assert!(e.check_for_inflexion(&s));
        prop_assert_eq!(e.reverse(&e.inflex(&s)), s.clone());
        prop_assert_eq!(e.add_strip(&e.strip(&s)), s);
    }

    #[test]
    fn prefix_round_trip(stem in "[a-z]{1,8}", strip_len in 0usize..3, append in "[a-z]{0,4}") {
        let strip_len = strip_len.min(stem.len());
        let strip: String = stem[..strip_len].to_string();
        let mut b = Rules::builder();
        b.add_affix('P', Direction::Prefix, false).unwrap();
        let id = b.add_entry('P', EntrySpec::new(&strip, &append, vec![])).unwrap();
        let rules = b.build();
        let e = rules.entry(id);

        let s = chars(&stem);
        prop_assert!(e.check_for_inflexion(&s));
        prop_assert_eq!(e.reverse(&e.inflex(&s)), s.clone());
        prop_assert_eq!(e.add_strip(&e.strip(&s)), s);
    }
}

#[test]
fn conditioned_round_trip() {
    let mut b = Rules::builder();
    b.add_affix('S', Direction::Suffix, false).unwrap();
    let id = b
        .add_entry('S', EntrySpec::new("y", "ies", parse_conditions("[^aeiou]y").unwrap()))
        .unwrap();
    let rules = b.build();
    let e = rules.entry(id);
    for stem in ["fly", "spy", "baby"] {
        let s = chars(stem);
        assert!(e.check_for_inflexion(&s), "{stem}");
        assert_eq!(e.reverse(&e.inflex(&s)), s);
    }
    assert!(!e.check_for_inflexion(&chars("boy")));
}
