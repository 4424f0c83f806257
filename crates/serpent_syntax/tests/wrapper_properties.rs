//! Property tests for bracket linking in the token arena.

use proptest::prelude::*;
use serpent_core::PythonVersion;
use serpent_syntax::wrapper::TokenizerWrapper;

/// Balanced bracket expressions over a single name.
fn nested_strategy() -> impl Strategy<Value = String> {
    Just("x".to_string()).prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("[{s}]")),
            inner.clone().prop_map(|s| format!("{{{s}}}")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}, {b}")),
        ]
    })
}

proptest! {
    #[test]
    fn balanced_brackets_link_both_ways(expr in nested_strategy()) {
        let source = format!("y = {expr}\n");
        let mut wrapper = TokenizerWrapper::new(&source, PythonVersion::LATEST);
        loop {
            match wrapper.next() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(error) => prop_assert!(false, "unexpected bracket error: {error}"),
            }
        }

        let arena = wrapper.arena();
        for (id, ext) in arena.iter() {
            if ext.is_open() {
                let close = ext.matching;
                prop_assert!(close.is_some(), "unmatched open in {source}");
                prop_assert_eq!(close.map(|c| arena.get(c).matching), Some(Some(id)));
            }
            if let Some(open) = ext.inside {
                prop_assert!(arena.get(open).is_open());
            }
        }
    }

    #[test]
    fn stray_close_is_always_reported(expr in nested_strategy()) {
        let source = format!("{expr})\n");
        let mut wrapper = TokenizerWrapper::new(&source, PythonVersion::LATEST);
        let mut reported = false;
        loop {
            match wrapper.next() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => reported = true,
            }
        }
        prop_assert!(reported);
    }
}
