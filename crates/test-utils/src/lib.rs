//! Shared test utilities for the SOS/WCS bindings workspace.
//!
//! This crate provides:
//! - Fixture documents under `testdata/` and helpers to load them
//! - Query strings and identifiers for common requests
//! - Assertion macros for aggregated validation failures
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! ```ignore
//! use test_utils::{fixtures::kvp, read_test_file};
//! ```

pub mod fixtures;
pub mod paths;

pub use fixtures::*;
pub use paths::*;

/// Assert that a read failed validation with exactly these locators, in
/// report order.
///
/// Works with any `Result<_, E>` where `E` has `as_validation()` returning
/// an `Option` of something with `locators()`.
///
/// ```ignore
/// assert_locators!(codec.read_kvp(&params), ["version", "offering"]);
/// ```
#[macro_export]
macro_rules! assert_locators {
    ($result:expr, [$($locator:expr),* $(,)?]) => {{
        match $result {
            Ok(_) => panic!("expected a validation failure, the read succeeded"),
            Err(err) => match err.as_validation() {
                Some(failure) => {
                    let expected: Vec<&str> = vec![$($locator),*];
                    assert_eq!(failure.locators(), expected, "locators of {:?}", failure);
                }
                None => panic!("expected a validation failure, got {:?}", err),
            },
        }
    }};
}

/// Assert that a serialized document contains every fragment.
///
/// ```ignore
/// assert_contains_all!(xml, "fes:During", "swes:extension");
/// ```
#[macro_export]
macro_rules! assert_contains_all {
    ($haystack:expr, $($needle:expr),+ $(,)?) => {{
        let haystack: &str = &$haystack;
        $(
            assert!(
                haystack.contains($needle),
                "expected {:?} in:\n{}",
                $needle,
                haystack
            );
        )+
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// assert_approx_eq!(envelope.min_x, 51.9, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(51.9000001, 51.9, 1e-6);
        assert_approx_eq!(-7.5, -7.5000001, 1e-6);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_contains_all() {
        let xml = String::from("<sos:GetObservation><fes:During/></sos:GetObservation>");
        assert_contains_all!(xml, "fes:During", "sos:GetObservation");
    }

    #[test]
    #[should_panic(expected = "expected")]
    fn test_assert_contains_all_fails() {
        assert_contains_all!("<a/>", "<b/>");
    }
}
