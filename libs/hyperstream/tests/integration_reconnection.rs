//! Integration tests for reconnection strategies
//!
//! These tests verify the retry budget and delays of each strategy.

use hyperstream::traits::reconnect::{FixedDelay, NeverReconnect, ReconnectionStrategy};
use std::time::Duration;

/// Macro for verbose test output
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[test]
fn test_default_fixed_delay_budget() {
    verbose_println!("Testing default fixed delay budget...");

    let strategy = FixedDelay::default();

    for failures in 1..10 {
        let delay = strategy.next_delay(failures).unwrap();
        verbose_println!("  Failure {}: {:?}", failures, delay);
        assert_eq!(delay, Duration::from_millis(3000));
    }

    // The 10th consecutive failure exhausts the episode
    assert!(
        strategy.next_delay(10).is_none(),
        "Should return None once the budget is spent"
    );
    assert_eq!(strategy.max_failures(), Some(10));
}

#[test]
fn test_fixed_delay_consistency() {
    verbose_println!("Testing fixed delay consistency...");

    let strategy = FixedDelay::new(Duration::from_millis(750), None);

    for failures in 0..100 {
        let delay = strategy.next_delay(failures).unwrap();
        assert_eq!(
            delay,
            Duration::from_millis(750),
            "Fixed delay should be constant"
        );
    }

    verbose_println!("  All 100 attempts returned 750ms");
}

#[test]
fn test_fixed_delay_with_max_failures() {
    verbose_println!("Testing fixed delay with max failures...");

    let strategy = FixedDelay::new(Duration::from_millis(500), Some(3));

    assert!(strategy.next_delay(1).is_some());
    assert!(strategy.next_delay(2).is_some());
    assert!(strategy.next_delay(3).is_none());
    assert!(!strategy.should_reconnect(4));

    verbose_println!("  Max failures limit working correctly");
}

#[test]
fn test_never_reconnect_always_fails() {
    verbose_println!("Testing NeverReconnect strategy...");

    let strategy = NeverReconnect;

    for failures in 0..10 {
        assert!(
            strategy.next_delay(failures).is_none(),
            "NeverReconnect should always return None"
        );
        assert!(
            !strategy.should_reconnect(failures),
            "NeverReconnect should never allow reconnection"
        );
    }

    verbose_println!("  NeverReconnect correctly prevents all reconnections");
}
