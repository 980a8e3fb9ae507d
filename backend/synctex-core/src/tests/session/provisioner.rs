use crate::session::{EnvProvisioner, Provisioner, WindowId, provision_secret};

use std::env;

use serial_test::serial;

const TEST_VAR: &str = "SYNCTEX_BRIDGE_UNIT_TEST_SECRET";

/// **VALUE**: A missing environment variable reads as the empty secret.
///
/// **WHY THIS MATTERS**: The provisioner never fails. Missing means "reject
/// everything" downstream, never "no authentication".
#[test]
#[serial]
fn given_unset_variable_when_current_secret_then_empty() {
    // GIVEN: Variable not present
    // SAFETY: serialized with every other test touching the environment
    unsafe { env::remove_var(TEST_VAR) };

    let provisioner = EnvProvisioner::new(TEST_VAR, 7777, WindowId(0x1001));

    // THEN: Empty secret, port and window still reported
    assert!(provisioner.current_secret().is_empty());
    assert_eq!(provisioner.current_port(), 7777);
    assert_eq!(provisioner.caller_window_id(), WindowId(0x1001));
}

/// **VALUE**: Regenerating the secret is visible on the very next read.
///
/// **WHY THIS MATTERS**: The listener re-reads the secret per callback. A cached
/// copy would keep accepting bindings the editor meant to revoke.
///
/// **BUG THIS CATCHES**: Caching the secret in `EnvProvisioner::new`.
#[test]
#[serial]
fn given_regenerated_secret_when_current_secret_then_sees_new_value() {
    let provisioner = EnvProvisioner::new(TEST_VAR, 0, WindowId(1));

    // SAFETY: serialized with every other test touching the environment
    let first = unsafe { provision_secret(TEST_VAR) };
    assert!(provisioner.current_secret().matches(first.as_str()));

    // SAFETY: as above
    let second = unsafe { provision_secret(TEST_VAR) };

    let current = provisioner.current_secret();
    assert!(current.matches(second.as_str()));
    assert!(!current.matches(first.as_str()), "Old secret must be revoked");

    // SAFETY: as above
    unsafe { env::remove_var(TEST_VAR) };
}

#[test]
#[serial]
fn given_provisioned_secret_when_inspected_then_embeddable_and_non_empty() {
    // SAFETY: serialized with every other test touching the environment
    let secret = unsafe { provision_secret(TEST_VAR) };

    assert!(!secret.is_empty());
    assert!(secret.is_embeddable(), "Generated token must fit in one argument");

    // SAFETY: as above
    unsafe { env::remove_var(TEST_VAR) };
}
