//! Crate-level tests exercising the sandbox against real directories.

mod support;

use crate::sandbox::Sandbox;

#[test]
fn sandbox_is_shareable_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Sandbox>();
}
