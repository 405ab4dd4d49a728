#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection in the lifecycle crate.
//!
//! ```bash
//! cargo test -p servergate-lifecycle --features failpoints --test failpoint_tests
//! ```

use std::sync::Arc;

use servergate_compute::{InstanceState, MemoryComputePlatform};
use servergate_config::DeploymentConfig;
use servergate_lifecycle::{Action, LifecycleController, LifecycleRequest};
use servergate_storage::testutil::store_with;

const INSTANCE: &str = "i-0fp";
const TOKEN: &str = "fp-admin-token";

fn controller() -> (LifecycleController, Arc<MemoryComputePlatform>) {
    let config = DeploymentConfig::builder()
        .instance_id(INSTANCE)
        .environment("dev")
        .build()
        .expect("valid config");
    let compute = Arc::new(MemoryComputePlatform::with_instance(INSTANCE, InstanceState::Running));
    let store = Arc::new(store_with(&[("/minecraft/dev/admin_token", TOKEN)]));
    (LifecycleController::new(compute.clone(), store, &config), compute)
}

#[tokio::test]
async fn admin_token_failpoint_forces_unauthorized() {
    let scenario = fail::FailScenario::setup();
    let (controller, compute) = controller();

    fail::cfg("admin-token-before-fetch", "return").expect("failed to configure fail point");

    let request = LifecycleRequest::new(Action::Stop).with_token(TOKEN);
    let response = controller.handle(&request).await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(compute.call_count(), 0);

    scenario.teardown();
}

#[tokio::test]
async fn admin_token_without_failpoint_stops() {
    let scenario = fail::FailScenario::setup();
    let (controller, compute) = controller();

    let request = LifecycleRequest::new(Action::Stop).with_token(TOKEN);
    let response = controller.handle(&request).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(compute.stop_count(), 1);

    scenario.teardown();
}
