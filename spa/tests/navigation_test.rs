//! Navigation dispatch tests against a recording host.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use http::StatusCode;
use pagecraft_core::page::{PageInput, PageOutcome};
use pagecraft_core::registry::{RouteDefinition, RoutesRegistry};
use pagecraft_core::result::{PageResult, ResultKind};
use pagecraft_core::seo::SeoConfig;
use pagecraft_spa::{CachePolicy, NavigationOutcome, SpaDispatcher, SpaOptions};
use pagecraft_testing::mocks::{HostEffect, RecordingHost};
use serde_json::json;

async fn home(_input: PageInput<()>) -> PageOutcome {
    Ok(PageResult::ok(json!({ "message": "Hi" })))
}

async fn profile(input: PageInput<()>) -> PageOutcome {
    Ok(PageResult::ok(json!({ "id": input.params.get("id") })))
}

async fn guarded(_input: PageInput<()>) -> PageOutcome {
    Ok(PageResult::redirect("/login"))
}

async fn ghost(_input: PageInput<()>) -> PageOutcome {
    Ok(PageResult::not_found().with_fallback(json!({ "hint": "gone" })))
}

async fn failing(_input: PageInput<()>) -> PageOutcome {
    Err(anyhow::anyhow!("fetch failed"))
}

fn registry() -> Arc<RoutesRegistry<()>> {
    Arc::new(
        RoutesRegistry::builder()
            .route_def(
                "home",
                RouteDefinition::new("/", home)
                    .unwrap()
                    .with_seo(SeoConfig::new().title("Home")),
            )
            .unwrap()
            .route("profile", "/profile/:id", profile)
            .unwrap()
            .route("dashboard", "/dashboard", guarded)
            .unwrap()
            .route("ghost", "/ghost", ghost)
            .unwrap()
            .route("broken", "/broken", failing)
            .unwrap()
            .build(),
    )
}

fn dispatcher(host: Arc<RecordingHost>) -> SpaDispatcher<()> {
    SpaDispatcher::new(registry(), host)
}

#[tokio::test]
async fn ok_navigation_publishes_state_and_patches_metadata() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host));

    let outcome = dispatcher.navigate("/").await;
    assert_eq!(outcome, NavigationOutcome::Rendered);

    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.route_name, "home");
    assert_eq!(state.result, ResultKind::Ok);
    assert!(state.context.is_some());

    // Metadata is patched in place; no navigation of any kind.
    assert_eq!(host.effects(), vec![HostEffect::Metadata("Home".to_string())]);
}

#[tokio::test]
async fn params_and_query_reach_the_page_function() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(host);

    let outcome = dispatcher.navigate("/profile/42?tab=posts").await;
    assert_eq!(outcome, NavigationOutcome::Rendered);

    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.params.get("id"), Some("42"));
    assert_eq!(
        state.context.unwrap().value()["id"],
        json!("42")
    );
}

#[tokio::test]
async fn redirect_replaces_history_and_never_pushes() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host));

    let outcome = dispatcher.navigate("/dashboard").await;
    assert_eq!(outcome, NavigationOutcome::Redirected("/login".to_string()));

    assert_eq!(host.effects(), vec![HostEffect::Replace("/login".to_string())]);
    // The redirect itself publishes no view state.
    assert!(dispatcher.view_state().borrow().is_none());
}

#[tokio::test]
async fn unmatched_path_clears_state_and_defers_to_the_host_router() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host));

    dispatcher.navigate("/").await;
    assert!(dispatcher.view_state().borrow().is_some());

    let outcome = dispatcher.navigate("/totally/unknown").await;
    assert_eq!(outcome, NavigationOutcome::NoMatch);
    assert!(dispatcher.view_state().borrow().is_none());
    // One metadata patch from the first navigation, nothing else.
    assert_eq!(host.effects(), vec![HostEffect::Metadata("Home".to_string())]);
}

#[tokio::test]
async fn not_found_renders_in_place_by_default() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host));

    let outcome = dispatcher.navigate("/ghost").await;
    assert_eq!(outcome, NavigationOutcome::NotFoundInPlace);

    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.result, ResultKind::NotFound);
    assert_eq!(state.context.unwrap().value()["hint"], json!("gone"));
    assert!(host.effects().is_empty());
}

#[tokio::test]
async fn not_found_routes_to_the_configured_path() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host)).with_options(SpaOptions {
        not_found_path: Some("/404".to_string()),
        ..SpaOptions::default()
    });

    let outcome = dispatcher.navigate("/ghost").await;
    assert_eq!(outcome, NavigationOutcome::NotFoundRouted("/404".to_string()));
    assert_eq!(host.effects(), vec![HostEffect::Replace("/404".to_string())]);
}

#[tokio::test]
async fn page_failure_publishes_an_error_state() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host));

    let outcome = dispatcher.navigate("/broken").await;
    assert_eq!(
        outcome,
        NavigationOutcome::Errored(StatusCode::INTERNAL_SERVER_ERROR)
    );

    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.result, ResultKind::Error);
    assert!(state.context.is_none());
    assert!(host.effects().is_empty());
}

#[tokio::test]
async fn error_path_navigates_when_configured() {
    let host = Arc::new(RecordingHost::new());
    let dispatcher = dispatcher(Arc::clone(&host)).with_options(SpaOptions {
        error_path: Some("/error".to_string()),
        ..SpaOptions::default()
    });

    dispatcher.navigate("/broken").await;
    assert_eq!(host.effects(), vec![HostEffect::Replace("/error".to_string())]);
}

#[tokio::test]
async fn extended_results_halt_with_their_status() {
    async fn admin(_input: PageInput<()>) -> PageOutcome {
        Ok(PageResult::forbidden().with_fallback(json!({ "reason": "members only" })))
    }
    let registry = Arc::new(
        RoutesRegistry::builder()
            .route("admin", "/admin", admin)
            .unwrap()
            .build(),
    );
    let host = Arc::new(RecordingHost::new());
    let dispatcher = SpaDispatcher::new(registry, Arc::clone(&host) as _);

    let outcome = dispatcher.navigate("/admin").await;
    assert_eq!(outcome, NavigationOutcome::Halted(StatusCode::FORBIDDEN));

    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.result, ResultKind::Forbidden);
    assert_eq!(state.context.unwrap().value()["reason"], json!("members only"));
}

#[tokio::test]
async fn stale_resolution_never_mutates_state() {
    let slow = |_input: PageInput<()>| async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        PageOutcome::Ok(PageResult::ok(json!({ "page": "slow" })))
    };
    let fast = |_input: PageInput<()>| async move {
        PageOutcome::Ok(PageResult::ok(json!({ "page": "fast" })))
    };
    let registry = Arc::new(
        RoutesRegistry::builder()
            .route("slow", "/slow", slow)
            .unwrap()
            .route("fast", "/fast", fast)
            .unwrap()
            .build(),
    );
    let host = Arc::new(RecordingHost::new());
    let dispatcher = Arc::new(SpaDispatcher::new(registry, host));

    let first = {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move { dispatcher.navigate("/slow").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = dispatcher.navigate("/fast").await;
    assert_eq!(second, NavigationOutcome::Rendered);

    assert_eq!(first.await.unwrap(), NavigationOutcome::Superseded);
    // The stale slow resolution must not have overwritten the fast one.
    let state = dispatcher.view_state().borrow().clone().unwrap();
    assert_eq!(state.route_name, "fast");
    assert_eq!(state.context.unwrap().value()["page"], json!("fast"));
}

#[tokio::test]
async fn cache_reuses_ok_results_across_navigations() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let counted = move |_input: PageInput<()>| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            PageOutcome::Ok(PageResult::ok(json!({})))
        }
    };
    let registry = Arc::new(
        RoutesRegistry::builder()
            .route("counted", "/counted", counted)
            .unwrap()
            .build(),
    );
    let host = Arc::new(RecordingHost::new());
    let dispatcher = SpaDispatcher::new(registry, host).with_options(SpaOptions {
        cache: Some(CachePolicy::default()),
        ..SpaOptions::default()
    });

    for _ in 0..3 {
        assert_eq!(
            dispatcher.navigate("/counted").await,
            NavigationOutcome::Rendered
        );
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
