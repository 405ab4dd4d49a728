//! Integration test verifying that `#[instrument]` annotations on the
//! in-memory parameter store produce spans without recording secret values.

#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use servergate_storage::{MemoryParameterStore, ParameterStore};
use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan};

#[derive(Clone, Default)]
struct SpanCollector {
    spans: Arc<Mutex<Vec<String>>>,
}

impl<S> tracing_subscriber::Layer<S> for SpanCollector
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        if let Some(span) = ctx.span(id) {
            let mut rendered = span.name().to_owned();
            rendered.push_str(&format!(" {:?}", attrs.values()));
            self.spans.lock().expect("lock poisoned").push(rendered);
        }
    }
}

#[tokio::test]
async fn get_parameter_creates_span() {
    let collector = SpanCollector::default();
    let spans = Arc::clone(&collector.spans);

    let subscriber = tracing_subscriber::registry().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = MemoryParameterStore::new();
    store.put_parameter("/app/dev/admin_token", "never-log-this-value");
    let _ = store.get_parameter("/app/dev/admin_token", true).await;

    let recorded = spans.lock().expect("lock poisoned");
    assert!(
        recorded.iter().any(|s| s.starts_with("get_parameter")),
        "expected a 'get_parameter' span, got: {recorded:?}"
    );
    assert!(
        recorded.iter().all(|s| !s.contains("never-log-this-value")),
        "span fields must not carry parameter values: {recorded:?}"
    );
}
