#![forbid(unsafe_code)]

//! Tracing contract for navigation.
//!
//! Verify that every transition opens its span with the step index and the
//! resolved pace, that skips and failures are logged under the timeline
//! target, and that boundary no-ops open no span at all.
//!
//! Run:
//!   cargo test -p director-runtime --test tracing_navigation_spans

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use director_core::{Attrs, Op, Script, Step};
use director_harness::{MemoryStage, fixtures};
use director_runtime::{Director, ManualClock};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    parent_span_name: Option<String>,
}

#[derive(Default, Clone)]
struct Capture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    span_index: Arc<Mutex<HashMap<u64, usize>>>,
}

impl Capture {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn spans_named(&self, name: &str) -> Vec<CapturedSpan> {
        self.spans().into_iter().filter(|s| s.name == name).collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        for field in attrs.metadata().fields() {
            fields.entry(field.name().to_string()).or_default();
        }

        let mut spans = self.spans.lock().unwrap();
        self.span_index
            .lock()
            .unwrap()
            .insert(id.into_u64(), spans.len());
        spans.push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields,
        });
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        values.record(&mut visitor);
        let index = self.span_index.lock().unwrap();
        if let Some(&idx) = index.get(&id.into_u64()) {
            if let Some(span) = self.spans.lock().unwrap().get_mut(idx) {
                span.fields.extend(visitor.0);
            }
        }
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let message = visitor
            .0
            .iter()
            .find(|(k, _)| k == "message")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            parent_span_name,
        });
    }
}

fn with_capture(f: impl FnOnce()) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn forward_span_records_step_and_pace() {
    let capture = with_capture(|| {
        let clock = ManualClock::new();
        let mut d = Director::new(MemoryStage::new(), fixtures::lesson()).with_clock(clock.clone());
        d.forward(false).unwrap();
        clock.advance_ms(50);
        d.forward(true).unwrap();
    });

    let spans = capture.spans_named("director.forward");
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].fields["step"], "0");
    assert_eq!(spans[0].fields["pace"], "Animated");
    assert_eq!(spans[1].fields["step"], "1");
    assert_eq!(spans[1].fields["pace"], "Skipping");

    let events = capture.events();
    let hurry = events
        .iter()
        .find(|e| e.message.contains("skipping"))
        .expect("skip should be logged");
    assert_eq!(hurry.target, "director.timeline");
    assert_eq!(hurry.parent_span_name.as_deref(), Some("director.forward"));
}

#[test]
fn back_and_go_open_their_spans() {
    let capture = with_capture(|| {
        let mut d = Director::new(MemoryStage::new(), fixtures::lesson())
            .with_clock(ManualClock::new());
        d.go(3, true).unwrap();
        d.back(true).unwrap();
    });

    assert_eq!(capture.spans_named("director.go").len(), 1);
    assert_eq!(capture.spans_named("director.forward").len(), 3);
    let back = capture.spans_named("director.back");
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].fields["step"], "2");
}

#[test]
fn boundary_no_ops_open_no_span() {
    let capture = with_capture(|| {
        let mut d = Director::new(MemoryStage::new(), fixtures::single_circle())
            .with_clock(ManualClock::new());
        d.back(false).unwrap();
    });
    assert!(capture.spans_named("director.back").is_empty());
    assert!(
        capture
            .events()
            .iter()
            .any(|e| e.level == tracing::Level::TRACE && e.message == "back at start")
    );
}

#[test]
fn failed_forward_warns() {
    let capture = with_capture(|| {
        let script = Script::from(vec![Step::from(vec![
            Op::add("circle", Attrs::new()),
            Op::add("bomb", Attrs::new()),
        ])]);
        let mut d = Director::new(MemoryStage::new().rejecting("bomb"), script)
            .with_clock(ManualClock::new());
        assert!(d.forward(false).is_err());
    });

    let warnings: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].target, "director.timeline");
    assert!(warnings[0].message.contains("reverting partial step"));
}
