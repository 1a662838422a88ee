//! Tracing support for the mutation operations.
//!
//! With the `tracing` feature every mutating operation opens a trace span and
//! a timing layer can total up the time spent per operation.  Without it the
//! span macro expands to a no-op and the timing functions do nothing.

#[cfg(feature = "tracing")]
mod enabled {
    use std::{
        cell::RefCell,
        collections::{BTreeMap, HashMap},
        sync::Once,
        time::{Duration, Instant},
    };

    use tracing_subscriber::{
        Layer, Registry, layer::Context, layer::SubscriberExt, registry::LookupSpan,
        util::SubscriberInitExt,
    };

    /// Environment variable that turns on formatted span output in `init_tracing`.
    pub const TRACE_ENV_VAR: &str = "PARTIGRAPH_TRACE";

    thread_local! {
        #[allow(clippy::type_complexity)]
        static TIMING_SCOPES: RefCell<HashMap<TimingScope, BTreeMap<&'static str, (Duration, usize)>>> =
            RefCell::new(HashMap::new());
        static TIMING_SCOPE: RefCell<TimingScope> = const { RefCell::new(TimingScope::Test) };
    }

    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum TimingScope {
        Test,
        Consistency,
    }

    pub struct TimingScopeGuard {
        previous: TimingScope,
    }

    impl Drop for TimingScopeGuard {
        fn drop(&mut self) {
            TIMING_SCOPE.with(|scope| {
                *scope.borrow_mut() = self.previous;
            });
        }
    }

    /// Attributes spans closed on this thread to `scope` until the guard drops.
    pub fn set_timing_scope(scope: TimingScope) -> TimingScopeGuard {
        let previous = TIMING_SCOPE.with(|current| current.replace(scope));
        TimingScopeGuard { previous }
    }

    struct TimingLayer;

    impl<S> Layer<S> for TimingLayer
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            _attrs: &tracing::span::Attributes<'_>,
            id: &tracing::Id,
            ctx: Context<'_, S>,
        ) {
            if let Some(span) = ctx.span(id) {
                span.extensions_mut().insert(Instant::now());
            }
        }

        fn on_close(&self, id: tracing::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let name = span.metadata().name();
            if let Some(start) = span.extensions().get::<Instant>() {
                let elapsed = start.elapsed();
                let scope = TIMING_SCOPE.with(|scope| *scope.borrow());
                TIMING_SCOPES.with(|totals| {
                    let mut totals = totals.borrow_mut();
                    let entry = totals
                        .entry(scope)
                        .or_default()
                        .entry(name)
                        .or_insert((Duration::ZERO, 0));
                    entry.0 += elapsed;
                    entry.1 += 1;
                });
            }
        }
    }

    /// Installs the timing layer as the global subscriber.  If
    /// [`TRACE_ENV_VAR`] is set, spans are also printed through the test writer.
    pub fn init_tracing() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let registry = Registry::default().with(TimingLayer);
            let _ = if std::env::var_os(TRACE_ENV_VAR).is_some() {
                let fmt = tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE);
                registry.with(fmt).try_init()
            } else {
                registry.try_init()
            };
        });
    }

    /// Total time and call count per operation recorded in `scope` on this thread.
    pub fn operation_timings(scope: TimingScope) -> BTreeMap<&'static str, (Duration, usize)> {
        TIMING_SCOPES.with(|totals| totals.borrow().get(&scope).cloned().unwrap_or_default())
    }

    #[doc(hidden)]
    pub fn reset_operation_timings() {
        init_tracing();
        TIMING_SCOPES.with(|totals| totals.borrow_mut().clear());
    }

    #[doc(hidden)]
    pub fn dump_operation_timings() {
        for scope in [TimingScope::Test, TimingScope::Consistency] {
            let mut entries: Vec<_> = operation_timings(scope).into_iter().collect();
            entries.sort_by(|a, b| b.1.0.cmp(&a.1.0));
            eprintln!("{scope:?} timings (desc):");
            for (name, (duration, count)) in entries {
                eprintln!("  {name}: {duration:?} ({count}x)");
            }
        }
    }

    pub(crate) use tracing::trace_span;
}

#[cfg(not(feature = "tracing"))]
mod disabled {
    use std::{collections::BTreeMap, time::Duration};

    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum TimingScope {
        Test,
        Consistency,
    }

    pub struct TimingScopeGuard;

    pub fn set_timing_scope(_scope: TimingScope) -> TimingScopeGuard {
        TimingScopeGuard
    }

    pub fn init_tracing() {}

    pub fn operation_timings(_scope: TimingScope) -> BTreeMap<&'static str, (Duration, usize)> {
        BTreeMap::new()
    }

    #[doc(hidden)]
    pub fn reset_operation_timings() {}

    #[doc(hidden)]
    pub fn dump_operation_timings() {}

    macro_rules! trace_span {
        ($($args:tt)*) => {
            $crate::tracing_support::NoOpSpan
        };
    }

    pub(crate) use trace_span;

    pub struct NoOpSpan;

    impl NoOpSpan {
        pub fn entered(self) -> NoOpSpanGuard {
            NoOpSpanGuard
        }
    }

    pub struct NoOpSpanGuard;
}

#[cfg(feature = "tracing")]
pub use enabled::*;

#[cfg(not(feature = "tracing"))]
pub use disabled::*;
