//! The ambient current-span slot.
//!
//! Span builders that are not given an explicit parent consult this slot,
//! so application code does not have to thread span handles through every
//! call. The slot is a per-thread stack: [`mark_span_as_active`] pushes a
//! span and returns a [`SpanScope`] guard that restores the previous value
//! when dropped, on all exit paths including panics.

use crate::trace::Span;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static CURRENT_SPAN: RefCell<Vec<Arc<dyn Span>>> = const { RefCell::new(Vec::new()) };
}

/// A guard that resets the current span to the prior value when dropped.
///
/// Guards are released in reverse order of acquisition on the thread that
/// created them; they are deliberately neither `Send` nor `Sync`.
#[derive(Debug)]
pub struct SpanScope {
    // Ties the guard to the thread whose slot it manipulates.
    _marker: PhantomData<*const ()>,
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        CURRENT_SPAN.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Mark the given span as the current span for this thread until the
/// returned guard is dropped.
pub fn mark_span_as_active(span: Arc<dyn Span>) -> SpanScope {
    CURRENT_SPAN.with(|stack| {
        stack.borrow_mut().push(span);
    });
    SpanScope {
        _marker: PhantomData,
    }
}

/// The current span for this thread, if one has been marked active.
pub fn current_span() -> Option<Arc<dyn Span>> {
    CURRENT_SPAN.with(|stack| stack.borrow().last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::noop::NoopSpan;
    use crate::trace::SpanContext;

    fn noop_span() -> Arc<dyn Span> {
        Arc::new(NoopSpan::new(SpanContext::empty_context()))
    }

    #[test]
    fn no_current_span_by_default() {
        assert!(current_span().is_none());
    }

    #[test]
    fn scope_restores_prior_span() {
        let outer = noop_span();
        let inner = noop_span();

        let _outer_guard = mark_span_as_active(outer.clone());
        assert!(Arc::ptr_eq(&current_span().unwrap(), &outer));
        {
            let _inner_guard = mark_span_as_active(inner.clone());
            assert!(Arc::ptr_eq(&current_span().unwrap(), &inner));
        }
        assert!(Arc::ptr_eq(&current_span().unwrap(), &outer));
    }

    #[test]
    fn scope_releases_on_panic() {
        let result = std::panic::catch_unwind(|| {
            let _guard = mark_span_as_active(noop_span());
            panic!("poof");
        });
        assert!(result.is_err());
        assert!(current_span().is_none());
    }
}
