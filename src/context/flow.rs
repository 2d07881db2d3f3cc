//! Handler chain dispatch.

use std::sync::Arc;

use super::Context;

/// A link in the handler chain.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Wrap a closure as a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether pending handlers may still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    #[default]
    Continue,
    Aborted,
}

impl Context {
    /// Run the pending handlers.
    ///
    /// Called by the engine to start the chain, and by middleware to run
    /// the rest of the chain before doing its own post-processing. The outer
    /// loop resumes after the nested call returns, so no handler runs twice.
    pub fn next(&mut self) {
        let mut index = self.index.map_or(0, |i| i + 1);
        self.index = Some(index);
        while self.dispatch == Dispatch::Continue && index < self.handlers.len() {
            let handler = Arc::clone(&self.handlers[index]);
            handler(self);
            index = self.index.map_or(0, |i| i + 1);
            self.index = Some(index);
        }
    }

    /// Prevent pending handlers from running.
    ///
    /// The calling handler keeps running to its end.
    pub fn abort(&mut self) {
        self.dispatch = Dispatch::Aborted;
    }

    /// Write `code` as the response status, then abort.
    pub fn abort_with_status(&mut self, code: u16) {
        self.status(code);
        self.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.dispatch == Dispatch::Aborted
    }

    /// Position of the running handler; `None` before dispatch starts.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::http::{Request, StatusCode};
    use bytes::Bytes;

    type Log = Arc<Mutex<Vec<String>>>;

    fn context() -> Context {
        Context::new(Request::new(Bytes::new()))
    }

    fn record(log: &Log, name: &'static str) -> HandlerFunc {
        let log = log.clone();
        handler(move |_| log.lock().unwrap().push(name.to_string()))
    }

    #[test]
    fn test_runs_in_order() {
        let log = Log::default();
        let mut ctx = context();
        ctx.set_handlers(vec![record(&log, "a"), record(&log, "b"), record(&log, "c")]);
        ctx.next();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(ctx.index(), Some(3));
    }

    #[test]
    fn test_abort_skips_pending() {
        let log = Log::default();
        let mut ctx = context();
        let aborting = {
            let log = log.clone();
            handler(move |ctx: &mut Context| {
                ctx.abort();
                log.lock().unwrap().push("b".to_string());
            })
        };
        ctx.set_handlers(vec![record(&log, "a"), aborting, record(&log, "c"), record(&log, "d")]);
        ctx.next();

        // the aborting handler itself finishes
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
        assert!(ctx.is_aborted());
    }

    #[test]
    fn test_abort_then_next_runs_nothing() {
        let log = Log::default();
        let mut ctx = context();
        ctx.set_handlers(vec![record(&log, "a"), record(&log, "b")]);
        ctx.abort();
        ctx.next();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_nested_next_wraps_rest_of_chain() {
        let log = Log::default();
        let mut ctx = context();
        let around = {
            let log = log.clone();
            handler(move |ctx: &mut Context| {
                log.lock().unwrap().push("before".to_string());
                ctx.next();
                log.lock().unwrap().push("after".to_string());
            })
        };
        ctx.set_handlers(vec![around, record(&log, "handler"), record(&log, "tail")]);
        ctx.next();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before", "handler", "tail", "after"]
        );
    }

    #[test]
    fn test_abort_inside_nested_chain() {
        let log = Log::default();
        let mut ctx = context();
        let around = {
            let log = log.clone();
            handler(move |ctx: &mut Context| {
                ctx.next();
                log.lock().unwrap().push(format!("after aborted={}", ctx.is_aborted()));
            })
        };
        let guard = handler(|ctx: &mut Context| ctx.abort_with_status(401));
        ctx.set_handlers(vec![around, guard, record(&log, "never")]);
        ctx.next();
        assert_eq!(*log.lock().unwrap(), vec!["after aborted=true"]);
        assert_eq!(ctx.writer().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_empty_chain() {
        let mut ctx = context();
        ctx.next();
        assert_eq!(ctx.index(), Some(0));
        assert!(!ctx.is_aborted());
    }
}
