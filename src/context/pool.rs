//! Context recycling.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use super::Context;

/// A bounded free list of request contexts.
///
/// Contexts are reset on check-in, so a checked-out context never carries
/// state from an earlier request.
#[derive(Debug)]
pub struct ContextPool {
    idle: Mutex<Vec<Context>>,
    max_idle: usize,
}

impl ContextPool {
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle,
        }
    }

    /// Check out a context, allocating one if the pool is empty.
    pub fn acquire(&self) -> PooledContext<'_> {
        let ctx = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();
        PooledContext { ctx, pool: self }
    }

    /// Number of contexts waiting for reuse.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_idle {
            idle.push(ctx);
        }
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// A context checked out of a [`ContextPool`], returned on drop.
#[derive(Debug)]
pub struct PooledContext<'a> {
    ctx: Context,
    pool: &'a ContextPool,
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.ctx));
    }
}
