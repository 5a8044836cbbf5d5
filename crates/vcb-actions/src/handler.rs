//! The handler invocation contract and closure adapters.
//!
//! Every action runs through [`ActionHandler`]. Plain functions are adapted
//! with [`FnHandler`] (executed on the blocking pool) and async closures with
//! [`AsyncFnHandler`]. Both adapters convert a panic into
//! [`HandlerError::Panicked`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use vcb_core::ActionParams;

use crate::errors::HandlerError;

/// Result returned by every handler.
pub type HandlerResult = Result<Value, HandlerError>;

/// Trait implemented by every executable action.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Run the action with fully merged parameters.
    async fn call(&self, params: ActionParams) -> HandlerResult;
}

/// Adapter for synchronous functions.
///
/// The function runs on tokio's blocking pool so a slow handler never
/// stalls the async workers.
pub struct FnHandler<F> {
    f: Arc<F>,
}

impl<F> FnHandler<F>
where
    F: Fn(ActionParams) -> HandlerResult + Send + Sync + 'static,
{
    /// Wrap a synchronous function.
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(ActionParams) -> HandlerResult + Send + Sync + 'static,
{
    async fn call(&self, params: ActionParams) -> HandlerResult {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || f(params)).await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                Err(HandlerError::Panicked(panic_message(&*join_err.into_panic())))
            }
            Err(join_err) => Err(HandlerError::msg(join_err.to_string())),
        }
    }
}

/// Adapter for async closures.
pub struct AsyncFnHandler<F> {
    f: F,
}

impl<F, Fut> AsyncFnHandler<F>
where
    F: Fn(ActionParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Wrap an async closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for AsyncFnHandler<F>
where
    F: Fn(ActionParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, params: ActionParams) -> HandlerResult {
        match AssertUnwindSafe(async { (self.f)(params).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(HandlerError::Panicked(panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
