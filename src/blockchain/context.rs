// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller-supplied cancellation and deadline for remote calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::TerminusError;

/// Cancellation token plus optional deadline threaded through every remote
/// operation.
///
/// A context that is already cancelled or past its deadline never starts
/// the remote call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never expires on its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie the context to an existing token, e.g. a shutdown token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Child context: cancelled with this one, and separately cancellable.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once cancelled or past the deadline.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Run `call` unless the context is already done, racing it against
    /// cancellation and the deadline.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        operation: &'static str,
        call: F,
    ) -> Result<T, TerminusError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TerminusError>>,
    {
        if self.is_done() {
            return Err(TerminusError::Cancelled { operation });
        }

        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(TerminusError::Cancelled { operation }),
            _ = expiry => Err(TerminusError::Cancelled { operation }),
            result = call() => result,
        }
    }
}
