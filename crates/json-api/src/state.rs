//! State

use std::{fmt, sync::Arc};

use krua_app::{auth::AccessPolicy, context::AppContext};

use crate::rate_limit::RateLimiter;

pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) access_policy: AccessPolicy,
    pub(crate) rate_limiter: RateLimiter,

    /// Shared secret for the payment webhook. `None` rejects every call.
    pub(crate) payment_gateway_key: Option<String>,
}

impl State {
    #[must_use]
    pub(crate) fn new(
        app: AppContext,
        access_policy: AccessPolicy,
        rate_limiter: RateLimiter,
        payment_gateway_key: Option<String>,
    ) -> Self {
        Self {
            app,
            access_policy,
            rate_limiter,
            payment_gateway_key,
        }
    }

    #[must_use]
    pub(crate) fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("app", &self.app)
            .field("access_policy", &self.access_policy)
            .field("rate_limiter", &self.rate_limiter)
            .field(
                "payment_gateway_key",
                &self.payment_gateway_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
