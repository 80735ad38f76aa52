//! Rate limit middleware.

use std::{sync::Arc, time::Instant};

use salvo::{http::header::RETRY_AFTER, prelude::*};
use tracing::{error, warn};

use crate::{
    extensions::*,
    observability::record_rate_limited,
    rate_limit::RateDecision,
    state::State,
};

const REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Ok(state) = depot.obtain::<Arc<State>>() else {
        error!("rate limiter could not obtain state");
        res.render(StatusError::internal_server_error());

        return;
    };

    let limiter = &state.rate_limiter;

    let Some(client) = req.client_ip(limiter.trusts_forwarded_for()) else {
        // Unix sockets and the like have no address to key on.
        ctrl.call_next(req, depot, res).await;
        return;
    };

    match limiter.check(&client, Instant::now()) {
        RateDecision::Allowed { remaining } => {
            if let Err(source) = res.add_header(REMAINING_HEADER, remaining, true) {
                warn!("failed to set rate limit header: {source}");
            }

            ctrl.call_next(req, depot, res).await;
        }
        RateDecision::Limited { retry_after } => {
            let path = req.uri().path().to_owned();
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

            warn!(client = %client, path = %path, retry_after = seconds, "rate limited");
            record_rate_limited(&path);

            if let Err(source) = res.add_header(RETRY_AFTER, seconds, true) {
                warn!("failed to set retry-after header: {source}");
            }

            res.render(StatusError::too_many_requests().brief("Too many requests, slow down"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::{affix_state::inject, test::TestClient};
    use testresult::TestResult;

    use crate::{
        rate_limit::{RateLimitSettings, RateLimiter},
        test_helpers::StateBuilder,
    };

    use super::*;

    #[salvo::handler]
    async fn ok(res: &mut Response) {
        res.render("ok");
    }

    fn make_service(max_requests: u32) -> Service {
        let state = StateBuilder::new()
            .rate_limiter(RateLimiter::new(RateLimitSettings {
                max_requests,
                window: Duration::from_secs(60),
                capacity: 16,
                trust_forwarded_for: true,
            }))
            .build();

        Service::new(
            Router::new()
                .hoop(inject(state))
                .push(Router::with_path("contact").hoop(handler).post(ok)),
        )
    }

    #[tokio::test]
    async fn test_requests_over_the_limit_get_429_with_retry_after() -> TestResult {
        let service = make_service(1);

        let first = TestClient::post("http://example.com/contact")
            .add_header("x-forwarded-for", "203.0.113.7", true)
            .send(&service)
            .await;

        assert_eq!(first.status_code, Some(StatusCode::OK));

        let second = TestClient::post("http://example.com/contact")
            .add_header("x-forwarded-for", "203.0.113.7", true)
            .send(&service)
            .await;

        let retry_after = second
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        assert_eq!(second.status_code, Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(
            retry_after.is_some_and(|seconds| (1..=60).contains(&seconds)),
            "expected retry-after within the window, got {retry_after:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_other_clients_are_unaffected() -> TestResult {
        let service = make_service(1);

        for client in ["203.0.113.7", "203.0.113.8"] {
            let res = TestClient::post("http://example.com/contact")
                .add_header("x-forwarded-for", client, true)
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::OK), "client {client}");
        }

        Ok(())
    }
}
