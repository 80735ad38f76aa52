//! Request helper extensions.

use salvo::prelude::Request;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub(crate) trait RequestExt {
    /// The caller's IP address.
    ///
    /// With `trust_forwarded_for` the first `X-Forwarded-For` entry wins, which
    /// is only safe behind a proxy that overwrites the header.
    fn client_ip(&self, trust_forwarded_for: bool) -> Option<String>;
}

impl RequestExt for Request {
    fn client_ip(&self, trust_forwarded_for: bool) -> Option<String> {
        if trust_forwarded_for
            && let Some(forwarded) = self.header::<String>(FORWARDED_FOR_HEADER)
            && let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty())
        {
            return Some(first.to_string());
        }

        self.remote_addr()
            .clone()
            .into_std()
            .map(|addr| addr.ip().to_string())
    }
}
