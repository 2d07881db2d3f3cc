use super::Context;
use crate::http::request::{RemoteIp, X_FORWARDED_FOR, X_REAL_IP};

impl Context {
    /// Client IP address.
    ///
    /// Resolved from, in order: the address recorded by upstream middleware,
    /// the first `X-Forwarded-For` entry, then `X-Real-Ip`. Empty when none
    /// is present.
    pub fn remote_ip(&self) -> String {
        if let Some(RemoteIp(ip)) = self.request.extensions().get::<RemoteIp>() {
            if !ip.is_empty() {
                return ip.clone();
            }
        }
        let header = |name: &str| {
            self.request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        if let Some(forwarded) = header(X_FORWARDED_FOR) {
            let first = forwarded.split(',').next().unwrap_or_default().trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
        header(X_REAL_IP)
            .map(|ip| ip.trim().to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use bytes::Bytes;

    use super::*;

    fn context(headers: &[(&str, &str)], metadata: Option<&str>) -> Context {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut req = builder.body(Bytes::new()).unwrap();
        if let Some(ip) = metadata {
            req.extensions_mut().insert(RemoteIp(ip.to_string()));
        }
        Context::new(req)
    }

    #[test]
    fn test_metadata_wins() {
        let ctx = context(&[("X-Forwarded-For", "1.1.1.1")], Some("9.9.9.9"));
        assert_eq!(ctx.remote_ip(), "9.9.9.9");
    }

    #[test]
    fn test_first_forwarded_entry() {
        let ctx = context(
            &[("X-Forwarded-For", " 10.0.0.1 , 10.0.0.2"), ("X-Real-Ip", "8.8.8.8")],
            Some(""),
        );
        assert_eq!(ctx.remote_ip(), "10.0.0.1");
    }

    #[test]
    fn test_real_ip_fallback() {
        let ctx = context(&[("X-Real-Ip", " 8.8.8.8 ")], None);
        assert_eq!(ctx.remote_ip(), "8.8.8.8");
    }

    #[test]
    fn test_empty_when_unknown() {
        assert_eq!(context(&[], None).remote_ip(), "");
    }
}
