use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;

use crate::api::server::RouteError;
use crate::util::identity::{Identity, fetch_identity};

/// The authenticated subject, stashed as a request extension once the
/// bearer token has been resolved.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

pub async fn resolve_caller(mut req: Request, next: Next) -> Result<Response, RouteError> {
    let token = bearer_token(&req).ok_or(RouteError::Unauthorized)?;

    let identity = match fetch_identity(token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(error = ?e, "bearer token resolution failed");
            return Err(RouteError::Unauthorized);
        }
    };

    req.extensions_mut().insert(Caller(identity));
    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod test {
    use axum::body::Body;

    use super::*;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/points/compute");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        assert_eq!(
            bearer_token(&request_with_auth(Some("Bearer abc123"))),
            Some("abc123")
        );
        assert_eq!(bearer_token(&request_with_auth(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&request_with_auth(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with_auth(None)), None);
    }
}
