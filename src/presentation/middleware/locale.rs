//! Locale Middleware
//!
//! Runs the rest of the request inside the locale negotiated from
//! `Accept-Language`, so error bodies, notifications and enum labels render
//! in the caller's language.

use axum::{extract::Request, http::header::ACCEPT_LANGUAGE, middleware::Next, response::Response};

use crate::shared::i18n::{self, Locale, REQUEST_LOCALE};

pub async fn locale_middleware(request: Request, next: Next) -> Response {
    let locale = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map_or(Locale::En, i18n::negotiate);

    REQUEST_LOCALE.scope(locale, next.run(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn current() -> &'static str {
        i18n::current_locale().as_str()
    }

    async fn locale_for(header: Option<&'static str>) -> String {
        let app = Router::new()
            .route("/", get(current))
            .layer(middleware::from_fn(locale_middleware));

        let mut request = Request::builder().uri("/");
        if let Some(value) = header {
            request = request.header(ACCEPT_LANGUAGE, value);
        }
        let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_locale_follows_accept_language() {
        assert_eq!(locale_for(Some("fr-FR,fr;q=0.9,en;q=0.8")).await, Locale::Fr.as_str());
        assert_eq!(locale_for(None).await, Locale::En.as_str());
    }
}
