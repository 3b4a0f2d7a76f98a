//! Route Configuration
//!
//! Configures all HTTP routes for the API. Every feature area is split into a
//! public router (optional authentication) and a protected one (bearer token
//! required); both are merged under the same prefix.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{
    auth_middleware, create_cors_layer, create_trace_layer, locale_middleware, optional_auth_middleware,
    rate_limit_api, rate_limit_auth, track_metrics, SecurityHeadersConfig, SecurityHeadersLayer,
};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let security = SecurityHeadersConfig::for_environment(state.settings.is_production());

    Router::new()
        .nest("/api", api_routes(&state))
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .route("/metrics", get(handlers::health::metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        // Outermost last: locale is resolved before any handler or error renders
        .layer(middleware::from_fn(locale_middleware))
        .layer(create_trace_layer())
        .layer(create_cors_layer(&state.settings.cors))
        .layer(SecurityHeadersLayer::new(security))
        .with_state(state)
}

/// Routes reachable without a token. A valid token still identifies the viewer.
fn public(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth_middleware))
}

/// Routes that require a valid access token. Limits are keyed per member.
fn protected(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_api))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .nest("/member", member_routes(state))
        .nest("/country", country_routes(state))
        .nest("/chat-space", chat_space_routes(state))
        .nest("/stream", stream_routes(state))
        .nest("/calendar", calendar_routes(state))
        .nest("/oauth2", oauth2_routes(state))
        .nest("/contact", contact_routes(state))
        .nest("/follower", follower_routes(state))
        .nest("/blocking", blocking_routes(state))
        .nest("/like", like_routes(state))
        .nest("/bookmark", bookmark_routes(state))
        .nest("/review", review_routes(state))
        .nest("/notification", notification_routes(state))
        .nest("/soft-ask", soft_ask_routes(state))
        .nest("/poll", poll_routes(state))
        .nest("/business", business_routes(state))
}

/// Sign-up, sign-in and token refresh share the stricter auth limit.
fn auth_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/sign-up", post(handlers::auth::sign_up))
        .route("/sign-in", post(handlers::auth::sign_in))
        .route("/refresh-token", post(handlers::auth::refresh_token))
        .route("/sign-out", post(handlers::auth::sign_out))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_auth));

    let account = Router::new().route("/change-password", put(handlers::auth::change_password));

    open.merge(protected(account, state))
}

fn member_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/me", get(handlers::member::get_me))
            .route("/me/update-profile", put(handlers::member::update_profile))
            .route("/me/update-photo", put(handlers::member::update_photo))
            .route("/me/photo", delete(handlers::member::remove_photo))
            .route("/search", get(handlers::member::search))
            .route("/{id}", get(handlers::member::get_profile)),
        state,
    )
}

fn country_routes(state: &AppState) -> Router<AppState> {
    public(
        Router::new()
            .route("/entries", get(handlers::country::find_entries))
            .route("/{code}", get(handlers::country::find_by_code)),
        state,
    )
}

fn chat_space_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/search", get(handlers::chat_space::search))
        .route("/{id}/links", get(handlers::engagement::find_chat_space_links));

    let owned = Router::new()
        .route("/create", post(handlers::chat_space::create))
        .route("/mine", get(handlers::chat_space::find_mine))
        .route("/{id}", get(handlers::chat_space::get).delete(handlers::chat_space::delete))
        .route("/{id}/update", put(handlers::chat_space::update))
        .route("/{id}/update-visibility", put(handlers::chat_space::update_visibility))
        .route("/{id}/enable", put(handlers::chat_space::enable))
        .route("/{id}/disable", put(handlers::chat_space::disable))
        .route("/{id}/join", post(handlers::chat_space::join))
        .route("/{id}/request-to-join", post(handlers::chat_space::request_to_join))
        .route("/{id}/process-join-request", put(handlers::chat_space::process_join_request))
        .route("/{id}/leave", post(handlers::chat_space::leave))
        .route("/{id}/remove-member", put(handlers::chat_space::remove_member))
        .route("/{id}/restore-member", put(handlers::chat_space::restore_member))
        .route("/{id}/promote-admin", put(handlers::chat_space::promote_to_admin))
        .route("/{id}/demote-admin", put(handlers::chat_space::demote_admin))
        .route("/{id}/members", get(handlers::chat_space::find_members))
        .route("/{id}/join-requests", get(handlers::chat_space::find_join_requests))
        .route("/{id}/links", put(handlers::engagement::update_chat_space_links));

    public(open, state).merge(protected(owned, state))
}

fn stream_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/search", get(handlers::stream::search))
        .route("/{id}/reviews", get(handlers::engagement::find_stream_reviews));

    let owned = Router::new()
        .route("/create-event", post(handlers::stream::create_event))
        .route("/create-live-stream", post(handlers::stream::create_live_stream))
        .route("/mine", get(handlers::stream::find_mine))
        .route("/attending", get(handlers::stream::find_attending))
        .route("/{id}", get(handlers::stream::get).delete(handlers::stream::delete))
        .route("/{id}/update", put(handlers::stream::update))
        .route("/{id}/reschedule", put(handlers::stream::reschedule))
        .route("/{id}/update-visibility", put(handlers::stream::update_visibility))
        .route("/{id}/cancel", put(handlers::stream::cancel))
        .route("/{id}/join", post(handlers::stream::join))
        .route("/{id}/request-to-join", post(handlers::stream::request_to_join))
        .route("/{id}/process-join-request", put(handlers::stream::process_join_request))
        .route("/{id}/not-attending", post(handlers::stream::not_attending))
        .route("/{id}/attendees", get(handlers::stream::find_attendees))
        .route("/{id}/join-requests", get(handlers::stream::find_join_requests));

    public(open, state).merge(protected(owned, state))
}

fn calendar_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/create", post(handlers::calendar::create))
            .route("/entries", get(handlers::calendar::find_entries))
            .route("/{id}", get(handlers::calendar::get).delete(handlers::calendar::delete))
            .route("/{id}/update", put(handlers::calendar::update))
            .route("/{id}/reactivate", put(handlers::calendar::reactivate))
            .route("/{id}/deactivate", put(handlers::calendar::deactivate))
            .route("/{id}/share-with-email", post(handlers::calendar::share_with_email)),
        state,
    )
}

fn oauth2_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new().route("/verify-authorization-code", get(handlers::oauth2::verify_authorization_code));

    let owned = Router::new()
        .route("/{service}/get-authorization-uri", get(handlers::oauth2::authorization_uri))
        .route("/{service}/refresh", put(handlers::oauth2::refresh))
        .route("/{service}", delete(handlers::oauth2::revoke));

    public(open, state).merge(protected(owned, state))
}

fn contact_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/update", put(handlers::social::update_contacts))
            .route("/mine", get(handlers::social::find_my_contacts))
            .route("/member/{id}", get(handlers::social::find_contacts_of)),
        state,
    )
}

fn follower_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/member/{id}/followers", get(handlers::social::find_followers))
        .route("/member/{id}/followings", get(handlers::social::find_followings))
        .route("/member/{id}/counts", get(handlers::social::follow_counts));

    let owned = Router::new()
        .route("/follow/{id}", post(handlers::social::follow))
        .route("/unfollow/{id}", post(handlers::social::unfollow))
        .route("/followers", get(handlers::social::find_my_followers))
        .route("/followings", get(handlers::social::find_my_followings))
        .route("/counts", get(handlers::social::my_follow_counts));

    public(open, state).merge(protected(owned, state))
}

fn blocking_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/block-unblock", put(handlers::social::block_or_unblock))
            .route("/blocked-members", get(handlers::social::find_blocked_members)),
        state,
    )
}

fn like_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/like", post(handlers::engagement::like))
            .route("/unlike", post(handlers::engagement::unlike))
            .route("/entries", get(handlers::engagement::find_liked)),
        state,
    )
}

fn bookmark_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/add", post(handlers::engagement::bookmark))
            .route("/remove", post(handlers::engagement::unbookmark))
            .route("/entries", get(handlers::engagement::find_bookmarks)),
        state,
    )
}

fn review_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/create", post(handlers::engagement::create_review))
            .route("/mine", get(handlers::engagement::find_my_reviews))
            .route("/{id}/update", put(handlers::engagement::update_review))
            .route("/{id}", delete(handlers::engagement::delete_review)),
        state,
    )
}

fn notification_routes(state: &AppState) -> Router<AppState> {
    protected(
        Router::new()
            .route("/entries", get(handlers::notification::find_mine))
            .route("/count-unread", get(handlers::notification::count_unread))
            .route("/mark-all-as-read", put(handlers::notification::mark_all_as_read))
            .route("/{id}/mark-as-read", put(handlers::notification::mark_as_read))
            .route("/{id}", delete(handlers::notification::delete)),
        state,
    )
}

fn soft_ask_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/search", get(handlers::soft_ask::search))
        .route("/{id}", get(handlers::soft_ask::get))
        .route("/{id}/answers", get(handlers::soft_ask::find_answers))
        .route("/answer/{id}/replies", get(handlers::soft_ask::find_replies));

    let owned = Router::new()
        .route("/create", post(handlers::soft_ask::create))
        .route("/vote", post(handlers::soft_ask::vote))
        .route("/unvote", post(handlers::soft_ask::unvote))
        .route("/{id}", delete(handlers::soft_ask::delete))
        .route("/{id}/update", put(handlers::soft_ask::update))
        .route("/{id}/close", put(handlers::soft_ask::close))
        .route("/{id}/answer", post(handlers::soft_ask::add_answer))
        .route("/answer/{id}", delete(handlers::soft_ask::delete_answer))
        .route("/answer/{id}/reply", post(handlers::soft_ask::add_reply))
        .route("/reply/{id}", delete(handlers::soft_ask::delete_reply));

    public(open, state).merge(protected(owned, state))
}

fn poll_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new().route("/entries", get(handlers::poll::find_by_parent));

    let owned = Router::new()
        .route("/create", post(handlers::poll::create))
        .route("/{id}", get(handlers::poll::get).delete(handlers::poll::delete))
        .route("/{id}/vote", post(handlers::poll::vote).delete(handlers::poll::retract_vote))
        .route("/{id}/close", put(handlers::poll::close));

    public(open, state).merge(protected(owned, state))
}

fn business_routes(state: &AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/search", get(handlers::business::search))
        .route("/{id}", get(handlers::business::get))
        .route("/{id}/links", get(handlers::engagement::find_business_links));

    let owned = Router::new()
        .route("/create", post(handlers::business::create))
        .route("/mine", get(handlers::business::find_mine))
        .route("/{id}", delete(handlers::business::delete))
        .route("/{id}/update", put(handlers::business::update))
        .route("/{id}/update-status", put(handlers::business::update_status))
        .route("/{id}/links", put(handlers::engagement::update_business_links));

    public(open, state).merge(protected(owned, state))
}
