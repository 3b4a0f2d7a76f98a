//! Application Startup
//!
//! Application building and server initialization. Repositories, Google
//! gateways and services are wired once here and shared through [`AppState`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;

use crate::application::services::{
    AuthService, AuthServiceImpl, BlockUserService, BlockUserServiceImpl, BookmarkService, BookmarkServiceImpl,
    BusinessService, BusinessServiceImpl, CalendarService, CalendarServiceImpl, ChatSpaceService,
    ChatSpaceServiceImpl, ContactService, ContactServiceImpl, CountryService, CountryServiceImpl, FollowerService,
    FollowerServiceImpl, LikeService, LikeServiceImpl, LinkService, LinkServiceImpl, MemberService,
    MemberServiceImpl, NotificationService, NotificationServiceImpl, Notifier, Oauth2Service, Oauth2ServiceImpl,
    Oauth2TokenProvider, PollService, PollServiceImpl, ReviewService, ReviewServiceImpl, SoftAskService,
    SoftAskServiceImpl, StreamGateways, StreamService, StreamServiceImpl,
};
use crate::config::Settings;
use crate::domain::gateways::{
    AccessTokenProvider, CalendarGateway, ChatSpaceGateway, EventPublisher, LiveBroadcastGateway, OAuth2Client,
    OAuthStateStore,
};
use crate::domain::{
    BlockUserRepository, BusinessRepository, CalendarRepository, ChatSpaceRepository, CountryRepository,
    FollowerRepository, LikeRepository, MemberRepository, NotificationRepository, Oauth2AuthorizationRepository,
    StreamRepository,
};
use crate::infrastructure::cache::{RedisCache, RedisHandle, RedisOAuthStateStore};
use crate::infrastructure::google::{
    GoogleCalendarGateway, GoogleChatGateway, GoogleClient, GoogleOAuth2Client, YoutubeBroadcastGateway,
};
use crate::infrastructure::messaging::RedisEventPublisher;
use crate::infrastructure::recaptcha::ReCaptchaService;
use crate::infrastructure::repositories::{
    PgBlockUserRepository, PgBookmarkRepository, PgBusinessRepository, PgCalendarRepository, PgChatSpaceRepository,
    PgContactRepository, PgCountryRepository, PgFollowerRepository, PgLikeRepository, PgLinkRepository,
    PgMemberRepository, PgNotificationRepository, PgOauth2AuthorizationRepository, PgPollRepository,
    PgReviewRepository, PgSessionRepository, PgSoftAskRepository, PgStreamRepository,
};
use crate::infrastructure::database;
use crate::presentation::http::{handlers::health, routes};
use crate::shared::snowflake::SnowflakeGenerator;

/// One service per feature slice.
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub members: Arc<dyn MemberService>,
    pub countries: Arc<dyn CountryService>,
    pub chat_spaces: Arc<dyn ChatSpaceService>,
    pub streams: Arc<dyn StreamService>,
    pub calendars: Arc<dyn CalendarService>,
    pub oauth2: Arc<dyn Oauth2Service>,
    pub contacts: Arc<dyn ContactService>,
    pub followers: Arc<dyn FollowerService>,
    pub blocks: Arc<dyn BlockUserService>,
    pub likes: Arc<dyn LikeService>,
    pub bookmarks: Arc<dyn BookmarkService>,
    pub links: Arc<dyn LinkService>,
    pub reviews: Arc<dyn ReviewService>,
    pub notifications: Arc<dyn NotificationService>,
    pub soft_asks: Arc<dyn SoftAskService>,
    pub polls: Arc<dyn PollService>,
    pub businesses: Arc<dyn BusinessService>,
}

impl Services {
    /// Wire repositories, Google gateways and services against `db` and `redis`.
    pub fn build(db: &PgPool, redis: &RedisHandle, settings: &Settings, http: reqwest::Client) -> Self {
        let ids = Arc::new(SnowflakeGenerator::new(
            settings.snowflake.machine_id as u64,
            settings.snowflake.node_id as u64,
        ));

        let member_repo = Arc::new(PgMemberRepository::new(db.clone()));
        let members: Arc<dyn MemberRepository> = member_repo.clone();
        let sessions = Arc::new(PgSessionRepository::new(db.clone()));
        let countries: Arc<dyn CountryRepository> = Arc::new(PgCountryRepository::new(db.clone()));
        let chat_spaces: Arc<dyn ChatSpaceRepository> = Arc::new(PgChatSpaceRepository::new(db.clone()));
        let streams: Arc<dyn StreamRepository> = Arc::new(PgStreamRepository::new(db.clone()));
        let calendars: Arc<dyn CalendarRepository> = Arc::new(PgCalendarRepository::new(db.clone()));
        let followers: Arc<dyn FollowerRepository> = Arc::new(PgFollowerRepository::new(db.clone()));
        let blocks: Arc<dyn BlockUserRepository> = Arc::new(PgBlockUserRepository::new(db.clone()));
        let likes: Arc<dyn LikeRepository> = Arc::new(PgLikeRepository::new(db.clone()));
        let businesses: Arc<dyn BusinessRepository> = Arc::new(PgBusinessRepository::new(db.clone()));
        let notifications: Arc<dyn NotificationRepository> = Arc::new(PgNotificationRepository::new(db.clone()));
        let authorizations: Arc<dyn Oauth2AuthorizationRepository> =
            Arc::new(PgOauth2AuthorizationRepository::new(db.clone()));

        let google = GoogleClient::new(http, settings.google.clone());
        let oauth2_client: Arc<dyn OAuth2Client> = Arc::new(GoogleOAuth2Client::new(google.clone()));
        let tokens: Arc<dyn AccessTokenProvider> =
            Arc::new(Oauth2TokenProvider::new(authorizations.clone(), oauth2_client.clone()));
        let calendar_gateway: Arc<dyn CalendarGateway> =
            Arc::new(GoogleCalendarGateway::new(google.clone(), tokens.clone()));
        let chat_gateway: Arc<dyn ChatSpaceGateway> = Arc::new(GoogleChatGateway::new(google.clone(), tokens.clone()));
        let broadcast_gateway: Arc<dyn LiveBroadcastGateway> = Arc::new(YoutubeBroadcastGateway::new(google, tokens));
        let events: Arc<dyn EventPublisher> = Arc::new(RedisEventPublisher::new(redis.clone()));
        let states: Arc<dyn OAuthStateStore> = Arc::new(RedisOAuthStateStore::new(RedisCache::new(redis.clone())));

        let notifier = Notifier::new(notifications.clone(), ids.clone());

        Self {
            auth: Arc::new(AuthServiceImpl::new(member_repo, sessions, ids.clone(), settings.jwt.clone())),
            members: Arc::new(MemberServiceImpl::new(
                members.clone(),
                followers.clone(),
                blocks.clone(),
                countries.clone(),
            )),
            countries: Arc::new(CountryServiceImpl::new(countries.clone())),
            chat_spaces: Arc::new(ChatSpaceServiceImpl::new(
                chat_spaces.clone(),
                members.clone(),
                likes.clone(),
                chat_gateway,
                notifier.clone(),
                ids.clone(),
            )),
            streams: Arc::new(StreamServiceImpl::new(
                streams.clone(),
                members.clone(),
                chat_spaces.clone(),
                calendars.clone(),
                StreamGateways {
                    calendar: calendar_gateway.clone(),
                    broadcast: broadcast_gateway,
                    events: events.clone(),
                },
                notifier.clone(),
                ids.clone(),
            )),
            calendars: Arc::new(CalendarServiceImpl::new(
                calendars,
                countries.clone(),
                calendar_gateway,
                ids.clone(),
            )),
            oauth2: Arc::new(Oauth2ServiceImpl::new(
                authorizations,
                oauth2_client,
                states,
                settings.google.state_ttl_secs,
                ids.clone(),
            )),
            contacts: Arc::new(ContactServiceImpl::new(
                Arc::new(PgContactRepository::new(db.clone())),
                blocks.clone(),
                ids.clone(),
            )),
            followers: Arc::new(FollowerServiceImpl::new(
                followers.clone(),
                members.clone(),
                blocks.clone(),
                notifier.clone(),
                ids.clone(),
            )),
            blocks: Arc::new(BlockUserServiceImpl::new(blocks, followers, members.clone(), ids.clone())),
            likes: Arc::new(LikeServiceImpl::new(likes, ids.clone())),
            bookmarks: Arc::new(BookmarkServiceImpl::new(
                Arc::new(PgBookmarkRepository::new(db.clone())),
                ids.clone(),
            )),
            links: Arc::new(LinkServiceImpl::new(
                Arc::new(PgLinkRepository::new(db.clone())),
                chat_spaces.clone(),
                businesses.clone(),
                ids.clone(),
            )),
            reviews: Arc::new(ReviewServiceImpl::new(
                Arc::new(PgReviewRepository::new(db.clone())),
                streams.clone(),
                members.clone(),
                notifier.clone(),
                ids.clone(),
            )),
            notifications: Arc::new(NotificationServiceImpl::new(notifications)),
            soft_asks: Arc::new(SoftAskServiceImpl::new(
                Arc::new(PgSoftAskRepository::new(db.clone())),
                chat_spaces.clone(),
                streams.clone(),
                members,
                events,
                notifier,
                ids.clone(),
            )),
            polls: Arc::new(PollServiceImpl::new(
                Arc::new(PgPollRepository::new(db.clone())),
                chat_spaces,
                streams,
                ids.clone(),
            )),
            businesses: Arc::new(BusinessServiceImpl::new(businesses, countries, ids)),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: RedisHandle,
    pub settings: Arc<Settings>,
    pub recaptcha: ReCaptchaService,
    pub services: Arc<Services>,
}

impl AppState {
    pub fn new(db: PgPool, redis: RedisHandle, settings: Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.google.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let services = Services::build(&db, &redis, &settings, http.clone());
        let recaptcha = ReCaptchaService::new(http, settings.recaptcha.clone());

        Ok(Self {
            db,
            redis,
            settings: Arc::new(settings),
            recaptcha,
            services: Arc::new(services),
        })
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await.context("Failed to run migrations")?;
            info!("Database migrations applied");
        }

        // Redis connects on first use
        let redis = RedisHandle::open(&settings.redis).context("Invalid Redis URL")?;

        let addr = settings.server.socket_addr().context("Invalid server address")?;
        let state = AppState::new(db, redis, settings)?;
        let router = routes::create_router(state);

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listening");

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
