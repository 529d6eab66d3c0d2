//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use dashx_auth::{AuthService, CryptoService, PasswordHasher};
use dashx_cache::CacheManager;
use dashx_core::config::AppConfig;
use dashx_core::result::AppResult;
use dashx_database::repositories::{
    BrokerRepository, DeviceControlRepository, DeviceRepository, PgBrokerRepository,
    PgDeviceControlRepository, PgDeviceRepository, PgUserRepository, UserRepository,
};
use dashx_realtime::EventRegistry;
use dashx_service::{
    BrokerService, DeviceControlService, DeviceService, MailService, UserService,
};

/// Repository handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub brokers: Arc<dyn BrokerRepository>,
    pub devices: Arc<dyn DeviceRepository>,
    pub controls: Arc<dyn DeviceControlRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            brokers: Arc::new(PgBrokerRepository::new(pool.clone())),
            devices: Arc::new(PgDeviceRepository::new(pool.clone())),
            controls: Arc::new(PgDeviceControlRepository::new(pool)),
        }
    }
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token issue, verification and revocation.
    pub auth: Arc<AuthService>,

    // ── Realtime ─────────────────────────────────────────────
    /// Per-user event channels.
    pub events: EventRegistry,

    // ── Services ─────────────────────────────────────────────
    pub user_service: Arc<UserService>,
    pub broker_service: Arc<BrokerService>,
    pub device_service: Arc<DeviceService>,
    pub control_service: Arc<DeviceControlService>,
}

impl AppState {
    /// Wire the auth stack, event registry and services.
    pub fn new(
        config: AppConfig,
        repos: Repositories,
        cache: CacheManager,
        mail: MailService,
    ) -> AppResult<Self> {
        let hasher = PasswordHasher::new(&config.auth.password)?;
        let auth = Arc::new(AuthService::new(&config.auth, cache.clone(), hasher.clone()));
        let crypto = CryptoService::new(&config.crypto.brokers_key()?);
        let events = EventRegistry::new(config.realtime.channel_buffer_size);

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repos.users),
            Arc::clone(&auth),
            hasher,
            cache,
            mail,
            events.clone(),
        ));
        let broker_service = Arc::new(BrokerService::new(
            Arc::clone(&repos.brokers),
            crypto,
            events.clone(),
        ));
        let device_service = Arc::new(DeviceService::new(
            Arc::clone(&repos.devices),
            Arc::clone(&repos.brokers),
            events.clone(),
        ));
        let control_service = Arc::new(DeviceControlService::new(
            repos.controls,
            repos.devices,
            events.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            auth,
            events,
            user_service,
            broker_service,
            device_service,
            control_service,
        })
    }
}
