use std::{process, sync::Arc, time::Duration};

use postgate::{
    application::{
        cache_aside::CacheAside, error::AppError, posts::PostService, users::UserService,
    },
    cache::MemoryCache,
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
        upstream::{self, HttpUpstream},
    },
};
use tokio::task::JoinHandle;
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

const POSTS_COLLECTION: &str = "posts";
const USERS_COLLECTION: &str = "users";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let store = Arc::new(MemoryCache::new());
    let sweep_handle = spawn_cache_sweeper(store.clone(), settings.cache.sweep_interval);

    let state = build_http_state(&settings, store)?;
    let result = serve_http(&settings, state).await;

    sweep_handle.abort();
    let _ = sweep_handle.await;

    result
}

fn build_http_state(
    settings: &config::Settings,
    store: Arc<MemoryCache>,
) -> Result<HttpState, AppError> {
    let client = upstream::build_client(&settings.upstream)?;
    let base = &settings.upstream.base_url;
    let posts_upstream = HttpUpstream::new(client.clone(), base, POSTS_COLLECTION)?;
    let users_upstream = HttpUpstream::new(client, base, USERS_COLLECTION)?;
    info!(
        posts = %posts_upstream.collection_url(),
        users = %users_upstream.collection_url(),
        "upstream collections configured"
    );

    let cache = CacheAside::new(store, settings.cache.operation_timeout);
    let users = UserService::new(Arc::new(users_upstream), cache.clone());
    let posts = PostService::new(Arc::new(posts_upstream), cache, users.clone());

    Ok(HttpState {
        posts: Arc::new(posts),
        users: Arc::new(users),
    })
}

fn spawn_cache_sweeper(store: Arc<MemoryCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = store.len(), "expired cache entries purged");
            }
        }
    })
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
