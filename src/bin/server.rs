use std::{env, fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use potion_admin::{
    AppState, BackendConfig, DEFAULT_API_BASE_URL, ListStore, build_router, get_local_offset,
    graceful_shutdown, logging_middleware,
};

/// How long a list view may go unused before it is discarded.
const LIST_MAX_IDLE: Duration = Duration::from_secs(30 * 60);
/// How often idle list views are looked for.
const LIST_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// The web server for the Potion admin dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The base URL of the platform-admin REST API.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// The port to serve the dashboard from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical timezone name used to display dates, e.g. "Africa/Addis_Ababa".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How many seconds to wait for the API before giving up on a request.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// The file to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,

    /// Log the body of every request and response. Passwords are redacted.
    #[arg(long)]
    log_bodies: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    setup_logging(&args.log_path);

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("\"{}\" is not a canonical timezone name", args.timezone);
        return ExitCode::FAILURE;
    }

    let secret = match env::var("SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            tracing::error!("The environment variable 'SECRET' must be set");
            return ExitCode::FAILURE;
        }
    };

    let backend = match BackendConfig::new(
        &args.api_base_url,
        Duration::from_secs(args.request_timeout_secs),
    ) {
        Ok(backend) => backend,
        Err(error) => {
            tracing::error!("Could not set up the API client: {error}");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(&secret, &args.timezone, backend);
    tokio::spawn(prune_idle_lists(state.list_store.clone()));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state);
    let router = if args.log_bodies {
        router.layer(middleware::from_fn(logging_middleware))
    } else {
        router
    };
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(
        "HTTP server listening on {addr}, using the API at {}",
        args.api_base_url
    );

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped unexpectedly: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Discard list views that nobody has used for a while, e.g. those of
/// sessions that expired without logging out.
async fn prune_idle_lists(list_store: ListStore) {
    let mut interval = tokio::time::interval(LIST_PRUNE_INTERVAL);

    loop {
        interval.tick().await;

        match list_store.prune_idle(LIST_MAX_IDLE) {
            Ok(0) => {}
            Ok(count) => tracing::debug!("Discarded {count} idle list views"),
            Err(error) => tracing::error!("Could not prune idle list views: {error}"),
        }
    }
}

fn setup_logging(log_path: &str) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
