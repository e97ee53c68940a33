//! A loopback stand-in for the platform-admin API.

use axum::Router;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral loopback port and return its base URL.
///
/// The server runs until the test's runtime shuts down.
pub(crate) async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind mock backend listener");
    let address = listener
        .local_addr()
        .expect("Could not get mock backend address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Mock backend stopped unexpectedly");
    });

    format!("http://{address}")
}

/// A base URL on a loopback port that nothing is listening on.
pub(crate) async fn unreachable_backend_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind listener");
    let address = listener.local_addr().expect("Could not get address");
    drop(listener);

    format!("http://{address}")
}
