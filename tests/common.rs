use laponia_api::AppState;
use laponia_testsupport::ChatClient;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub client: ChatClient,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Stop accepting connections and wait for the server task to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}

/// Serve `state` on an ephemeral loopback port.
pub async fn spawn_server(state: AppState) -> anyhow::Result<TestServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = laponia_api::serve(listener, state, shutdown).await {
            eprintln!("test server error: {e}");
        }
    });

    Ok(TestServer {
        client: ChatClient::new(format!("http://{addr}")),
        shutdown: Some(tx),
        handle,
    })
}
