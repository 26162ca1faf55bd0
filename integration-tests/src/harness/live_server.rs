use futures_util::{SinkExt, StreamExt};
use std::net::TcpListener;
use std::thread;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// WebSocket log server that plays one script of frames per accepted
/// connection, then closes it. Connections past the last script are closed
/// straight away.
pub struct LiveServer {
    endpoint: String,
}

impl LiveServer {
    pub fn start(scripts: Vec<Vec<String>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind live server");
        listener
            .set_nonblocking(true)
            .expect("failed to set nonblocking");
        let port = listener.local_addr().expect("local addr").port();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build live server runtime");

            rt.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("failed to adopt listener");
                let mut scripts = scripts.into_iter();

                while let Ok((stream, _)) = listener.accept().await {
                    let script = scripts.next().unwrap_or_default();
                    let Ok(mut ws) = accept_async(stream).await else {
                        continue;
                    };

                    for frame in script {
                        if ws.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    let _ = ws.close(None).await;
                    while let Some(Ok(_)) = ws.next().await {}
                }
            });
        });

        Self {
            endpoint: format!("ws://127.0.0.1:{port}/logs"),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Page URL whose derived live endpoint is this server.
    pub fn page_url(&self) -> String {
        self.endpoint
            .replacen("ws://", "http://", 1)
            .trim_end_matches("/logs")
            .to_string()
            + "/"
    }
}
