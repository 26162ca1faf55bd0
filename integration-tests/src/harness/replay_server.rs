use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

/// What a path answers with.
#[derive(Debug, Clone)]
pub enum Response {
    /// 200 with the body written in pieces of the given sizes (cycled), and
    /// no length header, so the body ends when the connection does.
    Chunked { body: Vec<u8>, chunk_sizes: Vec<usize> },
    /// A length header promising more than is ever sent.
    CutShort { body: Vec<u8>, claimed_len: usize },
    Status(u16),
}

/// Minimal HTTP server for bulk log downloads.
pub struct ReplayServer {
    base_url: String,
}

impl ReplayServer {
    pub fn start(routes: Vec<(&str, Response)>) -> Self {
        let routes: HashMap<String, Response> = routes
            .into_iter()
            .map(|(path, response)| (path.to_string(), response))
            .collect();

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind replay server");
        let port = listener.local_addr().expect("local addr").port();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let routes = routes.clone();
                thread::spawn(move || serve(stream, &routes));
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn serve(mut stream: TcpStream, routes: &HashMap<String, Response>) {
    let _ = stream.set_nodelay(true);

    let mut request_line = String::new();
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) | Err(_) => break,
            Ok(_) if header == "\r\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");

    match routes.get(path) {
        Some(Response::Chunked { body, chunk_sizes }) => {
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nConnection: close\r\n\r\n",
            );
            let mut sizes = chunk_sizes.iter().copied().filter(|&n| n > 0).cycle();
            let mut rest = body.as_slice();
            while !rest.is_empty() {
                let n = sizes.next().unwrap_or(rest.len()).min(rest.len());
                let (chunk, tail) = rest.split_at(n);
                if stream.write_all(chunk).and_then(|_| stream.flush()).is_err() {
                    return;
                }
                rest = tail;
            }
        }
        Some(Response::CutShort { body, claimed_len }) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {claimed_len}\r\nConnection: close\r\n\r\n"
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
            let _ = stream.flush();
        }
        Some(Response::Status(code)) => {
            let head = format!("HTTP/1.1 {code} Whatever\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(head.as_bytes());
        }
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
        }
    }
}
