//! Local HTTP/1.1 responder for exercising the real transports in tests

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Serves connections one at a time, recording each request head
pub struct TestServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
    requests: mpsc::Receiver<String>,
}

impl TestServer {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&mut TcpStream) -> io::Result<()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let (tx, requests) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(head) = read_request(&mut stream) else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send(head);
                let _ = respond(&mut stream);
            }
        });

        Self {
            url,
            hits,
            requests,
        }
    }

    /// Requests answered so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Head (request line + headers) of the next recorded request
    pub fn next_request(&self) -> Option<String> {
        self.requests.recv_timeout(Duration::from_secs(5)).ok()
    }
}

/// Bodiless response with the given status line, e.g. `"503 Service Unavailable"`
pub fn status_only(status: &'static str) -> impl Fn(&mut TcpStream) -> io::Result<()> {
    move |stream| {
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        )?;
        stream.flush()
    }
}

/// Read the request head, then drain a `Content-Length` body if present
fn read_request(stream: &mut TcpStream) -> io::Result<String> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        if stream.read(&mut byte)? == 0 {
            break;
        }
        head.push(byte[0]);
    }

    let head = String::from_utf8_lossy(&head).into_owned();
    let body_len = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body)?;
    Ok(head)
}
