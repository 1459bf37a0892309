use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::error::TransportError;
use crate::transport::Transport;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

struct Request {
    url: String,
    body: String,
}

/// Native transport: a worker thread performs blocking PUTs with `reqwest`.
///
/// If frames outpace the server, queued requests collapse into the newest
/// one, since every body carries the full key state.
pub struct HttpTransport {
    base_url: String,
    requests: Option<Sender<Request>>,
    responses: Receiver<Result<String, TransportError>>,
    worker: Option<JoinHandle<()>>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> HttpTransport {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (response_tx, response_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("wibble-transport".to_string())
            .spawn(move || worker_loop(request_rx, response_tx));
        let worker = match worker {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn!("could not start transport thread, running offline: {err}");
                None
            }
        };
        HttpTransport {
            base_url: base_url.trim_end_matches('/').to_string(),
            requests: worker.is_some().then_some(request_tx),
            responses: response_rx,
            worker,
        }
    }
}

fn worker_loop(requests: Receiver<Request>, responses: Sender<Result<String, TransportError>>) {
    let client = match reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            warn!("could not build http client: {err}");
            return;
        }
    };
    while let Ok(mut request) = requests.recv() {
        while let Ok(newer) = requests.try_recv() {
            request = newer;
        }
        let result = put(&client, request);
        if responses.send(result).is_err() {
            break;
        }
    }
    debug!("transport thread finished");
}

fn put(client: &reqwest::blocking::Client, request: Request) -> Result<String, TransportError> {
    let response = client
        .put(&request.url)
        .header("Content-Type", "application/json")
        .body(request.body)
        .send()
        .map_err(|err| TransportError::Request(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }
    response
        .text()
        .map_err(|err| TransportError::MalformedResponse(err.to_string()))
}

impl Transport for HttpTransport {
    fn send(&mut self, path: &str, body: String) {
        let Some(requests) = &self.requests else {
            return;
        };
        let url = format!("{}{path}", self.base_url);
        if requests.send(Request { url, body }).is_err() {
            warn!("transport thread is gone, dropping request");
            self.requests = None;
        }
    }

    fn poll(&mut self) -> Option<Result<String, TransportError>> {
        match self.responses.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("transport thread panicked");
            }
        }
    }
}
