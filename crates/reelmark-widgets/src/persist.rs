//! Rating persistence: optimistic commits pushed to the review server.
//!
//! The UI applies a committed rating immediately; persistence is
//! fire-and-forget relative to the event loop. [`RatingSync`] stamps each
//! submission with a per-entity sequence token and tracks the
//! unsynced/pending/confirmed state per movie, discarding outcomes of
//! superseded requests so the last click wins regardless of network
//! completion order. [`RateClient`] does the actual HTTP work on a
//! background thread; outcomes are drained on the UI thread via
//! `poll_events()`.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// A committed rating the widget layer wants persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCommit {
    pub movie_id: u64,
    pub rating: u8,
}

/// A commit stamped with its sequence token, ready for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRequest {
    pub movie_id: u64,
    pub rating: u8,
    pub seq: u64,
}

/// JSON body of `POST /movie/{id}/rate`. No response body is relied upon;
/// success is any 2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RateBody {
    rating: u8,
}

/// Outcome of one persistence attempt, delivered by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateOutcome {
    Confirmed { movie_id: u64, rating: u8, seq: u64 },
    Failed { movie_id: u64, seq: u64, message: String },
}

impl RateOutcome {
    fn movie_id(&self) -> u64 {
        match *self {
            RateOutcome::Confirmed { movie_id, .. } | RateOutcome::Failed { movie_id, .. } => {
                movie_id
            }
        }
    }

    fn seq(&self) -> u64 {
        match *self {
            RateOutcome::Confirmed { seq, .. } | RateOutcome::Failed { seq, .. } => seq,
        }
    }
}

/// Persistence state of one movie's rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistState {
    /// Never submitted.
    Unsynced,
    /// Latest submission is in flight.
    Pending { rating: u8, seq: u64 },
    /// Latest submission was confirmed by the server.
    Confirmed { rating: u8 },
}

/// What to do with committed visual state when the latest attempt fails.
///
/// The historical behavior is `KeepOptimistic`: the failure is logged and
/// the UI keeps the optimistically applied rating with no error indicator.
/// `RevertToConfirmed` instead rolls the control back to the last
/// server-confirmed value (0 if there is none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    #[default]
    KeepOptimistic,
    RevertToConfirmed,
}

/// Rollback instruction produced under [`FailurePolicy::RevertToConfirmed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revert {
    pub movie_id: u64,
    /// Last confirmed rating, 0 if nothing was ever confirmed.
    pub rating: u8,
}

#[derive(Debug, Clone, Copy, Default)]
struct Entity {
    /// Token of the newest submission for this movie.
    latest_seq: u64,
    /// In-flight (rating, seq) for the newest submission, if unresolved.
    pending: Option<(u8, u64)>,
    /// Last server-confirmed rating.
    confirmed: Option<u8>,
}

/// UI-side bookkeeping for rating persistence.
#[derive(Debug, Clone, Default)]
pub struct RatingSync {
    policy: FailurePolicy,
    next_seq: u64,
    entities: HashMap<u64, Entity>,
}

impl RatingSync {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Stamp a commit with the next sequence token and mark it pending.
    pub fn submit(&mut self, commit: RateCommit) -> RateRequest {
        self.next_seq += 1;
        let seq = self.next_seq;
        let entity = self.entities.entry(commit.movie_id).or_default();
        entity.latest_seq = seq;
        entity.pending = Some((commit.rating, seq));
        RateRequest {
            movie_id: commit.movie_id,
            rating: commit.rating,
            seq,
        }
    }

    /// Apply a client outcome. Outcomes for superseded requests are
    /// discarded; a failure of the newest request yields a [`Revert`]
    /// under `RevertToConfirmed`, and `None` otherwise.
    pub fn apply(&mut self, outcome: &RateOutcome) -> Option<Revert> {
        let movie_id = outcome.movie_id();
        let Some(entity) = self.entities.get_mut(&movie_id) else {
            debug!("outcome for unknown movie {movie_id}; discarding");
            return None;
        };
        if outcome.seq() < entity.latest_seq {
            debug!(
                "outcome for movie {movie_id} superseded (seq {} < {}); discarding",
                outcome.seq(),
                entity.latest_seq
            );
            return None;
        }

        entity.pending = None;
        match outcome {
            RateOutcome::Confirmed { rating, .. } => {
                entity.confirmed = Some(*rating);
                None
            }
            RateOutcome::Failed { message, .. } => {
                warn!("rating update for movie {movie_id} failed: {message}");
                match self.policy {
                    FailurePolicy::KeepOptimistic => None,
                    FailurePolicy::RevertToConfirmed => Some(Revert {
                        movie_id,
                        rating: entity.confirmed.unwrap_or(0),
                    }),
                }
            }
        }
    }

    /// Persistence state of one movie.
    pub fn state(&self, movie_id: u64) -> PersistState {
        match self.entities.get(&movie_id) {
            None => PersistState::Unsynced,
            Some(entity) => match (entity.pending, entity.confirmed) {
                (Some((rating, seq)), _) => PersistState::Pending { rating, seq },
                (None, Some(rating)) => PersistState::Confirmed { rating },
                (None, None) => PersistState::Unsynced,
            },
        }
    }
}

/// HTTP client posting rating updates from a background worker thread.
///
/// Requests flow in over a command channel and outcomes flow back over an
/// event channel, so the UI thread never blocks on the network. There is
/// no cancellation of in-flight requests; ordering is handled by the
/// sequence tokens in [`RatingSync`].
#[derive(Debug)]
pub struct RateClient {
    cmd_tx: Option<Sender<RateRequest>>,
    event_rx: Option<Receiver<RateOutcome>>,
    worker: Option<JoinHandle<()>>,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl RateClient {
    /// Spawn the worker thread. `base_url` is the server origin, e.g.
    /// `https://reelmark.example`; requests go to `{base}/movie/{id}/rate`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let (cmd_tx, cmd_rx) = channel::<RateRequest>();
        let (event_tx, event_rx) = channel::<RateOutcome>();

        let handle = thread::spawn(move || {
            let base = base_url.trim_end_matches('/').to_string();
            info!("rate client worker started for {base}");

            let client = match reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
            {
                Ok(client) => client,
                Err(e) => {
                    warn!("failed to build HTTP client: {e}");
                    // Fail every request rather than silently dropping them.
                    while let Ok(request) = cmd_rx.recv() {
                        let _ = event_tx.send(RateOutcome::Failed {
                            movie_id: request.movie_id,
                            seq: request.seq,
                            message: format!("HTTP client unavailable: {e}"),
                        });
                    }
                    return;
                }
            };

            while let Ok(request) = cmd_rx.recv() {
                let url = format!("{base}/movie/{}/rate", request.movie_id);
                debug!("POST {url} rating={}", request.rating);
                let outcome = match client
                    .post(&url)
                    .json(&RateBody {
                        rating: request.rating,
                    })
                    .send()
                {
                    Ok(response) if response.status().is_success() => RateOutcome::Confirmed {
                        movie_id: request.movie_id,
                        rating: request.rating,
                        seq: request.seq,
                    },
                    Ok(response) => RateOutcome::Failed {
                        movie_id: request.movie_id,
                        seq: request.seq,
                        message: format!("server returned {}", response.status()),
                    },
                    Err(e) => RateOutcome::Failed {
                        movie_id: request.movie_id,
                        seq: request.seq,
                        message: format!("request error: {e}"),
                    },
                };
                if event_tx.send(outcome).is_err() {
                    break;
                }
            }
            info!("rate client worker exiting");
        });

        Self {
            cmd_tx: Some(cmd_tx),
            event_rx: Some(event_rx),
            worker: Some(handle),
        }
    }

    /// Queue a request for the worker. Does not block.
    pub fn send(&self, request: RateRequest) -> Result<(), String> {
        match &self.cmd_tx {
            Some(tx) => tx
                .send(request)
                .map_err(|e| format!("send failed: {e}")),
            None => Err("client is shut down".to_string()),
        }
    }

    /// Drain pending outcomes (non-blocking).
    pub fn poll_events(&mut self) -> Vec<RateOutcome> {
        let mut events = Vec::new();
        if let Some(rx) = &self.event_rx {
            while let Ok(outcome) = rx.try_recv() {
                events.push(outcome);
            }
        }
        events
    }

    /// Stop accepting requests and wait for the worker to drain its
    /// queue and exit.
    pub fn shutdown(&mut self) {
        self.cmd_tx = None;
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("rate client worker panicked");
            }
        }
        self.event_rx = None;
    }
}

impl Drop for RateClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Instant;

    #[test]
    fn test_rate_body_wire_format() {
        // The endpoint accepts exactly {"rating": <int>} and nothing else.
        let json = serde_json::to_string(&RateBody { rating: 4 }).unwrap();
        assert_eq!(json, r#"{"rating":4}"#);

        let body: RateBody = serde_json::from_str(r#"{"rating":5}"#).unwrap();
        assert_eq!(body.rating, 5);
    }

    #[test]
    fn test_submit_then_confirm() {
        let mut sync = RatingSync::default();
        let request = sync.submit(RateCommit {
            movie_id: 42,
            rating: 4,
        });
        assert_eq!(
            sync.state(42),
            PersistState::Pending {
                rating: 4,
                seq: request.seq
            }
        );

        let revert = sync.apply(&RateOutcome::Confirmed {
            movie_id: 42,
            rating: 4,
            seq: request.seq,
        });
        assert_eq!(revert, None);
        assert_eq!(sync.state(42), PersistState::Confirmed { rating: 4 });
    }

    #[test]
    fn test_superseded_outcome_is_discarded() {
        let mut sync = RatingSync::default();
        let first = sync.submit(RateCommit {
            movie_id: 42,
            rating: 2,
        });
        let second = sync.submit(RateCommit {
            movie_id: 42,
            rating: 5,
        });

        // The older request resolves after the newer one was submitted.
        let revert = sync.apply(&RateOutcome::Confirmed {
            movie_id: 42,
            rating: 2,
            seq: first.seq,
        });
        assert_eq!(revert, None);
        assert_eq!(
            sync.state(42),
            PersistState::Pending {
                rating: 5,
                seq: second.seq
            },
            "stale confirmation must not settle the newer request"
        );

        sync.apply(&RateOutcome::Confirmed {
            movie_id: 42,
            rating: 5,
            seq: second.seq,
        });
        assert_eq!(sync.state(42), PersistState::Confirmed { rating: 5 });
    }

    #[test]
    fn test_failure_keeps_optimistic_state_by_default() {
        let mut sync = RatingSync::default();
        let request = sync.submit(RateCommit {
            movie_id: 7,
            rating: 3,
        });
        let revert = sync.apply(&RateOutcome::Failed {
            movie_id: 7,
            seq: request.seq,
            message: "server returned 500".into(),
        });
        assert_eq!(revert, None);
    }

    #[test]
    fn test_failure_reverts_to_last_confirmed_when_opted_in() {
        let mut sync = RatingSync::new(FailurePolicy::RevertToConfirmed);

        // No confirmation yet: revert to unrated.
        let request = sync.submit(RateCommit {
            movie_id: 7,
            rating: 3,
        });
        let revert = sync.apply(&RateOutcome::Failed {
            movie_id: 7,
            seq: request.seq,
            message: "boom".into(),
        });
        assert_eq!(
            revert,
            Some(Revert {
                movie_id: 7,
                rating: 0
            })
        );

        // After a confirmation, revert to it.
        let ok = sync.submit(RateCommit {
            movie_id: 7,
            rating: 4,
        });
        sync.apply(&RateOutcome::Confirmed {
            movie_id: 7,
            rating: 4,
            seq: ok.seq,
        });
        let bad = sync.submit(RateCommit {
            movie_id: 7,
            rating: 1,
        });
        let revert = sync.apply(&RateOutcome::Failed {
            movie_id: 7,
            seq: bad.seq,
            message: "boom".into(),
        });
        assert_eq!(
            revert,
            Some(Revert {
                movie_id: 7,
                rating: 4
            })
        );
    }

    #[test]
    fn test_sequence_tokens_are_per_submission_monotonic() {
        let mut sync = RatingSync::default();
        let a = sync.submit(RateCommit {
            movie_id: 1,
            rating: 1,
        });
        let b = sync.submit(RateCommit {
            movie_id: 2,
            rating: 2,
        });
        assert!(b.seq > a.seq);
    }

    /// Minimal HTTP stub: accepts connections, captures each request, and
    /// answers with a fixed status line.
    fn spawn_stub(status: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        let addr = listener.local_addr().expect("stub addr");
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                // Read headers, then the Content-Length body.
                let body_start = loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break None,
                        Ok(n) => {
                            raw.extend_from_slice(&buf[..n]);
                            if let Some(pos) =
                                raw.windows(4).position(|w| w == b"\r\n\r\n")
                            {
                                break Some(pos + 4);
                            }
                        }
                        Err(_) => break None,
                    }
                };
                if let Some(body_start) = body_start {
                    let headers = String::from_utf8_lossy(&raw[..body_start]).to_string();
                    let content_length = headers
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().to_string())
                        })
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(0);
                    while raw.len() < body_start + content_length {
                        match stream.read(&mut buf) {
                            Ok(0) | Err(_) => break,
                            Ok(n) => raw.extend_from_slice(&buf[..n]),
                        }
                    }
                    let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
                    let response = format!(
                        "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    );
                    let _ = stream.write_all(response.as_bytes());
                }
            }
        });

        (format!("http://{addr}"), rx)
    }

    fn wait_for_outcome(client: &mut RateClient) -> RateOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = client.poll_events().pop() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "timed out waiting for outcome");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_client_posts_rating_and_confirms_on_2xx() {
        let (base, requests) = spawn_stub("200 OK");
        let mut client = RateClient::new(base);

        client
            .send(RateRequest {
                movie_id: 42,
                rating: 4,
                seq: 1,
            })
            .unwrap();

        let outcome = wait_for_outcome(&mut client);
        assert_eq!(
            outcome,
            RateOutcome::Confirmed {
                movie_id: 42,
                rating: 4,
                seq: 1
            }
        );

        let captured = requests.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(captured.starts_with("POST /movie/42/rate"), "{captured}");
        assert!(captured.ends_with(r#"{"rating":4}"#), "{captured}");
    }

    #[test]
    fn test_client_reports_failure_on_500() {
        let (base, _requests) = spawn_stub("500 Internal Server Error");
        let mut client = RateClient::new(base);

        client
            .send(RateRequest {
                movie_id: 42,
                rating: 4,
                seq: 1,
            })
            .unwrap();

        match wait_for_outcome(&mut client) {
            RateOutcome::Failed {
                movie_id,
                seq,
                message,
            } => {
                assert_eq!(movie_id, 42);
                assert_eq!(seq, 1);
                assert!(message.contains("500"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_client_reports_failure_when_unreachable() {
        // Nothing listens on this port (bound then dropped).
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut client = RateClient::new(format!("http://127.0.0.1:{port}"));

        client
            .send(RateRequest {
                movie_id: 1,
                rating: 1,
                seq: 1,
            })
            .unwrap();

        assert!(matches!(
            wait_for_outcome(&mut client),
            RateOutcome::Failed { movie_id: 1, .. }
        ));
    }

    #[test]
    fn test_shutdown_joins_after_draining_queued_requests() {
        let (base, requests) = spawn_stub("200 OK");
        let mut client = RateClient::new(base);

        client
            .send(RateRequest {
                movie_id: 3,
                rating: 2,
                seq: 1,
            })
            .unwrap();
        client.shutdown();

        // shutdown() returns only after the worker exited, so the queued
        // request must already have reached the server.
        let captured = requests.try_recv().unwrap();
        assert!(captured.starts_with("POST /movie/3/rate"), "{captured}");
    }

    #[test]
    fn test_send_after_shutdown_errors() {
        let (base, _requests) = spawn_stub("200 OK");
        let mut client = RateClient::new(base);
        client.shutdown();
        assert!(client
            .send(RateRequest {
                movie_id: 1,
                rating: 1,
                seq: 1,
            })
            .is_err());
    }
}
