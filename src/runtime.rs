//! ==============================================================================
//! runtime.rs - the periodic reporting loop
//! ==============================================================================
//!
//! purpose:
//!     pulls a record from the source, sends it, prints the outcome and
//!     waits a fixed interval. repeats until the shutdown flag is raised.
//!
//! cycle:
//!
//! ```text
//!     ┌──────────┐     ┌─────────┐     ┌─────────┐
//!     │ building │ ──> │ sending │ ──> │ waiting │ ──┐
//!     └──────────┘     └─────────┘     └─────────┘   │
//!          ^                                         │
//!          └──────────── shutdown flag? ─────────────┘
//! ```
//!
//! ```text
//!     - the flag is checked before building and again after sending
//!     - a record built before the flag went up is still sent
//!     - raising the flag mid-send abandons the send, a hung backend
//!       cannot hold the process
//!     - raising the flag cuts the wait short
//!     - cadence is fixed: no backoff, no retry, no iteration cap
//! ```
//!
//! relationships:
//!     - used by: main.rs (drives the loop until ctrl+c)
//!     - uses: source.rs (RecordSource), sender.rs (Sender, SendOutcome)
//!
//! ==============================================================================

use crate::domain::ObservationRecord;
use crate::sender::{SendOutcome, Sender};
use crate::source::RecordSource;

use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// counters for one run of the loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &SendOutcome) {
        self.iterations += 1;
        if outcome.is_delivered() {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

pub struct Reporter<S> {
    source: S,
    sender: Sender,
    interval: Duration,
}

impl<S: RecordSource> Reporter<S> {
    pub fn new(source: S, sender: Sender, interval: Duration) -> Self {
        Self {
            source,
            sender,
            interval,
        }
    }

    /// one build + send + report cycle, without the wait
    pub async fn run_once(&mut self) -> SendOutcome {
        let record = self.next_record();
        let outcome = self.sender.send_record(&record).await;
        println!("{}", outcome);
        outcome
    }

    /// loop until `shutdown` reads true
    ///
    /// a record built before the flag was raised is still sent. raising the
    /// flag while that send is in flight abandons it; an abandoned send has
    /// no outcome and is not counted.
    pub async fn run_forever(&mut self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::default();
        info!(
            endpoint = %self.sender.endpoint(),
            interval = ?self.interval,
            "reporter started"
        );

        while !*shutdown.borrow_and_update() {
            let record = self.next_record();

            // only a raise from here on cancels the send
            let _ = shutdown.borrow_and_update();

            // a dropped shutdown sender disables the second branch
            let outcome = tokio::select! {
                outcome = self.sender.send_record(&record) => outcome,
                Ok(()) = shutdown.changed() => {
                    println!("[!] Send abandoned on shutdown");
                    break;
                }
            };
            println!("{}", outcome);
            summary.record(&outcome);

            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                Ok(()) = shutdown.changed() => {}
            }
        }

        summary
    }

    fn next_record(&mut self) -> ObservationRecord {
        let record = self.source.next_record();
        if !record.counts_agree() {
            warn!(
                total = record.total_vehicles_counted,
                "per-type counts disagree with vehicles_by_type, sending as-is"
            );
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{build_record, SimulatedSource};
    use std::time::Instant;

    async fn unreachable_sender() -> Sender {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        Sender::new(&format!("http://{}/api/vehicles", addr)).unwrap()
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(&SendOutcome::Rejected {
            status: 503,
            body: String::new(),
        });
        summary.record(&SendOutcome::ConnectionError {
            reason: "refused".to_string(),
        });

        assert_eq!(
            summary,
            RunSummary {
                iterations: 2,
                delivered: 0,
                failed: 2
            }
        );
    }

    #[tokio::test]
    async fn raised_flag_stops_before_first_iteration() {
        let mut pulls = 0;
        let source = || {
            pulls += 1;
            build_record()
        };
        let (_tx, rx) = watch::channel(true);

        let mut reporter = Reporter::new(source, unreachable_sender().await, Duration::ZERO);
        let summary = reporter.run_forever(rx).await;
        drop(reporter);

        assert_eq!(summary.iterations, 0);
        assert_eq!(pulls, 0);
    }

    #[tokio::test]
    async fn run_once_survives_dead_backend() {
        let mut reporter =
            Reporter::new(SimulatedSource, unreachable_sender().await, Duration::ZERO);

        let outcome = reporter.run_once().await;

        assert!(matches!(outcome, SendOutcome::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn shutdown_cuts_the_wait_short() {
        let (tx, rx) = watch::channel(false);
        let mut reporter = Reporter::new(
            SimulatedSource,
            unreachable_sender().await,
            Duration::from_secs(60),
        );

        let started = Instant::now();
        let handle = tokio::spawn(async move { reporter.run_forever(rx).await });
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();

        let summary = handle.await.unwrap();
        assert_eq!(summary.iterations, 1);
        assert_eq!(summary.failed, 1);
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn shutdown_abandons_a_hung_send() {
        // accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let sender = Sender::new(&format!("http://{}/api/vehicles", addr)).unwrap();
        let (tx, rx) = watch::channel(false);
        let mut reporter = Reporter::new(SimulatedSource, sender, Duration::ZERO);
        let handle = tokio::spawn(async move { reporter.run_forever(rx).await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();

        let summary = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("run_forever did not return after shutdown")
            .unwrap();
        assert_eq!(summary, RunSummary::default());
    }
}
