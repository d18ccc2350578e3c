use crate::{port::Probe, utils::parse_port, PortReport};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(3);

pub struct WatchCommand {
    interval: Duration,
}

impl WatchCommand {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// An endless stream of check results: one immediately, then one per
    /// interval. Nothing is carried over between ticks.
    pub fn ticks<'a, P: Probe>(&self, probe: &'a P, port: u16) -> impl Stream<Item = PortReport> + 'a {
        let interval = self.interval;
        futures::stream::unfold(true, move |first| async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            Some((probe.check(port).await, false))
        })
    }

    /// Polls `input` until `cancel` fires, handing each result to `sink`.
    ///
    /// Invalid input is reported once and nothing is polled.
    pub async fn execute<P, F>(&self, probe: &P, input: &str, cancel: CancellationToken, mut sink: F)
    where
        P: Probe,
        F: FnMut(&PortReport),
    {
        let port = match parse_port(input) {
            Ok(port) => port,
            Err(e) => {
                sink(&PortReport::invalid(e.to_string()));
                return;
            }
        };

        let ticks = self.ticks(probe, port);
        futures::pin_mut!(ticks);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = ticks.next() => match next {
                    Some(report) => sink(&report),
                    None => break,
                },
            }
        }
    }
}

impl Default for WatchCommand {
    fn default() -> Self {
        Self::new(DEFAULT_WATCH_INTERVAL)
    }
}
