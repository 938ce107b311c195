use super::Remb;
use crate::session::Ssrc;
use smallvec::smallvec;
use std::time::{Duration, Instant};

/// Estimates never drop below this
pub(crate) const MIN_ESTIMATE_BPS: u64 = 30_000;

const LOSS_HIGH: f64 = 0.10;
const LOSS_LOW: f64 = 0.02;
const INCREASE_FACTOR: f64 = 1.08;

/// Receive side estimator, produces REMB reports for the video stream the peer sends us
#[derive(Debug)]
pub(crate) struct RembLocal {
    sender_ssrc: Ssrc,
    media_ssrc: Ssrc,
    interval: Duration,
    /// Ceiling in bps, 0 if unlimited
    max_bitrate: u64,

    estimate: Option<u64>,
    window: Option<Window>,
}

/// Statistics of the packets received since the last report
#[derive(Debug)]
struct Window {
    start: Instant,
    bytes: u64,
    received: u64,
    first_seq: u16,
    highest_seq: u16,
}

impl Window {
    fn new(now: Instant, seq: u16) -> Self {
        Self {
            start: now,
            bytes: 0,
            received: 0,
            first_seq: seq,
            highest_seq: seq,
        }
    }

    fn add(&mut self, seq: u16, len: usize) {
        self.bytes += len as u64;
        self.received += 1;

        // only advance on sequence numbers ahead, within half the number space
        if seq.wrapping_sub(self.highest_seq) < 0x8000 {
            self.highest_seq = seq;
        }
    }

    fn loss(&self) -> f64 {
        let expected = u64::from(self.highest_seq.wrapping_sub(self.first_seq)) + 1;

        if self.received >= expected {
            0.0
        } else {
            (expected - self.received) as f64 / expected as f64
        }
    }
}

impl RembLocal {
    pub(crate) fn new(
        sender_ssrc: Ssrc,
        media_ssrc: Ssrc,
        interval: Duration,
        max_recv_kbps: u32,
    ) -> Self {
        Self {
            sender_ssrc,
            media_ssrc,
            interval,
            max_bitrate: u64::from(max_recv_kbps) * 1000,
            estimate: None,
            window: None,
        }
    }

    pub(crate) fn set_max_recv_bandwidth(&mut self, max_recv_kbps: u32) {
        self.max_bitrate = u64::from(max_recv_kbps) * 1000;
    }

    pub(crate) fn on_rtp(&mut self, now: Instant, seq: u16, len: usize) {
        self.window
            .get_or_insert_with(|| Window::new(now, seq))
            .add(seq, len);
    }

    pub(crate) fn timeout(&self, now: Instant) -> Option<Duration> {
        self.window
            .as_ref()
            .map(|window| (window.start + self.interval).saturating_duration_since(now))
    }

    /// Produce a REMB report if the current window has elapsed
    pub(crate) fn poll(&mut self, now: Instant) -> Option<Remb> {
        let window = self.window.as_ref()?;

        let elapsed = now.saturating_duration_since(window.start);
        if elapsed < self.interval {
            return None;
        }

        let window = self.window.take()?;
        let rate = (window.bytes as f64 * 8.0 / elapsed.as_secs_f64()) as u64;
        let loss = window.loss();

        let estimate = match self.estimate {
            None => rate,
            Some(estimate) if loss > LOSS_HIGH => (estimate as f64 * (1.0 - loss / 2.0)) as u64,
            Some(estimate) if loss < LOSS_LOW => (estimate as f64 * INCREASE_FACTOR) as u64,
            Some(estimate) => estimate,
        };

        let mut estimate = estimate.max(MIN_ESTIMATE_BPS);
        if self.max_bitrate != 0 {
            estimate = estimate.min(self.max_bitrate);
        }

        log::trace!(
            "REMB estimate for {}: {estimate} bps (rate: {rate} bps, loss: {:.1}%)",
            self.media_ssrc,
            loss * 100.0
        );

        self.estimate = Some(estimate);

        Some(Remb {
            sender_ssrc: self.sender_ssrc.0,
            bitrate: estimate,
            ssrcs: smallvec![self.media_ssrc.0],
        })
    }
}
