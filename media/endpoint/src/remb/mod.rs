//! REMB based bandwidth control of the video session
//!
//! Two independent roles exist, which one is active depends on the negotiated video direction:
//!
//! - [`RembLocal`] estimates the bandwidth of the video we receive and reports it to the peer.
//! - [`RembRemote`] applies the reports of the peer to the video we send, within the configured bounds.

use crate::session::Ssrc;
use sdp_types::Direction;
use std::time::{Duration, Instant};

mod local;
mod packet;
mod remote;

pub(crate) use local::RembLocal;
pub use packet::{Remb, RembParseError};
pub(crate) use remote::RembRemote;

#[derive(Debug)]
pub(crate) struct BandwidthController {
    local: Option<RembLocal>,
    remote: Option<RembRemote>,
}

/// Settings the controller is created with, bandwidths in kbps
#[derive(Debug, Clone, Copy)]
pub(crate) struct BandwidthParams {
    pub(crate) local_video_ssrc: Ssrc,
    pub(crate) remote_video_ssrc: Ssrc,
    pub(crate) remb_interval: Duration,
    pub(crate) min_send_kbps: u32,
    pub(crate) max_send_kbps: u32,
    pub(crate) max_recv_kbps: u32,
}

impl BandwidthController {
    /// `direction` is our own direction of the video media
    pub(crate) fn new(direction: Direction, params: BandwidthParams) -> Self {
        let local = direction.receives().then(|| {
            RembLocal::new(
                params.local_video_ssrc,
                params.remote_video_ssrc,
                params.remb_interval,
                params.max_recv_kbps,
            )
        });

        let remote = direction.sends().then(|| {
            RembRemote::new(
                params.local_video_ssrc,
                params.min_send_kbps,
                params.max_send_kbps,
            )
        });

        log::debug!(
            "created bandwidth controller, estimating receive bandwidth: {}, applying peer estimates: {}",
            local.is_some(),
            remote.is_some()
        );

        Self { local, remote }
    }

    /// Returns which roles are active: (receive side estimator, send side manager)
    pub(crate) fn roles(&self) -> (bool, bool) {
        (self.local.is_some(), self.remote.is_some())
    }

    pub(crate) fn on_video_rtp(&mut self, now: Instant, seq: u16, len: usize) {
        if let Some(local) = &mut self.local {
            local.on_rtp(now, seq, len);
        }
    }

    pub(crate) fn on_remb(&mut self, remb: &Remb) -> Option<u64> {
        self.remote.as_mut()?.on_remb(remb)
    }

    pub(crate) fn set_send_bounds(&mut self, min_kbps: u32, max_kbps: u32) -> Option<u64> {
        self.remote.as_mut()?.set_bounds(min_kbps, max_kbps)
    }

    pub(crate) fn set_max_recv_bandwidth(&mut self, max_recv_kbps: u32) {
        if let Some(local) = &mut self.local {
            local.set_max_recv_bandwidth(max_recv_kbps);
        }
    }

    pub(crate) fn timeout(&self, now: Instant) -> Option<Duration> {
        self.local.as_ref()?.timeout(now)
    }

    pub(crate) fn poll(&mut self, now: Instant) -> Option<Remb> {
        self.local.as_mut()?.poll(now)
    }
}
