use super::Remb;
use crate::config::max_bound;
use crate::session::Ssrc;

/// Changes of the send bitrate within this fraction are not reported
const ESTIMATE_TOLERANCE: f64 = 0.05;

/// Send side manager, applies REMB reports of the peer to the bitrate of the video we send
#[derive(Debug)]
pub(crate) struct RembRemote {
    local_ssrc: Ssrc,
    /// Bounds in bps
    min_bitrate: u64,
    max_bitrate: u64,

    /// Latest estimate of the peer, unclamped
    remote_estimate: Option<u64>,
    last_emitted: Option<u64>,
}

impl RembRemote {
    pub(crate) fn new(local_ssrc: Ssrc, min_kbps: u32, max_kbps: u32) -> Self {
        Self {
            local_ssrc,
            min_bitrate: u64::from(min_kbps) * 1000,
            max_bitrate: u64::from(max_bound(max_kbps)) * 1000,
            remote_estimate: None,
            last_emitted: None,
        }
    }

    /// Returns the new send bitrate if it changed noticeably
    pub(crate) fn on_remb(&mut self, remb: &Remb) -> Option<u64> {
        if !remb.ssrcs.is_empty() && !remb.ssrcs.contains(&self.local_ssrc.0) {
            log::trace!(
                "ignoring REMB for {:?}, not sending with any of them",
                remb.ssrcs
            );
            return None;
        }

        self.remote_estimate = Some(remb.bitrate);
        self.update()
    }

    pub(crate) fn set_bounds(&mut self, min_kbps: u32, max_kbps: u32) -> Option<u64> {
        self.min_bitrate = u64::from(min_kbps) * 1000;
        self.max_bitrate = u64::from(max_bound(max_kbps)) * 1000;
        self.update()
    }

    fn update(&mut self) -> Option<u64> {
        let estimate = self.remote_estimate?;
        let bitrate = estimate.clamp(self.min_bitrate, self.max_bitrate.max(self.min_bitrate));

        if let Some(last) = self.last_emitted {
            let last = last as f64;
            let within = (last * (1.0 - ESTIMATE_TOLERANCE)..=last * (1.0 + ESTIMATE_TOLERANCE))
                .contains(&(bitrate as f64));

            if within {
                return None;
            }
        }

        log::debug!("video send bitrate now {bitrate} bps (peer estimate: {estimate} bps)");

        self.last_emitted = Some(bitrate);
        Some(bitrate)
    }
}
