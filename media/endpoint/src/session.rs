//! Per media RTP session state

use crate::media_kind::MediaKind;
use std::fmt;
use std::time::{Duration, Instant};

/// RTP synchronization source identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ssrc(pub u32);

impl Ssrc {
    /// Random non-zero SSRC, 0 is reserved as "unset" in the SDP & REMB paths
    pub(crate) fn random() -> Self {
        loop {
            let ssrc: u32 = rand::random();

            if ssrc != 0 {
                return Ssrc(ssrc);
            }
        }
    }
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of a session-end or timeout for an SSRC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoppedSource {
    /// The active remote source stopped
    Remote,
    /// Our own sending source stopped
    Local,
}

#[derive(Debug)]
struct ActiveSource {
    ssrc: Ssrc,
    last_activity: Instant,
    /// Media start was signaled for this source
    announced: bool,
}

/// One of the two RTP sessions (audio or video) of an endpoint.
///
/// Created lazily on first reference and never recreated.
#[derive(Debug)]
pub(crate) struct RtpSession {
    kind: MediaKind,
    local_ssrc: Ssrc,

    /// SSRC the peer announced in the negotiated SDP
    remote_ssrc: Option<Ssrc>,

    /// First remote source seen sending on this session
    active: Option<ActiveSource>,
}

impl RtpSession {
    pub(crate) fn new(kind: MediaKind, local_ssrc: Ssrc) -> Self {
        log::debug!("creating {kind} RTP session with local ssrc {local_ssrc}");

        Self {
            kind,
            local_ssrc,
            remote_ssrc: None,
            active: None,
        }
    }

    pub(crate) fn local_ssrc(&self) -> Ssrc {
        self.local_ssrc
    }

    pub(crate) fn remote_ssrc(&self) -> Option<Ssrc> {
        self.remote_ssrc
    }

    pub(crate) fn set_remote_ssrc(&mut self, ssrc: Option<Ssrc>) {
        if let Some(previous) = self.remote_ssrc.filter(|previous| Some(*previous) != ssrc) {
            log::warn!(
                "Overwriting remote {} ssrc {previous} with {ssrc:?}, only one stream per media is supported",
                self.kind
            );
        }

        self.remote_ssrc = ssrc;
    }

    pub(crate) fn active_ssrc(&self) -> Option<Ssrc> {
        self.active.as_ref().map(|active| active.ssrc)
    }

    /// Register activity of `ssrc`, the first remote source seen becomes the active one.
    ///
    /// Returns true if `ssrc` just became active.
    pub(crate) fn on_ssrc_activity(&mut self, now: Instant, ssrc: Ssrc) -> bool {
        if ssrc == self.local_ssrc {
            return false;
        }

        match &mut self.active {
            Some(active) if active.ssrc == ssrc => {
                active.last_activity = now;
                false
            }
            Some(_) => false,
            None => {
                log::debug!("{} session: new active ssrc {ssrc}", self.kind);

                self.active = Some(ActiveSource {
                    ssrc,
                    last_activity: now,
                    announced: false,
                });

                true
            }
        }
    }

    /// Source description of `ssrc` received, returns true the first time this happens for the active source
    pub(crate) fn on_ssrc_sdes(&mut self, ssrc: Ssrc) -> bool {
        match &mut self.active {
            Some(active) if active.ssrc == ssrc && !active.announced => {
                active.announced = true;
                true
            }
            _ => false,
        }
    }

    /// Handle the end (BYE or timeout) of `ssrc`
    pub(crate) fn on_ssrc_stopped(&mut self, ssrc: Ssrc) -> Option<StoppedSource> {
        if self.active_ssrc() == Some(ssrc) {
            self.active = None;
            Some(StoppedSource::Remote)
        } else if ssrc == self.local_ssrc {
            Some(StoppedSource::Local)
        } else {
            None
        }
    }

    pub(crate) fn take_active(&mut self) -> Option<Ssrc> {
        self.active.take().map(|active| active.ssrc)
    }

    /// Instant at which the active source is considered gone without further activity.
    ///
    /// None if there is no active source or the timeout is too large to ever expire.
    pub(crate) fn inactivity_deadline(&self, timeout: Duration) -> Option<Instant> {
        self.active
            .as_ref()
            .and_then(|active| active.last_activity.checked_add(timeout))
    }
}
