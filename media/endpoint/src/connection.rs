//! Interfaces to the transport connections the endpoint wires its RTP sessions to.

use std::fmt;
use std::sync::Arc;

/// Named endpoint of a media element a link can be made to/from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pad {
    pub element: String,
    pub name: String,
}

impl Pad {
    pub fn new(element: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.element, self.name)
    }
}

/// Directed link made by the endpoint, data flows from `src` to `sink`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PadLink {
    pub src: Pad,
    pub sink: Pad,
}

impl fmt::Display for PadLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.sink)
    }
}

/// A single transport (e.g. a UDP socket pair) carrying RTP & RTCP
pub trait RtpConnection: Send + Sync {
    /// Attach the connection to the active transport.
    ///
    /// `local_offer` is true if this side made the SDP offer.
    fn add(&self, local_offer: bool);

    /// Pad to send RTP into
    fn request_rtp_sink(&self) -> Pad;

    /// Pad received RTP comes out of
    fn request_rtp_src(&self) -> Pad;

    /// Pad to send RTCP into
    fn request_rtcp_sink(&self) -> Pad;

    /// Pad received RTCP comes out of
    fn request_rtcp_src(&self) -> Pad;
}

/// Factory & lookup of [`RtpConnection`]s by stream name (`audio`, `video` or `bundle`)
pub trait ConnectionRegistry: Send + Sync {
    fn create_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>>;

    fn create_bundle_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>>;

    fn get_connection(&self, name: &str) -> Option<Arc<dyn RtpConnection>>;
}
