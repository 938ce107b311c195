//! # SDP driven RTP endpoint
//!
//! Transport setup and bandwidth control for an audio/video endpoint speaking RTP/RTCP.
//!
//! [`RtpEndpoint`] is the top level type. It is driven by a SDP offer/answer collaborator:
//!
//! 1. [`RtpEndpoint::negotiate_transport`] derives the bundle, rtcp-mux & rtcp-fb agreements from the remote offer
//!    and fills the transport lines of the SDP that is about to be sent.
//! 2. [`RtpEndpoint::finalize_transport`] wires the per media RTP sessions to their connections once offer and answer
//!    are fixed.
//! 3. Received packets are handed to [`RtpEndpoint::receive_bundled`] or [`RtpEndpoint::receive`], which route them
//!    by SSRC and feed the REMB estimators.
//!
//! Like the rest of the media stack the endpoint does no IO itself. Timers are driven using
//! [`RtpEndpoint::timeout`] & [`RtpEndpoint::poll`], results are handed out as [`EndpointEvent`]s.
//!
//! Connections and the media pipeline are external and plugged in using the [`ConnectionRegistry`] and
//! [`MediaAttachment`] traits.

mod attach;
mod config;
mod connection;
mod endpoint;
mod media_kind;
mod negotiate;
mod packet_kind;
mod remb;
mod router;
mod rtcp;
mod session;
mod ssrc_hasher;

pub use attach::{JitterBufferConfig, JitterBufferMode, MediaAttachment, PayloadFormat};
pub use config::EndpointConfig;
pub use connection::{ConnectionRegistry, Pad, PadLink, RtpConnection};
pub use endpoint::{EndpointEvent, RtpEndpoint};
pub use media_kind::{BUNDLE_STREAM_NAME, MediaKind};
pub use negotiate::{NegotiatedFlags, NegotiationError};
pub use remb::{Remb, RembParseError};
pub use session::Ssrc;

fn opt_min<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (None, None) => None,
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (Some(a), Some(b)) => Some(std::cmp::min(a, b)),
    }
}
