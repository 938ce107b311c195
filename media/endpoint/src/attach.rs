//! Attachment of the external media pipeline (payloaders, depayloaders & jitter buffers)

use crate::connection::Pad;
use crate::media_kind::MediaKind;
use bytesstr::BytesStr;
use sdp_types::{MediaDescription, RtcpFeedbackKind};
use std::time::Duration;

/// Latency of the receive side jitter buffers
pub(crate) const JITTER_BUFFER_LATENCY: Duration = Duration::from_millis(1500);

/// Description of a negotiated payload type, handed to the [`MediaAttachment`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFormat {
    /// Media the payload type was negotiated for, `None` if it wasn't found in the negotiated SDP
    pub media: Option<MediaKind>,
    pub pt: u8,
    pub clock_rate: Option<u32>,
    pub encoding: Option<BytesStr>,
    /// The peer may request key frames using FIR
    pub rtcp_fb_ccm_fir: bool,
    /// The peer may request key frames using PLI
    pub rtcp_fb_nack_pli: bool,
}

impl PayloadFormat {
    /// Describe payload type `pt` of a negotiated media section
    pub(crate) fn from_media(desc: &MediaDescription, pt: u8) -> Self {
        let media = MediaKind::from_media_type(&desc.media.media_type);
        let rtpmap = desc.rtpmap_for(pt);
        let video = media == Some(MediaKind::Video);

        Self {
            media,
            pt,
            clock_rate: rtpmap.map(|rtpmap| rtpmap.clock_rate),
            encoding: rtpmap.map(|rtpmap| rtpmap.encoding.clone()),
            rtcp_fb_ccm_fir: video
                && desc.rtcp_fb.iter().any(|fb| fb.is(pt, &RtcpFeedbackKind::CcmFir)),
            rtcp_fb_nack_pli: video
                && desc.rtcp_fb.iter().any(|fb| fb.is(pt, &RtcpFeedbackKind::NackPli)),
        }
    }

    /// Format used when a payload type is unknown
    pub(crate) fn unknown(pt: u8) -> Self {
        Self {
            media: None,
            pt,
            clock_rate: None,
            encoding: None,
            rtcp_fb_ccm_fir: false,
            rtcp_fb_nack_pli: false,
        }
    }
}

/// The media pipeline the RTP sessions exchange media with
pub trait MediaAttachment: Send + Sync {
    /// Create a payloader for media sent in `format`.
    ///
    /// Returns the pad the payloaded RTP comes out of, or `None` if the format isn't supported.
    fn payloader_for(&self, format: &PayloadFormat) -> Option<Pad>;

    /// Create a depayloader for media received in `format`.
    ///
    /// Returns the pad received RTP must be linked to, or `None` if the format isn't supported.
    fn depayloader_for(&self, format: &PayloadFormat) -> Option<Pad>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterBufferMode {
    /// Timestamps are synchronized to the sender's clock using RTCP sender reports
    Synced,
}

/// Settings of the jitter buffer created for an incoming SSRC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JitterBufferConfig {
    pub mode: JitterBufferMode,
    pub latency: Duration,
    /// Emit events for lost packets
    pub do_lost: bool,
    /// Request retransmissions of lost packets using NACK
    pub do_retransmission: bool,
}
