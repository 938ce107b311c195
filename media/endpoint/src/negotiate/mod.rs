//! SDP side of the transport negotiation

use crate::media_kind::MediaKind;
use crate::session::Ssrc;
use bytesstr::BytesStr;
use sdp_types::{
    Connection, MediaDescription, Rtcp, RtcpFeedback, RtcpFeedbackKind, TaggedAddress,
    TransportProtocol,
};

mod flags;

pub use flags::NegotiatedFlags;

/// Errors from negotiating or finalizing the transport
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    #[error("media type {0} is not supported")]
    UnsupportedMedia(String),
    #[error("no connection available for {0}")]
    ConnectionUnavailable(&'static str),
    #[error("no usable payload format for {0} media")]
    FormatUnresolvable(MediaKind),
}

/// Values the transport lines of a media section are filled with
#[derive(Debug, Clone)]
pub(crate) struct TransportParams {
    pub(crate) proto: TransportProtocol,
    pub(crate) cname: BytesStr,
    pub(crate) use_ipv6: bool,
    pub(crate) video_encoding: String,
}

/// Rewrite the transport parts of a media section which is about to be sent.
///
/// Ports and addresses are placeholders, the connections fill in the real ones.
pub(crate) fn fill_media(
    desc: &mut MediaDescription,
    kind: MediaKind,
    local_ssrc: Ssrc,
    flags: &NegotiatedFlags,
    params: &TransportParams,
) {
    let address = TaggedAddress::unspecified(params.use_ipv6);

    desc.media.proto = params.proto.clone();
    desc.media.port = 1;
    desc.media.ports_num = None;
    desc.connection = Some(Connection::new(address.clone()));
    desc.rtcp = Some(Rtcp {
        port: 1,
        address: Some(address),
    });

    if flags.uses_rtcp_mux() {
        desc.rtcp_mux = true;
    }

    let ssrc = sdp_types::Ssrc::cname(local_ssrc.0, params.cname.clone());
    if !desc.ssrc.contains(&ssrc) {
        desc.ssrc.push(ssrc);
    }

    if kind == MediaKind::Video {
        add_rtcp_fb(desc, flags, &params.video_encoding);
    }
}

fn add_rtcp_fb(desc: &mut MediaDescription, flags: &NegotiatedFlags, video_encoding: &str) {
    let enabled = [
        (flags.fir, RtcpFeedbackKind::CcmFir),
        (flags.nack, RtcpFeedbackKind::Nack),
        (flags.pli, RtcpFeedbackKind::NackPli),
        (flags.remb, RtcpFeedbackKind::GoogRemb),
    ];

    let pts: Vec<u8> = desc
        .mapped_formats()
        .filter(|rtpmap| rtpmap.encoding.eq_ignore_ascii_case(video_encoding))
        .map(|rtpmap| rtpmap.payload)
        .collect();

    for pt in pts {
        for (_, kind) in enabled.iter().filter(|(enabled, _)| *enabled) {
            if desc.rtcp_fb.iter().any(|fb| fb.is(pt, kind)) {
                continue;
            }

            desc.rtcp_fb.push(RtcpFeedback::new(pt, kind.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdp_types::{Media, MediaType, RtpMap};

    fn params() -> TransportParams {
        TransportParams {
            proto: TransportProtocol::RtpSavpf,
            cname: BytesStr::from_static("user@host"),
            use_ipv6: false,
            video_encoding: "VP8".into(),
        }
    }

    fn video() -> MediaDescription {
        let mut desc = MediaDescription::new(Media {
            media_type: MediaType::Video,
            port: 5004,
            ports_num: None,
            proto: TransportProtocol::RtpAvp,
            fmts: vec![96, 97],
        });

        desc.rtpmap.push(RtpMap {
            payload: 96,
            encoding: BytesStr::from_static("VP8"),
            clock_rate: 90000,
            params: None,
        });
        desc.rtpmap.push(RtpMap {
            payload: 97,
            encoding: BytesStr::from_static("H264"),
            clock_rate: 90000,
            params: None,
        });

        desc
    }

    #[test]
    fn transport_lines() {
        let mut desc = video();
        let flags = NegotiatedFlags {
            bundle: true,
            ..Default::default()
        };

        fill_media(&mut desc, MediaKind::Video, Ssrc(1234), &flags, &params());

        assert_eq!(desc.media.port, 1);
        assert_eq!(desc.media.proto, TransportProtocol::RtpSavpf);
        assert_eq!(
            desc.connection.as_ref().map(|c| &c.address),
            Some(&TaggedAddress::unspecified(false))
        );
        assert_eq!(desc.rtcp.as_ref().map(|rtcp| rtcp.port), Some(1));
        assert!(desc.rtcp_mux);
        assert_eq!(desc.ssrc, vec![sdp_types::Ssrc::cname(1234, "user@host")]);
    }

    #[test]
    fn rtcp_fb_only_on_matching_encoding() {
        let mut desc = video();
        let flags = NegotiatedFlags {
            fir: true,
            pli: true,
            remb: true,
            ..Default::default()
        };

        fill_media(&mut desc, MediaKind::Video, Ssrc(1), &flags, &params());

        assert_eq!(
            desc.rtcp_fb,
            vec![
                RtcpFeedback::new(96, RtcpFeedbackKind::CcmFir),
                RtcpFeedback::new(96, RtcpFeedbackKind::NackPli),
                RtcpFeedback::new(96, RtcpFeedbackKind::GoogRemb),
            ]
        );
        assert!(!desc.rtcp_mux);
    }

    #[test]
    fn filling_twice_adds_no_duplicates() {
        let mut desc = video();
        let flags = NegotiatedFlags {
            nack: true,
            ..Default::default()
        };

        fill_media(&mut desc, MediaKind::Video, Ssrc(1234), &flags, &params());
        fill_media(&mut desc, MediaKind::Video, Ssrc(1234), &flags, &params());

        assert_eq!(desc.ssrc, vec![sdp_types::Ssrc::cname(1234, "user@host")]);
        assert_eq!(desc.rtcp_fb, vec![RtcpFeedback::new(96, RtcpFeedbackKind::Nack)]);
    }

    #[test]
    fn no_rtcp_fb_on_audio() {
        let mut desc = video();
        desc.media.media_type = MediaType::Audio;
        let flags = NegotiatedFlags {
            nack: true,
            ..Default::default()
        };

        fill_media(&mut desc, MediaKind::Audio, Ssrc(1), &flags, &params());

        assert!(desc.rtcp_fb.is_empty());
    }
}
