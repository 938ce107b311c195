use crate::config::EndpointConfig;
use sdp_types::{MediaType, RtcpFeedbackKind, SessionDescription};

/// Transport features agreed on with the peer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NegotiatedFlags {
    pub bundle: bool,
    pub rtcp_mux: bool,
    pub fir: bool,
    pub nack: bool,
    pub pli: bool,
    pub remb: bool,
}

impl NegotiatedFlags {
    pub(crate) fn from_config(config: &EndpointConfig) -> Self {
        Self {
            bundle: config.bundle,
            rtcp_mux: config.rtcp_mux,
            fir: config.rtcp_fir,
            nack: config.rtcp_nack,
            pli: config.rtcp_pli,
            remb: config.rtcp_remb,
        }
    }

    /// Derive all flags from a remote offer.
    ///
    /// Feedback flags are only taken from the first video format encoded with `video_encoding`.
    pub fn from_offer(offer: &SessionDescription, video_encoding: &str) -> Self {
        let mut flags = Self {
            bundle: is_bundle(offer),
            rtcp_mux: is_rtcp_mux(offer),
            ..Self::default()
        };

        flags.read_feedback(offer, video_encoding);
        flags
    }

    /// RTCP shares the RTP connection, bundling always multiplexes
    pub fn uses_rtcp_mux(&self) -> bool {
        self.bundle || self.rtcp_mux
    }

    fn read_feedback(&mut self, offer: &SessionDescription, video_encoding: &str) {
        let video = offer
            .media_descriptions
            .iter()
            .filter(|desc| desc.media.media_type == MediaType::Video);

        for desc in video {
            for &pt in &desc.media.fmts {
                let matches = desc
                    .rtpmap_for(pt)
                    .is_some_and(|rtpmap| rtpmap.encoding.eq_ignore_ascii_case(video_encoding));

                if !matches {
                    continue;
                }

                let has = |kind: RtcpFeedbackKind| desc.rtcp_fb.iter().any(|fb| fb.is(pt, &kind));

                self.fir = has(RtcpFeedbackKind::CcmFir);
                self.nack = has(RtcpFeedbackKind::Nack);
                self.pli = has(RtcpFeedbackKind::NackPli);
                self.remb = has(RtcpFeedbackKind::GoogRemb);

                return;
            }
        }
    }
}

/// The first BUNDLE group decides, it must name at least one media
pub(crate) fn is_bundle(sdp: &SessionDescription) -> bool {
    sdp.group
        .iter()
        .find(|group| &*group.typ == "BUNDLE")
        .is_some_and(|group| !group.mids.is_empty())
}

/// All media sections must carry `a=rtcp-mux`
pub(crate) fn is_rtcp_mux(sdp: &SessionDescription) -> bool {
    sdp.media_descriptions.iter().all(|desc| desc.rtcp_mux)
}
