use crate::{
    Bandwidth, Connection, Direction, Media, Rtcp, RtcpFeedback, RtpMap, Ssrc, UnknownAttribute,
};
use bytesstr::BytesStr;
use std::fmt;

/// Media section of a [`SessionDescription`](crate::SessionDescription), starting at a `m=` line
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.14)
#[derive(Debug, Clone)]
pub struct MediaDescription {
    pub media: Media,
    pub connection: Option<Connection>,
    pub bandwidth: Vec<Bandwidth>,
    pub direction: Direction,
    pub rtcp: Option<Rtcp>,
    pub rtcp_mux: bool,
    /// Media identification (`a=mid`)
    pub mid: Option<BytesStr>,
    pub rtpmap: Vec<RtpMap>,
    pub rtcp_fb: Vec<RtcpFeedback>,
    pub ssrc: Vec<Ssrc>,
    pub attributes: Vec<UnknownAttribute>,
}

impl MediaDescription {
    pub fn new(media: Media) -> Self {
        Self {
            media,
            connection: None,
            bandwidth: vec![],
            direction: Direction::default(),
            rtcp: None,
            rtcp_mux: false,
            mid: None,
            rtpmap: vec![],
            rtcp_fb: vec![],
            ssrc: vec![],
            attributes: vec![],
        }
    }

    /// Find the rtpmap describing the given payload type
    pub fn rtpmap_for(&self, pt: u8) -> Option<&RtpMap> {
        self.rtpmap.iter().find(|rtpmap| rtpmap.payload == pt)
    }

    /// Formats of this media which have an rtpmap, in the order of the media field
    pub fn mapped_formats(&self) -> impl Iterator<Item = &RtpMap> + '_ {
        self.media
            .fmts
            .iter()
            .filter_map(|&pt| self.rtpmap_for(pt))
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\r\n", self.media)?;

        if let Some(connection) = &self.connection {
            write!(f, "{connection}\r\n")?;
        }

        for bandwidth in &self.bandwidth {
            write!(f, "{bandwidth}\r\n")?;
        }

        write!(f, "a={}\r\n", self.direction)?;

        if let Some(mid) = &self.mid {
            write!(f, "a=mid:{mid}\r\n")?;
        }

        if let Some(rtcp) = &self.rtcp {
            write!(f, "a=rtcp:{rtcp}\r\n")?;
        }

        if self.rtcp_mux {
            f.write_str("a=rtcp-mux\r\n")?;
        }

        for rtpmap in &self.rtpmap {
            write!(f, "a=rtpmap:{rtpmap}\r\n")?;
        }

        for rtcp_fb in &self.rtcp_fb {
            write!(f, "a=rtcp-fb:{rtcp_fb}\r\n")?;
        }

        for ssrc in &self.ssrc {
            write!(f, "a=ssrc:{ssrc}\r\n")?;
        }

        for attribute in &self.attributes {
            write!(f, "{attribute}\r\n")?;
        }

        Ok(())
    }
}
