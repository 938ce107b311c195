use crate::{IResult, not_whitespace, slash_num, ws};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::character::complete::{space1, u8, u16};
use nom::combinator::{map, opt};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{preceded, tuple};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    Video,
    Text,
    App,
    Other(BytesStr),
}

impl MediaType {
    fn from_token(src: &Bytes, token: &str) -> Self {
        match token {
            "audio" => MediaType::Audio,
            "video" => MediaType::Video,
            "text" => MediaType::Text,
            "application" => MediaType::App,
            other => MediaType::Other(BytesStr::from_parse(src, other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Text => "text",
            MediaType::App => "application",
            MediaType::Other(other) => &**other,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport protocol token of the media field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportProtocol {
    /// `RTP/AVP`
    RtpAvp,
    /// `RTP/AVPF`, RTP with RTCP based feedback
    RtpAvpf,
    /// `RTP/SAVP`
    RtpSavp,
    /// `RTP/SAVPF`
    RtpSavpf,
    /// `UDP/TLS/RTP/SAVP`
    UdpTlsRtpSavp,
    /// `UDP/TLS/RTP/SAVPF`
    UdpTlsRtpSavpf,
    Other(BytesStr),
}

impl TransportProtocol {
    fn from_token(src: &Bytes, token: &str) -> Self {
        match token {
            "RTP/AVP" => TransportProtocol::RtpAvp,
            "RTP/AVPF" => TransportProtocol::RtpAvpf,
            "RTP/SAVP" => TransportProtocol::RtpSavp,
            "RTP/SAVPF" => TransportProtocol::RtpSavpf,
            "UDP/TLS/RTP/SAVP" => TransportProtocol::UdpTlsRtpSavp,
            "UDP/TLS/RTP/SAVPF" => TransportProtocol::UdpTlsRtpSavpf,
            other => TransportProtocol::Other(BytesStr::from_parse(src, other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransportProtocol::RtpAvp => "RTP/AVP",
            TransportProtocol::RtpAvpf => "RTP/AVPF",
            TransportProtocol::RtpSavp => "RTP/SAVP",
            TransportProtocol::RtpSavpf => "RTP/SAVPF",
            TransportProtocol::UdpTlsRtpSavp => "UDP/TLS/RTP/SAVP",
            TransportProtocol::UdpTlsRtpSavpf => "UDP/TLS/RTP/SAVPF",
            TransportProtocol::Other(other) => &**other,
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media field (`m=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.14)
#[derive(Debug, Clone)]
pub struct Media {
    pub media_type: MediaType,
    pub port: u16,
    pub ports_num: Option<u32>,
    pub proto: TransportProtocol,
    /// Payload types in order of preference
    pub fmts: Vec<u8>,
}

impl Media {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing media field",
            map(
                tuple((
                    take_while1(not_whitespace),
                    ws(u16),
                    opt(slash_num),
                    ws(take_while1(not_whitespace)),
                    many0(preceded(space1, u8)),
                )),
                |(media_type, port, ports_num, proto, fmts)| Media {
                    media_type: MediaType::from_token(src, media_type),
                    port,
                    ports_num,
                    proto: TransportProtocol::from_token(src, proto),
                    fmts,
                },
            ),
        )(i)
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m={} {}", self.media_type, self.port)?;

        if let Some(ports_num) = self.ports_num {
            write!(f, "/{ports_num}")?;
        }

        write!(f, " {}", self.proto)?;

        for fmt in &self.fmts {
            write!(f, " {fmt}")?;
        }

        Ok(())
    }
}
