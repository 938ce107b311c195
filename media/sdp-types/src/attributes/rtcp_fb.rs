use crate::IResult;
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::branch::alt;
use nom::character::complete::{char, u8};
use nom::combinator::{map, rest};
use nom::error::context;
use nom::sequence::separated_pair;
use std::fmt;

/// RTCP feedback capability attribute (`a=rtcp-fb:<pt> <val>`)
///
/// The feedback value is matched in its exact textual form, any other spelling
/// (different case, additional whitespace) ends up as [`RtcpFeedbackKind::Other`].
///
/// [RFC4585](https://www.rfc-editor.org/rfc/rfc4585.html#section-4.2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpFeedback {
    pub pt: RtcpFeedbackPt,
    pub kind: RtcpFeedbackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcpFeedbackPt {
    Pt(u8),
    /// `*`
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtcpFeedbackKind {
    /// `nack`
    Nack,
    /// `nack pli`
    NackPli,
    /// `ccm fir`
    CcmFir,
    /// `goog-remb`
    GoogRemb,
    Other(BytesStr),
}

impl RtcpFeedbackKind {
    fn from_value(src: &Bytes, value: &str) -> Self {
        match value {
            "nack" => RtcpFeedbackKind::Nack,
            "nack pli" => RtcpFeedbackKind::NackPli,
            "ccm fir" => RtcpFeedbackKind::CcmFir,
            "goog-remb" => RtcpFeedbackKind::GoogRemb,
            other => RtcpFeedbackKind::Other(BytesStr::from_parse(src, other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RtcpFeedbackKind::Nack => "nack",
            RtcpFeedbackKind::NackPli => "nack pli",
            RtcpFeedbackKind::CcmFir => "ccm fir",
            RtcpFeedbackKind::GoogRemb => "goog-remb",
            RtcpFeedbackKind::Other(other) => &**other,
        }
    }
}

impl RtcpFeedback {
    pub fn new(pt: u8, kind: RtcpFeedbackKind) -> Self {
        Self {
            pt: RtcpFeedbackPt::Pt(pt),
            kind,
        }
    }

    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing rtcp-fb attribute",
            map(
                separated_pair(
                    alt((
                        map(char('*'), |_| RtcpFeedbackPt::Any),
                        map(u8, RtcpFeedbackPt::Pt),
                    )),
                    char(' '),
                    rest,
                ),
                |(pt, value)| RtcpFeedback {
                    pt,
                    kind: RtcpFeedbackKind::from_value(src, value),
                },
            ),
        )(i)
    }

    /// Returns if this is exactly `<pt> <kind>`
    pub fn is(&self, pt: u8, kind: &RtcpFeedbackKind) -> bool {
        self.pt == RtcpFeedbackPt::Pt(pt) && self.kind == *kind
    }
}

impl fmt::Display for RtcpFeedback {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.pt {
            RtcpFeedbackPt::Pt(pt) => write!(f, "{pt} {}", self.kind.as_str()),
            RtcpFeedbackPt::Any => write!(f, "* {}", self.kind.as_str()),
        }
    }
}
