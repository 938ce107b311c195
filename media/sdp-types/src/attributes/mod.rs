use bytesstr::BytesStr;
use std::fmt;

mod direction;
mod group;
mod rtcp;
mod rtcp_fb;
mod rtpmap;
mod ssrc;

pub use direction::Direction;
pub use group::Group;
pub use rtcp::Rtcp;
pub use rtcp_fb::{RtcpFeedback, RtcpFeedbackKind, RtcpFeedbackPt};
pub use rtpmap::RtpMap;
pub use ssrc::{SourceAttribute, Ssrc};

/// Attribute that is not interpreted, kept to be written back unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAttribute {
    pub name: BytesStr,
    pub value: Option<BytesStr>,
}

impl fmt::Display for UnknownAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "a={}:{value}", self.name),
            None => write!(f, "a={}", self.name),
        }
    }
}
