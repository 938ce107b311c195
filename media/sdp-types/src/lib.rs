//! SDP model used by the RTP endpoint.
//!
//! Only the fields and attributes that take part in transport negotiation are typed,
//! everything else is carried through as [`UnknownAttribute`].

use nom::character::complete::{char, space0, u32};
use nom::error::VerboseError;
use nom::sequence::preceded;

mod attributes;
mod fields;
mod media;
mod media_description;
mod session_description;
mod tagged_address;

pub use attributes::{
    Direction, Group, Rtcp, RtcpFeedback, RtcpFeedbackKind, RtcpFeedbackPt, RtpMap,
    SourceAttribute, Ssrc, UnknownAttribute,
};
pub use fields::{Bandwidth, Connection, Origin, Time};
pub use media::{Media, MediaType, TransportProtocol};
pub use media_description::MediaDescription;
pub use session_description::{ParseSessionDescriptionError, SessionDescription};
pub use tagged_address::TaggedAddress;

pub(crate) type IResult<'i, O> = nom::IResult<&'i str, O, VerboseError<&'i str>>;

/// Skip optional leading spaces before running `parser`
pub(crate) fn ws<'i, O>(
    parser: impl FnMut(&'i str) -> IResult<'i, O>,
) -> impl FnMut(&'i str) -> IResult<'i, O> {
    preceded(space0, parser)
}

pub(crate) fn slash_num(i: &str) -> IResult<'_, u32> {
    preceded(char('/'), u32)(i)
}

pub(crate) fn not_whitespace(c: char) -> bool {
    !c.is_ascii_whitespace()
}
