use crate::{IResult, slash_num};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::character::complete::{space1, u8};
use nom::combinator::{map, opt, rest};
use nom::error::context;
use nom::sequence::{preceded, tuple};
use std::fmt;

/// Maps a payload type to an encoding (`a=rtpmap:<pt> <encoding>/<clock-rate>[/<params>]`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-6.6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpMap {
    pub payload: u8,
    pub encoding: BytesStr,
    pub clock_rate: u32,
    /// Encoding parameters, e.g. the channel count for audio
    pub params: Option<BytesStr>,
}

impl RtpMap {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing rtpmap attribute",
            map(
                tuple((
                    u8,
                    preceded(space1, take_while1(|c: char| c != '/')),
                    slash_num,
                    opt(preceded(nom::character::complete::char('/'), rest)),
                )),
                |(payload, encoding, clock_rate, params)| RtpMap {
                    payload,
                    encoding: BytesStr::from_parse(src, encoding),
                    clock_rate,
                    params: params.map(|params| BytesStr::from_parse(src, params)),
                },
            ),
        )(i)
    }
}

impl fmt::Display for RtpMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}/{}", self.payload, self.encoding, self.clock_rate)?;

        if let Some(params) = &self.params {
            write!(f, "/{params}")?;
        }

        Ok(())
    }
}
