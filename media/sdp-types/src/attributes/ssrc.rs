use crate::{IResult, not_whitespace};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, space1, u32};
use nom::combinator::{map, opt, rest};
use nom::error::context;
use nom::sequence::{preceded, separated_pair, tuple};
use std::fmt;

/// Source specific attribute (`a=ssrc:<ssrc> <attribute>[:<value>]`)
///
/// [RFC5576](https://www.rfc-editor.org/rfc/rfc5576.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ssrc {
    pub ssrc: u32,
    pub attribute: SourceAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAttribute {
    CName(BytesStr),
    Other {
        name: BytesStr,
        value: Option<BytesStr>,
    },
}

impl Ssrc {
    pub fn cname(ssrc: u32, cname: impl Into<BytesStr>) -> Self {
        Self {
            ssrc,
            attribute: SourceAttribute::CName(cname.into()),
        }
    }

    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing ssrc attribute",
            map(
                separated_pair(
                    u32,
                    space1,
                    alt((
                        map(preceded(tag("cname:"), take_while1(not_whitespace)), |cname| {
                            SourceAttribute::CName(BytesStr::from_parse(src, cname))
                        }),
                        map(
                            tuple((
                                take_while1(|c: char| c != ':' && !c.is_ascii_whitespace()),
                                opt(preceded(char(':'), rest)),
                            )),
                            |(name, value)| SourceAttribute::Other {
                                name: BytesStr::from_parse(src, name),
                                value: value.map(|value| BytesStr::from_parse(src, value)),
                            },
                        ),
                    )),
                ),
                |(ssrc, attribute)| Ssrc { ssrc, attribute },
            ),
        )(i)
    }
}

impl fmt::Display for Ssrc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.attribute {
            SourceAttribute::CName(cname) => write!(f, "{} cname:{cname}", self.ssrc),
            SourceAttribute::Other {
                name,
                value: Some(value),
            } => write!(f, "{} {name}:{value}", self.ssrc),
            SourceAttribute::Other { name, value: None } => write!(f, "{} {name}", self.ssrc),
        }
    }
}
