use crate::{IResult, TaggedAddress, ws};
use bytes::Bytes;
use nom::character::complete::u16;
use nom::combinator::{map, opt};
use nom::error::context;
use nom::sequence::tuple;
use std::fmt;

/// Explicit RTCP port & address (`a=rtcp:<port> [<address>]`)
///
/// [RFC3605](https://www.rfc-editor.org/rfc/rfc3605.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rtcp {
    pub port: u16,
    pub address: Option<TaggedAddress>,
}

impl Rtcp {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing rtcp attribute",
            map(
                tuple((u16, opt(ws(TaggedAddress::parse(src))))),
                |(port, address)| Rtcp { port, address },
            ),
        )(i)
    }
}

impl fmt::Display for Rtcp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.port)?;

        if let Some(address) = &self.address {
            write!(f, " {address}")?;
        }

        Ok(())
    }
}
