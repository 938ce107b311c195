//! Session level fields (`o=`, `t=`, `c=`, `b=`)

use crate::{IResult, TaggedAddress, not_whitespace, slash_num, ws};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{u32, u64};
use nom::combinator::{map, opt};
use nom::error::context;
use nom::sequence::{separated_pair, tuple};
use std::fmt;

/// Origin field (`o=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.2)
#[derive(Debug, Clone)]
pub struct Origin {
    pub username: BytesStr,
    pub session_id: BytesStr,
    /// Incremented with each renegotiation
    pub session_version: BytesStr,
    pub address: TaggedAddress,
}

impl Origin {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing origin field",
            map(
                tuple((
                    ws(take_while1(not_whitespace)),
                    ws(take_while1(not_whitespace)),
                    ws(take_while1(not_whitespace)),
                    ws(TaggedAddress::parse(src)),
                )),
                |(username, session_id, session_version, address)| Origin {
                    username: BytesStr::from_parse(src, username),
                    session_id: BytesStr::from_parse(src, session_id),
                    session_version: BytesStr::from_parse(src, session_version),
                    address,
                },
            ),
        )(i)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "o={} {} {} {}",
            self.username, self.session_id, self.session_version, self.address
        )
    }
}

/// Time field (`t=`), both values are NTP seconds, `0 0` means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    pub start: u64,
    pub stop: u64,
}

impl Time {
    pub fn parse(i: &str) -> IResult<'_, Self> {
        context(
            "parsing time field",
            map(tuple((ws(u64), ws(u64))), |(start, stop)| Time {
                start,
                stop,
            }),
        )(i)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "t={} {}", self.start, self.stop)
    }
}

/// Connection field (`c=`)
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.7)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub address: TaggedAddress,

    /// Multicast TTL (IPv4 only)
    pub ttl: Option<u32>,
}

impl Connection {
    pub fn new(address: TaggedAddress) -> Self {
        Self { address, ttl: None }
    }

    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing connection field",
            map(
                tuple((TaggedAddress::parse(src), opt(slash_num))),
                |(address, ttl)| Connection { address, ttl },
            ),
        )(i)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "c={}", self.address)?;

        if let Some(ttl) = self.ttl {
            write!(f, "/{ttl}")?;
        }

        Ok(())
    }
}

/// Bandwidth field (`b=<type>:<kbps>`)
#[derive(Debug, Clone)]
pub struct Bandwidth {
    pub typ: BytesStr,
    pub bandwidth: u32,
}

impl Bandwidth {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing bandwidth field",
            map(
                separated_pair(take_while1(|c: char| c != ':'), tag(":"), u32),
                |(typ, bandwidth)| Bandwidth {
                    typ: BytesStr::from_parse(src, typ),
                    bandwidth,
                },
            ),
        )(i)
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "b={}:{}", self.typ, self.bandwidth)
    }
}
