use crate::IResult;
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::combinator::map;
use nom::error::context;
use nom::sequence::preceded;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Network address prefixed by its network & address type (`IN IP4 ...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaggedAddress {
    IP4(Ipv4Addr),
    IP4FQDN(BytesStr),
    IP6(Ipv6Addr),
    IP6FQDN(BytesStr),
}

impl TaggedAddress {
    /// The unspecified address of the requested family (`0.0.0.0` or `::`)
    pub fn unspecified(ipv6: bool) -> Self {
        if ipv6 {
            TaggedAddress::IP6(Ipv6Addr::UNSPECIFIED)
        } else {
            TaggedAddress::IP4(Ipv4Addr::UNSPECIFIED)
        }
    }

    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<'_, Self> + '_ {
        move |i| {
            context(
                "parsing tagged address",
                alt((
                    preceded(
                        tag("IN IP4 "),
                        map(take_while1(is_host_char), |host: &str| {
                            match host.parse() {
                                Ok(ip) => TaggedAddress::IP4(ip),
                                Err(_) => TaggedAddress::IP4FQDN(BytesStr::from_parse(src, host)),
                            }
                        }),
                    ),
                    preceded(
                        tag("IN IP6 "),
                        map(
                            take_while1(|c: char| is_host_char(c) || c == ':'),
                            |host: &str| match host.parse() {
                                Ok(ip) => TaggedAddress::IP6(ip),
                                Err(_) => TaggedAddress::IP6FQDN(BytesStr::from_parse(src, host)),
                            },
                        ),
                    ),
                )),
            )(i)
        }
    }
}

impl From<IpAddr> for TaggedAddress {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(ip) => TaggedAddress::IP4(ip),
            IpAddr::V6(ip) => TaggedAddress::IP6(ip),
        }
    }
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
}

impl fmt::Display for TaggedAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaggedAddress::IP4(ip) => write!(f, "IN IP4 {ip}"),
            TaggedAddress::IP4FQDN(host) => write!(f, "IN IP4 {host}"),
            TaggedAddress::IP6(ip) => write!(f, "IN IP6 {ip}"),
            TaggedAddress::IP6FQDN(host) => write!(f, "IN IP6 {host}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ip4() {
        let input = BytesStr::from_static("IN IP4 10.0.0.1");

        let (rem, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(addr, TaggedAddress::IP4(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn ip6_unspecified() {
        let input = BytesStr::from_static("IN IP6 ::");

        let (rem, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        assert!(rem.is_empty());
        assert_eq!(addr, TaggedAddress::unspecified(true));
        assert_eq!(addr.to_string(), "IN IP6 ::");
    }

    #[test]
    fn fqdn() {
        let input = BytesStr::from_static("IN IP4 media.example.org");

        let (_, addr) = TaggedAddress::parse(input.as_ref())(&input).unwrap();

        match addr {
            TaggedAddress::IP4FQDN(host) => assert_eq!(host, "media.example.org"),
            other => panic!("{other:?}"),
        }
    }
}
