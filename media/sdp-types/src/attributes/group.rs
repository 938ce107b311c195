use crate::{IResult, not_whitespace};
use bytes::Bytes;
use bytesstr::BytesStr;
use nom::bytes::complete::take_while1;
use nom::character::complete::space1;
use nom::combinator::map;
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{preceded, tuple};
use std::fmt;

/// Media grouping attribute (`a=group:<semantics> <mid>*`)
///
/// Session level attribute. A group without any identification tags is accepted.
///
/// [RFC5888](https://www.rfc-editor.org/rfc/rfc5888.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub typ: BytesStr,
    pub mids: Vec<BytesStr>,
}

impl Group {
    pub fn parse<'i>(src: &Bytes, i: &'i str) -> IResult<'i, Self> {
        context(
            "parsing group attribute",
            map(
                tuple((
                    take_while1(not_whitespace),
                    many0(preceded(space1, take_while1(not_whitespace))),
                )),
                |(typ, mids): (&str, Vec<&str>)| Group {
                    typ: BytesStr::from_parse(src, typ),
                    mids: mids
                        .into_iter()
                        .map(|mid| BytesStr::from_parse(src, mid))
                        .collect(),
                },
            ),
        )(i)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.typ)?;

        for mid in &self.mids {
            write!(f, " {mid}")?;
        }

        Ok(())
    }
}
