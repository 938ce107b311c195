use crate::{
    Bandwidth, Connection, Direction, Group, Media, MediaDescription, Origin, Rtcp, RtcpFeedback,
    RtpMap, Ssrc, Time, UnknownAttribute,
};
use bytesstr::BytesStr;
use nom::Finish;
use nom::error::{VerboseError, VerboseErrorKind};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ParseSessionDescriptionError {
    #[error("{context} failed at {input:?}")]
    Malformed { context: &'static str, input: String },
    #[error("line {0:?} is incomplete")]
    Incomplete(String),
    #[error("message is missing the origin field (o=)")]
    MissingOrigin,
    #[error("message is missing the name field (s=)")]
    MissingName,
    #[error("message is missing the time field (t=)")]
    MissingTime,
}

impl From<VerboseError<&str>> for ParseSessionDescriptionError {
    fn from(error: VerboseError<&str>) -> Self {
        let context = error
            .errors
            .iter()
            .rev()
            .find_map(|(_, kind)| match kind {
                VerboseErrorKind::Context(context) => Some(*context),
                _ => None,
            })
            .unwrap_or("parsing line");

        let input = error
            .errors
            .first()
            .map(|(input, _)| input.to_string())
            .unwrap_or_default();

        Self::Malformed { context, input }
    }
}

/// SDP message, parse using [`SessionDescription::parse`] and write using its [`fmt::Display`] implementation.
#[derive(Debug, Clone)]
pub struct SessionDescription {
    pub origin: Origin,
    pub name: BytesStr,
    pub connection: Option<Connection>,
    pub bandwidth: Vec<Bandwidth>,
    pub time: Time,
    /// Session level direction, inherited by media descriptions while parsing
    pub direction: Direction,
    pub group: Vec<Group>,
    pub attributes: Vec<UnknownAttribute>,
    pub media_descriptions: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn parse(src: &BytesStr) -> Result<Self, ParseSessionDescriptionError> {
        let mut parser = Parser::default();

        for line in src.split(['\r', '\n']).filter(|line| !line.is_empty()) {
            parser.parse_line(src, line)?;
        }

        parser.finish()
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("v=0\r\n")?;
        write!(f, "{}\r\n", self.origin)?;
        write!(f, "s={}\r\n", self.name)?;

        if let Some(connection) = &self.connection {
            write!(f, "{connection}\r\n")?;
        }

        for bandwidth in &self.bandwidth {
            write!(f, "{bandwidth}\r\n")?;
        }

        write!(f, "{}\r\n", self.time)?;

        for group in &self.group {
            write!(f, "a=group:{group}\r\n")?;
        }

        for attribute in &self.attributes {
            write!(f, "{attribute}\r\n")?;
        }

        for media_description in &self.media_descriptions {
            write!(f, "{media_description}")?;
        }

        Ok(())
    }
}

#[derive(Default)]
struct Parser {
    origin: Option<Origin>,
    name: Option<BytesStr>,
    connection: Option<Connection>,
    bandwidth: Vec<Bandwidth>,
    time: Option<Time>,
    direction: Direction,
    group: Vec<Group>,
    attributes: Vec<UnknownAttribute>,
    media_descriptions: Vec<MediaDescription>,
}

impl Parser {
    fn parse_line(&mut self, src: &BytesStr, line: &str) -> Result<(), ParseSessionDescriptionError> {
        let (Some(field), Some(value)) = (line.get(..2), line.get(2..)) else {
            return Err(ParseSessionDescriptionError::Incomplete(line.into()));
        };

        match field {
            "v=" => {}
            "o=" => {
                let (_, origin) = Origin::parse(src.as_ref(), value).finish()?;
                self.origin = Some(origin);
            }
            "s=" => self.name = Some(src.slice_ref(value)),
            "t=" => {
                let (_, time) = Time::parse(value).finish()?;
                self.time = Some(time);
            }
            "c=" => {
                let (_, connection) = Connection::parse(src.as_ref(), value).finish()?;

                match self.media_descriptions.last_mut() {
                    Some(media_description) => media_description.connection = Some(connection),
                    None => self.connection = Some(connection),
                }
            }
            "b=" => {
                let (_, bandwidth) = Bandwidth::parse(src.as_ref(), value).finish()?;

                match self.media_descriptions.last_mut() {
                    Some(media_description) => media_description.bandwidth.push(bandwidth),
                    None => self.bandwidth.push(bandwidth),
                }
            }
            "m=" => {
                let (_, media) = Media::parse(src.as_ref(), value).finish()?;

                let mut media_description = MediaDescription::new(media);
                media_description.direction = self.direction;

                self.media_descriptions.push(media_description);
            }
            "a=" => self.parse_attribute(src, value)?,
            _ => {}
        }

        Ok(())
    }

    fn parse_attribute(&mut self, src: &BytesStr, line: &str) -> Result<(), ParseSessionDescriptionError> {
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (line, None),
        };

        if let Some(direction) = Direction::from_token(name) {
            match self.media_descriptions.last_mut() {
                Some(media_description) => media_description.direction = direction,
                None => self.direction = direction,
            }

            return Ok(());
        }

        match (name, value, self.media_descriptions.last_mut()) {
            ("group", Some(value), None) => {
                let (_, group) = Group::parse(src.as_ref(), value).finish()?;
                self.group.push(group);
            }
            ("rtcp-mux", None, Some(media_description)) => media_description.rtcp_mux = true,
            ("mid", Some(value), Some(media_description)) => {
                media_description.mid = Some(src.slice_ref(value.trim()));
            }
            ("rtcp", Some(value), Some(media_description)) => {
                let (_, rtcp) = Rtcp::parse(src.as_ref(), value).finish()?;
                media_description.rtcp = Some(rtcp);
            }
            ("rtpmap", Some(value), Some(media_description)) => {
                let (_, rtpmap) = RtpMap::parse(src.as_ref(), value).finish()?;
                media_description.rtpmap.push(rtpmap);
            }
            ("rtcp-fb", Some(value), Some(media_description)) => {
                let (_, rtcp_fb) = RtcpFeedback::parse(src.as_ref(), value).finish()?;
                media_description.rtcp_fb.push(rtcp_fb);
            }
            ("ssrc", Some(value), Some(media_description)) => {
                let (_, ssrc) = Ssrc::parse(src.as_ref(), value).finish()?;
                media_description.ssrc.push(ssrc);
            }
            (name, value, media_description) => {
                let attribute = UnknownAttribute {
                    name: src.slice_ref(name),
                    value: value.map(|value| src.slice_ref(value)),
                };

                match media_description {
                    Some(media_description) => media_description.attributes.push(attribute),
                    None => self.attributes.push(attribute),
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Result<SessionDescription, ParseSessionDescriptionError> {
        Ok(SessionDescription {
            origin: self
                .origin
                .ok_or(ParseSessionDescriptionError::MissingOrigin)?,
            name: self.name.ok_or(ParseSessionDescriptionError::MissingName)?,
            connection: self.connection,
            bandwidth: self.bandwidth,
            time: self.time.ok_or(ParseSessionDescriptionError::MissingTime)?,
            direction: self.direction,
            group: self.group,
            attributes: self.attributes,
            media_descriptions: self.media_descriptions,
        })
    }
}
