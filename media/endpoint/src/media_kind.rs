use sdp_types::MediaType;
use std::fmt;

/// Stream name of the connection shared by all media when bundling
pub const BUNDLE_STREAM_NAME: &str = "bundle";

/// The two kinds of media an endpoint carries, each in its own RTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Audio, MediaKind::Video];

    pub fn from_media_type(media_type: &MediaType) -> Option<Self> {
        match media_type {
            MediaType::Audio => Some(MediaKind::Audio),
            MediaType::Video => Some(MediaKind::Video),
            _ => None,
        }
    }

    pub fn from_session_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(MediaKind::Audio),
            1 => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Fixed id of the RTP session carrying this media
    pub fn session_id(self) -> u32 {
        match self {
            MediaKind::Audio => 0,
            MediaKind::Video => 1,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.session_id() as usize
    }

    /// Name of the dedicated connection used when not bundling
    pub fn stream_name(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stream_name())
    }
}
