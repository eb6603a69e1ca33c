use crate::header::FlvHeader;
use crate::tag::FlvTag;

/// One element yielded by the incremental decoder: the file-level header
/// first, then each tag in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum FlvData {
    Header(FlvHeader),
    Tag(FlvTag),
}

impl FlvData {
    pub fn timestamp(&self) -> u32 {
        match self {
            FlvData::Header(_) => 0,
            FlvData::Tag(tag) => tag.timestamp(),
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, FlvData::Header(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, FlvData::Tag(_))
    }

    pub fn is_key_frame(&self) -> bool {
        match self {
            FlvData::Header(_) => false,
            FlvData::Tag(tag) => tag.is_key_frame(),
        }
    }
}
