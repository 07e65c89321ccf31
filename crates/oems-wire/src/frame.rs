//! Frame structure for element messages
//!
//! Frame = Fixed Header + Payload

use bytes::{BufMut, Bytes, BytesMut};

use oems_core::{Element, OemsError, OemsResult, Rank, MAX_MESSAGE_ELEMENTS};

/// Current wire version
pub const WIRE_VERSION: u8 = 1;

/// Fixed header size
pub const FRAME_HEADER_SIZE: usize = 12;

/// Largest possible frame
pub const MAX_FRAME_SIZE: usize = FRAME_HEADER_SIZE + MAX_MESSAGE_ELEMENTS;

/// Fixed frame header
///
/// ```text
///  0        1        2-3      4-7        8-11
/// +--------+--------+--------+----------+----------+
/// |version | count  |  tag   |  source  |   dest   |
/// +--------+--------+--------+----------+----------+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u8,
    /// Number of elements in the payload
    pub count: u8,
    pub tag: u16,
    pub source: Rank,
    pub dest: Rank,
}

impl FrameHeader {
    pub fn new(tag: u16, source: Rank, dest: Rank, count: usize) -> Self {
        FrameHeader {
            version: WIRE_VERSION,
            count: count as u8,
            tag,
            source,
            dest,
        }
    }

    /// Parse header from bytes
    pub fn parse(buf: &[u8]) -> OemsResult<Self> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Err(OemsError::BufferTooShort {
                expected: FRAME_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        let version = buf[0];
        if version != WIRE_VERSION {
            return Err(OemsError::InvalidWireFormat(format!(
                "Unknown wire version {}",
                version
            )));
        }

        let count = buf[1];
        let tag = u16::from_le_bytes([buf[2], buf[3]]);
        let source = Rank::from_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let dest = Rank::from_bytes([buf[8], buf[9], buf[10], buf[11]]);

        Ok(FrameHeader {
            version,
            count,
            tag,
            source,
            dest,
        })
    }

    /// Append header to a buffer
    pub fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(self.version);
        buf.put_u8(self.count);
        buf.put_u16_le(self.tag);
        buf.put_slice(&self.source.to_bytes());
        buf.put_slice(&self.dest.to_bytes());
    }
}

/// One message of one or two elements
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Vec<Element>,
}

impl Frame {
    /// Build a frame, rejecting empty and oversized payloads
    pub fn new(tag: u16, source: Rank, dest: Rank, elements: &[Element]) -> OemsResult<Self> {
        check_count(elements.len())?;
        Ok(Frame {
            header: FrameHeader::new(tag, source, dest, elements.len()),
            payload: elements.to_vec(),
        })
    }

    /// Serialize to a shareable buffer
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.size());
        self.header.write(&mut buf);
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Parse a frame from bytes
    pub fn decode(buf: &[u8]) -> OemsResult<Self> {
        let header = FrameHeader::parse(buf)?;
        let count = header.count as usize;
        check_count(count)?;

        let payload = &buf[FRAME_HEADER_SIZE..];
        if payload.len() != count {
            return Err(OemsError::InvalidWireFormat(format!(
                "Header announces {} element(s), payload carries {}",
                count,
                payload.len()
            )));
        }

        Ok(Frame {
            header,
            payload: payload.to_vec(),
        })
    }

    /// Check that this frame is the one a receive was posted for
    pub fn verify(&self, at: Rank, tag: u16, source: Rank, count: usize) -> OemsResult<()> {
        let header = &self.header;
        let reason = if header.tag != tag {
            format!("tag {} (expected {})", header.tag, tag)
        } else if header.source != source {
            format!("sender {} (expected {})", header.source, source)
        } else if header.dest != at {
            format!("addressed to {}", header.dest)
        } else if self.payload.len() != count {
            format!(
                "{} element(s) from {} (expected {})",
                self.payload.len(),
                source,
                count
            )
        } else {
            return Ok(());
        };

        Err(OemsError::UnexpectedMessage { at, reason })
    }

    /// Total encoded size
    pub fn size(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }
}

fn check_count(count: usize) -> OemsResult<()> {
    if count == 0 || count > MAX_MESSAGE_ELEMENTS {
        return Err(OemsError::InvalidWireFormat(format!(
            "Message must carry 1..={} elements, got {}",
            MAX_MESSAGE_ELEMENTS, count
        )));
    }
    Ok(())
}
