//! Wire schema of a persisted address book record.
//!
//! ```text
//! AddrBookRecord
//!   1: bytes            id
//!   2: repeated AddrEntry addrs
//!   3: CertifiedRecord  certified_record
//! AddrEntry
//!   1: bytes  addr      serialized multiaddr
//!   2: int64  expiry    unix seconds
//!   3: int64  ttl       nanoseconds
//! CertifiedRecord
//!   1: uint64 seq
//!   2: bytes  raw       signed envelope
//! ```
//!
//! Stored values carry no length prefix. Unknown fields are skipped.
//! Nested messages are decoded from their own slice, so a malformed
//! sub-message cannot read into the bytes that follow it.

use quick_protobuf::sizeofs::{sizeof_len, sizeof_varint};
use quick_protobuf::{BytesReader, MessageRead, MessageWrite, Result, Writer, WriterBackend};

const TAG_RECORD_ID: u32 = (1 << 3) | 2;
const TAG_RECORD_ADDRS: u32 = (2 << 3) | 2;
const TAG_RECORD_CERTIFIED: u32 = (3 << 3) | 2;

const TAG_ENTRY_ADDR: u32 = (1 << 3) | 2;
const TAG_ENTRY_EXPIRY: u32 = 2 << 3;
const TAG_ENTRY_TTL: u32 = 3 << 3;

const TAG_CERTIFIED_SEQ: u32 = 1 << 3;
const TAG_CERTIFIED_RAW: u32 = (2 << 3) | 2;

/// A peer's address book record as persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddrBookRecord {
    pub id: Vec<u8>,
    pub addrs: Vec<AddrEntry>,
    pub certified_record: Option<CertifiedRecord>,
}

/// A single address with its expiry and original TTL.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddrEntry {
    pub addr: Vec<u8>,
    pub expiry: i64,
    pub ttl: i64,
}

/// The most recently received signed peer record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CertifiedRecord {
    pub seq: u64,
    pub raw: Vec<u8>,
}

impl AddrBookRecord {
    /// Parse a stored value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = BytesReader::from_bytes(bytes);
        Self::from_reader(&mut reader, bytes)
    }

    /// Serialize in the stored layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.get_size());
        let mut writer = Writer::new(&mut buf);
        self.write_message(&mut writer)?;
        Ok(buf)
    }
}

/// Read a length-delimited sub-message with a reader bounded to its slice.
fn read_nested<'a, M: MessageRead<'a>>(r: &mut BytesReader, bytes: &'a [u8]) -> Result<M> {
    let sub = r.read_bytes(bytes)?;
    let mut reader = BytesReader::from_bytes(sub);
    M::from_reader(&mut reader, sub)
}

impl<'a> MessageRead<'a> for AddrBookRecord {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes)? {
                TAG_RECORD_ID => msg.id = r.read_bytes(bytes)?.to_owned(),
                TAG_RECORD_ADDRS => msg.addrs.push(read_nested(r, bytes)?),
                TAG_RECORD_CERTIFIED => msg.certified_record = Some(read_nested(r, bytes)?),
                tag => r.read_unknown(bytes, tag)?,
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for AddrBookRecord {
    fn get_size(&self) -> usize {
        (if self.id.is_empty() { 0 } else { 1 + sizeof_len(self.id.len()) })
            + self.addrs.iter().map(|a| 1 + sizeof_len(a.get_size())).sum::<usize>()
            + self.certified_record.as_ref().map_or(0, |c| 1 + sizeof_len(c.get_size()))
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if !self.id.is_empty() {
            w.write_with_tag(TAG_RECORD_ID, |w| w.write_bytes(&self.id))?;
        }
        for addr in &self.addrs {
            w.write_with_tag(TAG_RECORD_ADDRS, |w| w.write_message(addr))?;
        }
        if let Some(certified) = &self.certified_record {
            w.write_with_tag(TAG_RECORD_CERTIFIED, |w| w.write_message(certified))?;
        }
        Ok(())
    }
}

impl<'a> MessageRead<'a> for AddrEntry {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes)? {
                TAG_ENTRY_ADDR => msg.addr = r.read_bytes(bytes)?.to_owned(),
                TAG_ENTRY_EXPIRY => msg.expiry = r.read_int64(bytes)?,
                TAG_ENTRY_TTL => msg.ttl = r.read_int64(bytes)?,
                tag => r.read_unknown(bytes, tag)?,
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for AddrEntry {
    fn get_size(&self) -> usize {
        (if self.addr.is_empty() { 0 } else { 1 + sizeof_len(self.addr.len()) })
            + if self.expiry == 0 { 0 } else { 1 + sizeof_varint(self.expiry as u64) }
            + if self.ttl == 0 { 0 } else { 1 + sizeof_varint(self.ttl as u64) }
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if !self.addr.is_empty() {
            w.write_with_tag(TAG_ENTRY_ADDR, |w| w.write_bytes(&self.addr))?;
        }
        if self.expiry != 0 {
            w.write_with_tag(TAG_ENTRY_EXPIRY, |w| w.write_int64(self.expiry))?;
        }
        if self.ttl != 0 {
            w.write_with_tag(TAG_ENTRY_TTL, |w| w.write_int64(self.ttl))?;
        }
        Ok(())
    }
}

impl<'a> MessageRead<'a> for CertifiedRecord {
    fn from_reader(r: &mut BytesReader, bytes: &'a [u8]) -> Result<Self> {
        let mut msg = Self::default();
        while !r.is_eof() {
            match r.next_tag(bytes)? {
                TAG_CERTIFIED_SEQ => msg.seq = r.read_uint64(bytes)?,
                TAG_CERTIFIED_RAW => msg.raw = r.read_bytes(bytes)?.to_owned(),
                tag => r.read_unknown(bytes, tag)?,
            }
        }
        Ok(msg)
    }
}

impl MessageWrite for CertifiedRecord {
    fn get_size(&self) -> usize {
        (if self.seq == 0 { 0 } else { 1 + sizeof_varint(self.seq) })
            + if self.raw.is_empty() { 0 } else { 1 + sizeof_len(self.raw.len()) }
    }

    fn write_message<W: WriterBackend>(&self, w: &mut Writer<W>) -> Result<()> {
        if self.seq != 0 {
            w.write_with_tag(TAG_CERTIFIED_SEQ, |w| w.write_uint64(self.seq))?;
        }
        if !self.raw.is_empty() {
            w.write_with_tag(TAG_CERTIFIED_RAW, |w| w.write_bytes(&self.raw))?;
        }
        Ok(())
    }
}
