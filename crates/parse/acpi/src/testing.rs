//! Synthetic firmware images for unit tests.

use std::cell::RefCell;
use std::io::{self, Cursor};
use std::rc::Rc;

use crate::sdt::byte_sum;
use crate::source::ByteSource;

/// A zero-filled physical memory image.
pub(crate) struct Image(Vec<u8>);

impl Image {
    pub(crate) fn new(size: usize) -> Self {
        Self(vec![0; size])
    }

    /// Copy `bytes` in at `offset`, growing the image if needed.
    pub(crate) fn put(&mut self, offset: u64, bytes: &[u8]) -> &mut Self {
        let start = usize::try_from(offset).unwrap();
        let end = start + bytes.len();
        if end > self.0.len() {
            self.0.resize(end, 0);
        }
        self.0[start..end].copy_from_slice(bytes);
        self
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub(crate) fn into_source(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.0)
    }
}

/// Build a table with a valid checksum.
pub(crate) fn table(signature: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let length = u32::try_from(36 + body.len()).unwrap();
    let mut t = Vec::with_capacity(length as usize);
    t.extend_from_slice(signature);
    t.extend_from_slice(&length.to_le_bytes());
    t.push(1); // revision
    t.push(0); // checksum
    t.extend_from_slice(b"RSDPF ");
    t.extend_from_slice(b"SYNTHTBL");
    t.extend_from_slice(&1u32.to_le_bytes());
    t.extend_from_slice(b"TEST");
    t.extend_from_slice(&1u32.to_le_bytes());
    t.extend_from_slice(body);
    t[9] = 0u8.wrapping_sub(byte_sum(&t));
    t
}

/// Build an XSDT listing `entries`.
pub(crate) fn xsdt(entries: &[u64]) -> Vec<u8> {
    let body: Vec<u8> = entries.iter().flat_map(|e| e.to_le_bytes()).collect();
    table(b"XSDT", &body)
}

/// Build a 244-byte FADT with the given DSDT pointers.
pub(crate) fn fadt(x_dsdt: u64, dsdt: u32) -> Vec<u8> {
    let mut body = vec![0u8; 244 - 36];
    body[40 - 36..44 - 36].copy_from_slice(&dsdt.to_le_bytes());
    body[140 - 36..148 - 36].copy_from_slice(&x_dsdt.to_le_bytes());
    table(b"FACP", &body)
}

/// Build a 36-byte ACPI 2.0 root descriptor pointing at `xsdt_address`.
pub(crate) fn rsdp(xsdt_address: u64) -> Vec<u8> {
    let mut r = Vec::with_capacity(36);
    r.extend_from_slice(b"RSD PTR ");
    r.push(0); // checksum
    r.extend_from_slice(b"RSDPF ");
    r.push(2); // revision
    r.extend_from_slice(&0u32.to_le_bytes());
    r.extend_from_slice(&36u32.to_le_bytes());
    r.extend_from_slice(&xsdt_address.to_le_bytes());
    r.push(0); // extended checksum
    r.extend_from_slice(&[0; 3]);
    r[8] = 0u8.wrapping_sub(byte_sum(&r[..20]));
    r[32] = 0u8.wrapping_sub(byte_sum(&r));
    r
}

/// A source that records every seek it is asked to perform.
pub(crate) struct Recording {
    inner: Cursor<Vec<u8>>,
    seeks: Rc<RefCell<Vec<u64>>>,
}

impl Recording {
    pub(crate) fn new(image: Image) -> (Self, Rc<RefCell<Vec<u64>>>) {
        let seeks = Rc::new(RefCell::new(Vec::new()));
        let source = Self {
            inner: image.into_source(),
            seeks: Rc::clone(&seeks),
        };
        (source, seeks)
    }
}

impl ByteSource for Recording {
    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.seeks.borrow_mut().push(offset);
        self.inner.seek_to(offset)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_into(buf)
    }
}
