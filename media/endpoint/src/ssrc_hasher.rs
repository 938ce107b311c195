use std::hash::{BuildHasher, Hasher};

/// SSRCs are random already, use them as hash directly
#[derive(Default, Clone)]
pub(crate) struct SsrcHasher(u32);

impl BuildHasher for SsrcHasher {
    type Hasher = Self;

    fn build_hasher(&self) -> Self::Hasher {
        Self(0)
    }
}

impl Hasher for SsrcHasher {
    fn finish(&self) -> u64 {
        self.0.into()
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.rotate_left(8) ^ u32::from(byte);
        }
    }

    fn write_u32(&mut self, i: u32) {
        self.0 = i;
    }
}
