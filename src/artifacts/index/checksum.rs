//! SHA-1 trailer over the index file
//!
//! Every byte that goes through a [`Checksum`] is folded into a running
//! digest, so the trailer written at the end (or verified on load) covers the
//! header and all records.

use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{VcsError, VcsResult};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

#[derive(Debug)]
pub struct Checksum<F> {
    file: F,
    digest: Sha1,
}

impl<F> Checksum<F> {
    pub fn new(file: F) -> Self {
        Checksum {
            file,
            digest: Sha1::new(),
        }
    }
}

impl<F: Read> Checksum<F> {
    pub fn read(&mut self, size: usize) -> VcsResult<Bytes> {
        let mut buffer = vec![0; size];
        self.file.read_exact(&mut buffer).map_err(|_| {
            VcsError::IndexCorrupt("unexpected end-of-file while reading index".into())
        })?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    /// Compare the stored trailer against the digest of everything read so far
    ///
    /// Trailing bytes after the trailer are rejected too.
    pub fn verify(&mut self) -> VcsResult<()> {
        let mut expected = [0u8; CHECKSUM_SIZE];
        self.file
            .read_exact(&mut expected)
            .map_err(|_| VcsError::IndexCorrupt("missing index checksum".into()))?;

        let actual = self.digest.clone().finalize();
        if expected != actual.as_slice() {
            return Err(VcsError::IndexCorrupt(
                "checksum does not match value stored on disk".into(),
            ));
        }

        let mut rest = Vec::new();
        self.file.read_to_end(&mut rest)?;
        if !rest.is_empty() {
            return Err(VcsError::IndexCorrupt(format!(
                "{} unexpected bytes after checksum",
                rest.len()
            )));
        }

        Ok(())
    }
}

impl<F: Write> Checksum<F> {
    pub fn write(&mut self, data: &[u8]) -> VcsResult<()> {
        self.file.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub fn write_checksum(mut self) -> VcsResult<F> {
        let checksum = self.digest.clone().finalize();
        self.file.write_all(checksum.as_slice())?;
        self.file.flush()?;

        Ok(self.file)
    }
}
