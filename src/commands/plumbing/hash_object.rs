use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use bytes::Bytes;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn hash_object(&self, object_path: &Path, write: bool) -> anyhow::Result<()> {
        let content = Bytes::from(std::fs::read(object_path)?);
        let blob = Blob::new(content);

        let object_id = if write {
            self.database().store(&blob)?
        } else {
            blob.object_id()
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
