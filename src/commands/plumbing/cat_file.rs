use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatFileMode {
    /// Print the object content
    Pretty,
    /// Print the object kind
    Type,
}

impl Repository {
    pub fn cat_file(&self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id.to_string())?;

        match mode {
            CatFileMode::Type => {
                let kind = self.database().object_type(&object_id)?;
                writeln!(self.writer(), "{kind}")?;
            }
            CatFileMode::Pretty => match self.database().parse_object(&object_id)? {
                // blob bytes go out untouched, they need not be UTF-8
                ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
                object => writeln!(self.writer(), "{}", object.display())?,
            },
        }

        Ok(())
    }
}
