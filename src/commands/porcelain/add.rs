use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::merge::resolve::BlobStore;
use std::path::PathBuf;

impl Repository {
    pub fn add(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let mut index = self.index();

        // Load the index file from the disk
        index.rehydrate()?;

        // Expand every pathspec before touching the store, so a bad one stages nothing
        let files = paths
            .iter()
            .map(|path| self.workspace().list_files(path))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten();

        for file in files {
            let content = self.workspace().read_file(&file)?;
            let mode = self.workspace().file_mode(&file);
            let size = u32::try_from(content.len()).unwrap_or(u32::MAX);

            let blob_oid = self.database().write_blob(content)?;
            index.stage(IndexEntry::new(file, blob_oid, mode, size));
        }

        if index.is_changed() {
            index.write_updates()?;
        }

        Ok(())
    }
}
