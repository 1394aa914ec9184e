use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print `key`, or set it to `value` and save the config file
    pub fn config_command(&self, key: &str, value: Option<&str>) -> anyhow::Result<()> {
        match value {
            Some(value) => {
                let mut config = self.config_mut();
                config.set(key, value)?;
                config.save()?;
            }
            None => {
                let value = self
                    .config()
                    .get_stored(key)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("key '{key}' is not set"))?;
                writeln!(self.writer(), "{value}")?;
            }
        }

        Ok(())
    }
}
