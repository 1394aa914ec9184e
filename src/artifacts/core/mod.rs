//! Terminal output helpers
//!
//! Long listings (`log`, `reflog`) are routed through the `minus` pager when
//! standard output is an interactive terminal.

use derive_new::new;
use is_terminal::IsTerminal;
use minus::Pager;
use std::io::{self, Write};

/// Set to any value to print straight to stdout even on a terminal
pub const NO_PAGER_ENV: &str = "NO_PAGER";

/// Adapts the minus pager to `std::io::Write`
///
/// ```ignore
/// let pager = Pager::new();
/// let mut writer = PagerWriter::new(pager.clone());
/// writeln!(writer, "Some long output...")?;
/// minus::page_all(pager)?;
/// ```
#[derive(new)]
pub struct PagerWriter {
    pager: Pager,
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s =
            std::str::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.pager.push_str(s).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Whether command output should go through the pager
pub fn should_page() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os(NO_PAGER_ENV).is_none()
}

/// Whether stdout supports colored output
pub fn is_colored_output() -> bool {
    std::io::stdout().is_terminal()
}
