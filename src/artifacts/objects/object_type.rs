use std::fmt;

/// The three kinds of stored objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Split a framed object (`<kind> <len>\0<content>`) into its kind and content
    ///
    /// The declared length must match the content length exactly.
    pub fn split_frame(framed: &[u8]) -> Result<(ObjectType, &[u8]), String> {
        let space = framed
            .iter()
            .position(|&b| b == b' ')
            .ok_or("missing space after object type")?;
        let nul = framed
            .iter()
            .position(|&b| b == b'\0')
            .ok_or("missing NUL after object size")?;
        if nul < space {
            return Err("malformed object header".to_string());
        }

        let kind = std::str::from_utf8(&framed[..space]).map_err(|e| e.to_string())?;
        let kind = ObjectType::try_from(kind)?;

        let size = std::str::from_utf8(&framed[space + 1..nul])
            .map_err(|e| e.to_string())?
            .parse::<usize>()
            .map_err(|e| format!("invalid object size: {e}"))?;

        let content = &framed[nul + 1..];
        if content.len() != size {
            return Err(format!(
                "object size mismatch: header says {size}, found {}",
                content.len()
            ));
        }

        Ok((kind, content))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(format!("invalid object type: {other}")),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
