use std::fmt;
use std::fmt::{Display, Formatter};

/// Common media types, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Text,
    Html,
    Json,
    JavaScript,
    Jpeg,
    Pdf,
    Css,
    Xml,
    Zip,
    Unknown,
}

impl MediaType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Json => "application/json",
            Self::JavaScript => "text/javascript",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
            Self::Css => "text/css",
            Self::Xml => "application/xml",
            Self::Zip => "application/zip",
            Self::Unknown => "application/octet-stream",
        }
    }

    /// Maps a file extension (without the dot) to its media type.
    ///
    /// Unknown extensions map to [`MediaType::Unknown`].
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "txt" => Self::Text,
            "html" | "htm" => Self::Html,
            "json" => Self::Json,
            "js" => Self::JavaScript,
            "jpg" | "jpeg" => Self::Jpeg,
            "pdf" => Self::Pdf,
            "css" => Self::Css,
            "xml" => Self::Xml,
            "zip" => Self::Zip,
            _ => Self::Unknown,
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_extension() {
        assert_eq!(MediaType::from_extension("html"), MediaType::Html);
        assert_eq!(MediaType::from_extension("htm"), MediaType::Html);
        assert_eq!(MediaType::from_extension("jpeg"), MediaType::Jpeg);
        assert_eq!(MediaType::from_extension("js").as_str(), "text/javascript");
        assert_eq!(MediaType::from_extension(""), MediaType::Unknown);
        assert_eq!(MediaType::from_extension("exe").as_str(), "application/octet-stream");
    }
}
