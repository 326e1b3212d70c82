//! HTML directory listings.

use std::fmt::Write;
use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

const START_PAGE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\"><html>\n\
                          <title>Directory listing for {path}</title>\n\
                          <body>\n\
                          <h2>Directory listing for {path}</h2>\n\
                          <hr>\n\
                          <ul>";

const END_PAGE: &str = "</ul>\n<hr>\n</body>\n</html>";

/// Listing of one directory: readable entries sorted by name, directories
/// marked with a trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryHtmlPage {
    directory_path: String,
    entries: Vec<String>,
}

impl DirectoryHtmlPage {
    /// Reads `directory`; `directory_path` is the request path shown as the title.
    pub async fn read(directory: &Path, directory_path: &str) -> io::Result<Self> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(directory).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    debug!(entry = ?entry.path(), cause = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let mut name = entry.file_name().to_string_lossy().into_owned();
            if metadata.is_dir() {
                name.push('/');
            }
            entries.push(name);
        }
        entries.sort_unstable();

        Ok(Self { directory_path: directory_path.to_owned(), entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn render(&self) -> String {
        let mut page = START_PAGE.replace("{path}", &escape(&self.directory_path));
        for entry in &self.entries {
            let entry = escape(entry);
            // writing into a String can't fail
            let _ = write!(page, "<li><a href=\"{entry}\">{entry}</a>");
        }
        page.push_str(END_PAGE);
        page
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
