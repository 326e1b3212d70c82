//! Resolves request targets against a base directory.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use tokio::fs;
use tracing::{debug, error};
use vanilla_http::conditional::ETag;
use vanilla_http::protocol::{MediaType, ResponseBuilder, StatusCode};

use crate::listing::DirectoryHtmlPage;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Outcome of a lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchResult {
    Found,
    NotFound,
    PermissionDenied,
    Error,
}

impl SearchResult {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Found => StatusCode::Ok,
            Self::NotFound => StatusCode::NotFound,
            Self::PermissionDenied => StatusCode::Forbidden,
            Self::Error => StatusCode::InternalServerError,
        }
    }
}

#[derive(Debug)]
enum Body {
    Empty,
    InMemory(Bytes),
    File(PathBuf),
}

/// A looked-up resource and its validators.
///
/// File bodies are not opened until the payload is rendered.
#[derive(Debug)]
pub struct ContentResponse {
    result: SearchResult,
    media_type: Option<MediaType>,
    etag: Option<ETag>,
    last_modified: Option<SystemTime>,
    body: Body,
}

impl ContentResponse {
    fn of(result: SearchResult) -> Self {
        Self { result, media_type: None, etag: None, last_modified: None, body: Body::Empty }
    }

    // generated pages carry no validators, so they are never answered with 304
    fn listing(page: String) -> Self {
        Self { media_type: Some(MediaType::Html), body: Body::InMemory(Bytes::from(page)), ..Self::of(SearchResult::Found) }
    }

    fn file(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let media_type = path.extension().and_then(|ext| ext.to_str()).map_or(MediaType::Unknown, MediaType::from_extension);
        let last_modified = metadata.modified().ok();
        let version = last_modified.and_then(|modified| modified.duration_since(UNIX_EPOCH).ok()).map_or(0, |since| since.as_nanos());

        Self {
            result: SearchResult::Found,
            media_type: Some(media_type),
            etag: Some(ETag::strong(format!("{:x}-{:x}", metadata.len(), version))),
            last_modified,
            body: Body::File(path),
        }
    }

    pub fn result(&self) -> SearchResult {
        self.result
    }

    pub fn media_type(&self) -> Option<MediaType> {
        self.media_type
    }

    pub fn etag(&self) -> Option<&ETag> {
        self.etag.as_ref()
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }

    /// Attaches the body to `response` as a deferred payload.
    pub fn render_into(self, response: &mut ResponseBuilder) {
        match self.body {
            Body::Empty => {}
            Body::InMemory(bytes) => {
                response.payload_bytes(bytes);
            }
            Body::File(path) => {
                response.payload(move || fs::File::open(path));
            }
        }
    }
}

/// Serves content from a directory tree.
///
/// The request path is percent-decoded and joined to the base directory.
/// Directories resolve to their index file when there is one, otherwise to a
/// generated listing. Anything resolving outside the base directory, symlinks
/// included, is reported as [`SearchResult::PermissionDenied`].
#[derive(Debug, Clone)]
pub struct FilesystemContentService {
    basedir: PathBuf,
}

impl FilesystemContentService {
    pub fn new(basedir: impl Into<PathBuf>) -> Self {
        Self { basedir: basedir.into() }
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    pub async fn fetch(&self, uri: &str) -> ContentResponse {
        match self.try_fetch(uri).await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = %e, uri, "error during processing of search");
                ContentResponse::of(SearchResult::Error)
            }
        }
    }

    async fn try_fetch(&self, uri: &str) -> io::Result<ContentResponse> {
        let uri_path = uri_path(uri);
        let mut requested = self.basedir.join(uri_path.trim_start_matches('/'));
        debug!(path = %requested.display(), "resolving request target");

        if fs::metadata(&requested).await.is_ok_and(|metadata| metadata.is_dir()) {
            if let Some(index) = find_index_file(&requested).await {
                requested = index;
            }
        }

        let path = match fs::canonicalize(&requested).await {
            Ok(path) => path,
            Err(e) => return classify(e),
        };
        let basedir = fs::canonicalize(&self.basedir).await?;
        if !path.starts_with(&basedir) {
            debug!(path = %path.display(), "request target outside of base directory");
            return Ok(ContentResponse::of(SearchResult::PermissionDenied));
        }

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => return classify(e),
        };

        if metadata.is_dir() {
            return match DirectoryHtmlPage::read(&path, &uri_path).await {
                Ok(page) => Ok(ContentResponse::listing(page.render())),
                Err(e) => classify(e),
            };
        }

        // readable now; the stream itself is opened again when the payload renders
        if let Err(e) = fs::File::open(&path).await {
            return classify(e);
        }
        Ok(ContentResponse::file(path, &metadata))
    }
}

/// The percent-decoded path of a request target, without query or fragment.
fn uri_path(uri: &str) -> String {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

async fn find_index_file(directory: &Path) -> Option<PathBuf> {
    for name in INDEX_FILES {
        let candidate = directory.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|metadata| metadata.is_file()) {
            return Some(candidate);
        }
    }
    None
}

fn classify(e: io::Error) -> io::Result<ContentResponse> {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Ok(ContentResponse::of(SearchResult::NotFound)),
        io::ErrorKind::PermissionDenied => Ok(ContentResponse::of(SearchResult::PermissionDenied)),
        _ => Err(e),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use vanilla_http::conditional::ETagKind;
    use vanilla_http::protocol::Version;

    /// A fresh, empty directory unique to this test process.
    pub(crate) fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vanilla-server-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn body_of(response: ContentResponse) -> String {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder.status(StatusCode::Ok);
        response.render_into(&mut builder);

        let (_head, renderer) = builder.build().unwrap().into_parts();
        let mut stream = (renderer.unwrap())().await.unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).await.unwrap();
        body
    }

    #[test]
    fn strips_query_and_decodes() {
        assert_eq!(uri_path("/hello%20world.txt?download=1#top"), "/hello world.txt");
        assert_eq!(uri_path("/"), "/");
    }

    #[tokio::test]
    async fn finds_file() {
        let dir = temp_dir("finds-file");
        std::fs::write(dir.join("hello.txt"), "Hello World!").unwrap();

        let response = FilesystemContentService::new(&dir).fetch("/hello.txt").await;
        assert_eq!(response.result(), SearchResult::Found);
        assert_eq!(response.media_type(), Some(MediaType::Text));
        assert_eq!(response.etag().map(ETag::kind), Some(ETagKind::Strong));
        assert!(response.last_modified().is_some());
        assert_eq!(body_of(response).await, "Hello World!");
    }

    #[tokio::test]
    async fn etag_is_stable_until_change() {
        let dir = temp_dir("etag-stable");
        std::fs::write(dir.join("a.txt"), "one").unwrap();
        let service = FilesystemContentService::new(&dir);

        let first = service.fetch("/a.txt").await;
        let second = service.fetch("/a.txt").await;
        assert_eq!(first.etag(), second.etag());

        std::fs::write(dir.join("a.txt"), "three").unwrap();
        let changed = service.fetch("/a.txt").await;
        assert_ne!(first.etag(), changed.etag());
    }

    #[tokio::test]
    async fn decodes_request_path() {
        let dir = temp_dir("decodes");
        std::fs::write(dir.join("hello world.json"), "{}").unwrap();

        let response = FilesystemContentService::new(&dir).fetch("/hello%20world.json?x=1").await;
        assert_eq!(response.result(), SearchResult::Found);
        assert_eq!(response.media_type(), Some(MediaType::Json));
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let dir = temp_dir("unknown-ext");
        std::fs::write(dir.join("data.bin"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.join("README"), "read me").unwrap();
        let service = FilesystemContentService::new(&dir);

        assert_eq!(service.fetch("/data.bin").await.media_type(), Some(MediaType::Unknown));
        assert_eq!(service.fetch("/README").await.media_type(), Some(MediaType::Unknown));
    }

    #[tokio::test]
    async fn missing_is_not_found() {
        let dir = temp_dir("missing");
        std::fs::write(dir.join("file.txt"), "x").unwrap();
        let service = FilesystemContentService::new(&dir);

        assert_eq!(service.fetch("/nope.html").await.result(), SearchResult::NotFound);
        assert_eq!(service.fetch("/file.txt/below").await.result(), SearchResult::NotFound);
    }

    #[tokio::test]
    async fn directory_prefers_index_file() {
        let dir = temp_dir("index");
        std::fs::create_dir(dir.join("site")).unwrap();
        std::fs::write(dir.join("site").join("index.htm"), "<h1>home</h1>").unwrap();

        let response = FilesystemContentService::new(&dir).fetch("/site/").await;
        assert_eq!(response.result(), SearchResult::Found);
        assert_eq!(response.media_type(), Some(MediaType::Html));
        assert!(response.etag().is_some());
        assert_eq!(body_of(response).await, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn directory_without_index_is_listed() {
        let dir = temp_dir("listed");
        std::fs::write(dir.join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let response = FilesystemContentService::new(&dir).fetch("/").await;
        assert_eq!(response.result(), SearchResult::Found);
        assert_eq!(response.media_type(), Some(MediaType::Html));
        assert!(response.etag().is_none());
        assert!(response.last_modified().is_none());

        let body = body_of(response).await;
        assert!(body.contains("<title>Directory listing for /</title>"));
        assert!(body.contains("<li><a href=\"a.txt\">a.txt</a><li><a href=\"sub/\">sub/</a>"));
    }

    #[tokio::test]
    async fn escaping_base_directory_is_denied() {
        let root = temp_dir("escape");
        let base = root.join("public");
        std::fs::create_dir(&base).unwrap();
        std::fs::write(root.join("secret.txt"), "secret").unwrap();

        let service = FilesystemContentService::new(&base);
        assert_eq!(service.fetch("/../secret.txt").await.result(), SearchResult::PermissionDenied);
        assert_eq!(service.fetch("/%2e%2e/secret.txt").await.result(), SearchResult::PermissionDenied);
    }

    #[test]
    fn results_map_to_status() {
        assert_eq!(SearchResult::Found.status(), StatusCode::Ok);
        assert_eq!(SearchResult::NotFound.status(), StatusCode::NotFound);
        assert_eq!(SearchResult::PermissionDenied.status(), StatusCode::Forbidden);
        assert_eq!(SearchResult::Error.status(), StatusCode::InternalServerError);
    }
}
