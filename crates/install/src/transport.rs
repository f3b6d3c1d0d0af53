//! Byte sources for dependency artifacts.

use crate::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use url::Url;

/// User agent sent with HTTP requests.
const USER_AGENT: &str = concat!("bpdeps/", env!("CARGO_PKG_VERSION"));

/// Opens a readable stream for a dependency URI.
pub trait Transport: Send + Sync {
    /// Open `uri`. `root` anchors `file://` URIs.
    fn drop(&self, root: &Path, uri: &str) -> Result<Box<dyn Read + Send>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn drop(&self, root: &Path, uri: &str) -> Result<Box<dyn Read + Send>> {
        (**self).drop(root, uri)
    }
}

/// Serves `file://` URIs from a local root and `http(s)://` URIs over the
/// network.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransport;

impl DefaultTransport {
    /// Create a transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn open_file(root: &Path, uri: &str, url: &Url) -> Result<Box<dyn Read + Send>> {
        let absolute = url.to_file_path().map_err(|()| Error::InvalidUri {
            uri: uri.to_string(),
            message: "file URIs must not name a host".to_string(),
        })?;
        let relative = absolute.strip_prefix("/").unwrap_or(&absolute);
        let path = root.join(relative);

        debug!(?path, "Opening local artifact");
        let file = File::open(&path).map_err(|e| Error::io(e, &path, "open"))?;
        Ok(Box::new(file))
    }

    fn open_http(uri: &str) -> Result<Box<dyn Read + Send>> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| Error::Http {
                uri: uri.to_string(),
                source,
            })?;

        debug!(%uri, "Downloading artifact");
        let response = client.get(uri).send().map_err(|source| Error::Http {
            uri: uri.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(Box::new(response))
    }
}

impl Transport for DefaultTransport {
    fn drop(&self, root: &Path, uri: &str) -> Result<Box<dyn Read + Send>> {
        let url = Url::parse(uri).map_err(|e| Error::InvalidUri {
            uri: uri.to_string(),
            message: e.to_string(),
        })?;

        match url.scheme() {
            "file" => Self::open_file(root, uri, &url),
            "http" | "https" => Self::open_http(uri),
            scheme => Err(Error::UnsupportedScheme {
                uri: uri.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}
