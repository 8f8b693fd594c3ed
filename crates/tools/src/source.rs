use streaming::{FetchError, FetchResponse, FileTransport, HttpTransport, Transport};

/// Picks HTTP for `http(s)://` locations and the filesystem otherwise.
#[derive(Debug, Clone)]
pub enum SourceTransport {
    Http(HttpTransport),
    File(FileTransport),
}

impl SourceTransport {
    pub fn for_location(location: &str) -> Self {
        let lower = location.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            SourceTransport::Http(HttpTransport::new())
        } else {
            SourceTransport::File(FileTransport::new())
        }
    }
}

impl Transport for SourceTransport {
    async fn open(&self, url: &str) -> Result<FetchResponse, FetchError> {
        match self {
            SourceTransport::Http(t) => t.open(url).await,
            SourceTransport::File(t) => t.open(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SourceTransport;
    use std::io::Write;
    use streaming::fetch_text;

    #[test]
    fn dispatches_on_scheme() {
        assert!(matches!(
            SourceTransport::for_location("https://example.org/pr.csv"),
            SourceTransport::Http(_)
        ));
        assert!(matches!(
            SourceTransport::for_location("HTTP://example.org/pr.csv"),
            SourceTransport::Http(_)
        ));
        assert!(matches!(
            SourceTransport::for_location("data/pr.csv"),
            SourceTransport::File(_)
        ));
        assert!(matches!(
            SourceTransport::for_location("file:///tmp/pr.csv"),
            SourceTransport::File(_)
        ));
    }

    #[tokio::test]
    async fn reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "year,lat,lon,pr,scenario\n2020,1,2,0.5,ssp126").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let transport = SourceTransport::for_location(&path);
        let text = fetch_text(&transport, &path, |_| {}).await.expect("read");
        assert!(text.ends_with("ssp126\n"));
    }
}
