//! Backend URL construction

use url::Url;

use super::classify::SESSION_ID_PARAM;

/// Backend endpoints derived from the configured backend URL
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base: Url,
}

impl UpstreamTarget {
    /// Target for the configured backend (SSE) endpoint
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Backend SSE endpoint
    pub fn stream_url(&self) -> Url {
        self.base.clone()
    }

    /// Backend messages endpoint, optionally for a session
    ///
    /// A trailing `sse` segment is replaced by `messages`; otherwise
    /// `/messages` is appended.
    ///
    /// ```rust
    /// # use turbomcp_bridge::transport::UpstreamTarget;
    /// let target = UpstreamTarget::new("http://backend:8080/sse".parse().unwrap());
    /// assert_eq!(
    ///     target.messages_url(Some("abc")).as_str(),
    ///     "http://backend:8080/messages?sessionId=abc"
    /// );
    /// ```
    pub fn messages_url(&self, session_id: Option<&str>) -> Url {
        let mut url = self.base.clone();
        url.set_fragment(None);

        let path = url.path().trim_end_matches('/');
        let messages = match path.rsplit_once('/') {
            Some((parent, "sse")) => format!("{parent}/messages"),
            _ => format!("{path}/messages"),
        };
        url.set_path(&messages);

        if let Some(session_id) = session_id {
            url.query_pairs_mut().append_pair(SESSION_ID_PARAM, session_id);
        }
        url
    }

    /// Backend URL for a sub-path request: backend origin, the given path and query verbatim
    pub fn sub_path_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        url
    }
}
