//! Shareable link construction and parsing
//!
//! A share travels as a URL whose query string carries `share=<id>` and,
//! when the snapshot is embedded for fallback transport, `code=<token>`.

use url::Url;

use crate::entry::ShareId;
use crate::error::{Error, Result};

/// Query parameter carrying the share identifier
const SHARE_PARAM: &str = "share";
/// Query parameter carrying the codec-encoded snapshot
const CODE_PARAM: &str = "code";

/// A shareable link: the identifier plus an optional embedded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Identifier of the shared entry
    pub id: ShareId,
    /// Codec-encoded snapshot, present when the content is embedded
    pub code: Option<String>,
}

impl ShareLink {
    /// Create a link carrying only the identifier
    pub fn new(id: impl Into<ShareId>) -> Self {
        Self {
            id: id.into(),
            code: None,
        }
    }

    /// Create a link carrying the identifier and an embedded payload
    pub fn with_code(id: impl Into<ShareId>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: Some(code.into()),
        }
    }

    /// Render the link as a URL rooted at `base`.
    ///
    /// Query parameters already present on `base` are preserved.
    pub fn to_url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        url.query_pairs_mut().append_pair(SHARE_PARAM, &self.id);
        if let Some(code) = &self.code {
            url.query_pairs_mut().append_pair(CODE_PARAM, code);
        }
        Ok(url)
    }

    /// Extract a share link from a URL
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;

        let mut id = None;
        let mut code = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                SHARE_PARAM => id = Some(value.into_owned()),
                CODE_PARAM => code = Some(value.into_owned()),
                _ => {}
            }
        }

        match id {
            Some(id) if !id.is_empty() => Ok(Self { id, code }),
            Some(_) => Err(Error::link("Share parameter is empty")),
            None => Err(Error::link("URL carries no share parameter")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_with_id_only() {
        let link = ShareLink::new("abc-123");
        let url = link.to_url("https://amber.example.com/view").unwrap();

        assert_eq!(url.as_str(), "https://amber.example.com/view?share=abc-123");
    }

    #[test]
    fn test_to_url_with_embedded_code() {
        let link = ShareLink::with_code("abc-123", "AgMEBQ");
        let url = link.to_url("https://amber.example.com/").unwrap();

        assert_eq!(
            url.as_str(),
            "https://amber.example.com/?share=abc-123&code=AgMEBQ"
        );
    }

    #[test]
    fn test_url_round_trip() {
        let link = ShareLink::with_code("abc-123", "AgMEBQ");
        let url = link.to_url("http://localhost/").unwrap();

        let parsed = ShareLink::parse(url.as_str()).unwrap();
        assert_eq!(parsed, link);
    }

    #[test]
    fn test_parse_preserves_existing_query() {
        let link = ShareLink::new("abc-123");
        let url = link.to_url("http://localhost/?theme=dark").unwrap();

        assert!(url.as_str().contains("theme=dark"));
        assert_eq!(ShareLink::parse(url.as_str()).unwrap().id, "abc-123");
    }

    #[test]
    fn test_parse_decodes_percent_encoding() {
        let parsed = ShareLink::parse("http://localhost/?share=a%20b&code=x%2By").unwrap();

        assert_eq!(parsed.id, "a b");
        assert_eq!(parsed.code.as_deref(), Some("x+y"));
    }

    #[test]
    fn test_parse_rejects_missing_share() {
        let err = ShareLink::parse("http://localhost/?code=xyz").unwrap_err();
        assert!(matches!(err, Error::Link(_)));

        let err = ShareLink::parse("http://localhost/?share=").unwrap_err();
        assert!(matches!(err, Error::Link(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_url() {
        assert!(ShareLink::parse("::definitely not a url::").is_err());
    }
}
