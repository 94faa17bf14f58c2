use url::Url;

use crate::error::BaseUrlError;

/// Parse an API base URL, accepting only http(s).
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, BaseUrlError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BaseUrlError::UnsupportedScheme(other.to_string())),
    }
}

/// Resolve `path` below `base`, keeping any path prefix of `base`.
pub(crate) fn endpoint(base: &Url, path: &str) -> Result<Url, BaseUrlError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_prefix() {
        let base = Url::parse("https://example.com/survey").unwrap();
        assert_eq!(
            endpoint(&base, "/api/submit").unwrap().as_str(),
            "https://example.com/survey/api/submit"
        );

        let root = Url::parse("http://localhost:5000").unwrap();
        assert_eq!(
            endpoint(&root, "api/tokens/abc").unwrap().as_str(),
            "http://localhost:5000/api/tokens/abc"
        );
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(BaseUrlError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(BaseUrlError::Invalid(_))
        ));
        assert!(parse_base_url(" http://localhost:5000 ").is_ok());
    }
}
