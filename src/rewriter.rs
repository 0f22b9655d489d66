use crate::{ParameterMap, RewriteError};
use url::{ParseError, Url};

/// Replace the query of `original` with the encoded `params`.
///
/// Any query already on `original` is discarded; the fragment is kept.
/// Relative references (as used together with a base URL prefix) are
/// rewritten in place.
///
/// # Examples
///
/// ```rust
/// use param_miner::{rewrite, ParameterMap};
///
/// let params: ParameterMap = [("x", "1"), ("q", "FUZZ")].into_iter().collect();
/// let url = rewrite("http://h/page?old=1#top", &params).unwrap();
/// assert_eq!(url, "http://h/page?q=FUZZ&x=1#top");
/// ```
pub fn rewrite(original: &str, params: &ParameterMap) -> Result<String, RewriteError> {
    let query = params.encode();

    match Url::parse(original) {
        Ok(mut url) => {
            url.set_query(Some(&query));
            Ok(url.into())
        }
        Err(ParseError::RelativeUrlWithoutBase) => Ok(rewrite_relative(original, &query)),
        Err(e) => Err(RewriteError::InvalidUrl(format!("{original}: {e}"))),
    }
}

fn rewrite_relative(reference: &str, query: &str) -> String {
    let (rest, fragment) = match reference.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (reference, None),
    };
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);

    let mut rewritten = format!("{path}?{query}");
    if let Some(fragment) = fragment {
        rewritten.push('#');
        rewritten.push_str(fragment);
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_query_is_replaced_wholesale() {
        let url = rewrite(
            "https://example.com/a/b?keep=no&other=1",
            &params(&[("id", "FUZZ")]),
        )
        .unwrap();
        assert_eq!(url, "https://example.com/a/b?id=FUZZ");
    }

    #[test]
    fn test_keys_sorted_and_values_repeated() {
        let url = rewrite(
            "http://h/page",
            &params(&[("x", "1"), ("q", "FUZZ"), ("x", "2")]),
        )
        .unwrap();
        assert_eq!(url, "http://h/page?q=FUZZ&x=1&x=2");
    }

    #[test]
    fn test_fragment_port_and_userinfo_preserved() {
        let url = rewrite(
            "http://user:pw@h:8080/p?z=1#section",
            &params(&[("a", "b c")]),
        )
        .unwrap();
        assert_eq!(url, "http://user:pw@h:8080/p?a=b+c#section");
    }

    #[test]
    fn test_rewritten_query_parses_back() {
        let original = params(&[("q", "FUZZ"), ("q", "1"), ("id", "5")]);
        let url = Url::parse(&rewrite("http://h/", &original).unwrap()).unwrap();
        assert_eq!(ParameterMap::from_query(url.query().unwrap()), original);
    }

    #[test]
    fn test_relative_reference() {
        let p = params(&[("q", "FUZZ")]);
        assert_eq!(rewrite("/page", &p).unwrap(), "/page?q=FUZZ");
        assert_eq!(rewrite("/page?old=1#frag", &p).unwrap(), "/page?q=FUZZ#frag");
        assert_eq!(rewrite("page.php", &p).unwrap(), "page.php?q=FUZZ");
    }

    #[test]
    fn test_unparsable_url_fails() {
        let err = rewrite("http://[::1/", &params(&[("q", "FUZZ")])).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidUrl(_)));
    }
}
