//! Split a locator into its HTTPS origin and path.
//!
//! Splitting is textual: scheme, network location and path are cut out of
//! the locator as written. Nothing is normalized or percent-encoded, so the
//! path sent to the archive-info API is byte-for-byte the one the caller gave.

/// Origin and path of one locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLocator {
    /// `"https://"` + network location (`[user[:pass]@]host[:port]`).
    pub origin: String,
    pub path: String,
}

/// Splits `locator` into an HTTPS origin and a path.
///
/// The input scheme is discarded: storage endpoints serve the archive-info
/// API over HTTPS on the same host and port they expose for `davs://` or
/// `root://`. The network location is everything after `//` up to the first
/// `/`, `?` or `#`; the path runs from there up to `?` or `#`. A locator with
/// no network location lands on the empty origin `"https://"`.
pub fn split_locator(locator: &str) -> SplitLocator {
    let rest = strip_scheme(locator);
    let (netloc, rest) = match rest.strip_prefix("//") {
        Some(after) => {
            let end = after.find(&['/', '?', '#'][..]).unwrap_or(after.len());
            after.split_at(end)
        }
        None => ("", rest),
    };
    let path_end = rest.find(&['?', '#'][..]).unwrap_or(rest.len());
    let path = &rest[..path_end];

    if netloc.is_empty() {
        tracing::warn!(locator, "locator has no network location; grouping under empty host");
    } else if let Err(e) = url::Url::parse(locator) {
        tracing::debug!(locator, error = %e, "locator is not a valid URL; using it as written");
    }

    SplitLocator {
        origin: format!("https://{netloc}"),
        path: path.to_string(),
    }
}

/// Drops a leading `scheme:` if one is present.
fn strip_scheme(locator: &str) -> &str {
    let Some(colon) = locator.find(':') else {
        return locator;
    };
    let scheme = &locator[..colon];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        &locator[colon + 1..]
    } else {
        locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn davs_keeps_explicit_port() {
        let s = split_locator("davs://eoscms.cern.ch:443/eos/cms/store/file.root");
        assert_eq!(s.origin, "https://eoscms.cern.ch:443");
        assert_eq!(s.path, "/eos/cms/store/file.root");
    }

    #[test]
    fn non_default_port_and_no_port() {
        let s = split_locator("davs://xfer-cms.cr.cnaf.infn.it:8443/cmstape/store/a.root");
        assert_eq!(s.origin, "https://xfer-cms.cr.cnaf.infn.it:8443");
        assert_eq!(s.path, "/cmstape/store/a.root");

        let s = split_locator("root://eosuser.cern.ch//eos/user/x");
        assert_eq!(s.origin, "https://eosuser.cern.ch");
        assert_eq!(s.path, "//eos/user/x");
    }

    #[test]
    fn https_default_port_is_kept() {
        let s = split_locator("https://a.org:443/x");
        assert_eq!(s.origin, "https://a.org:443");
        assert_eq!(s.path, "/x");
    }

    #[test]
    fn query_and_fragment_are_not_part_of_path() {
        let s = split_locator("davs://a.org:443/x/y?svcClass=t1#frag");
        assert_eq!(s.origin, "https://a.org:443");
        assert_eq!(s.path, "/x/y");

        let s = split_locator("davs://a.org:443?x=1");
        assert_eq!(s.origin, "https://a.org:443");
        assert_eq!(s.path, "");
    }

    #[test]
    fn path_is_not_normalized() {
        let cases = [
            ("davs://a.org:443/store/../x.root", "/store/../x.root"),
            ("davs://a.org:443/store/./x.root", "/store/./x.root"),
            ("davs://a.org:443/dir/x y.root", "/dir/x y.root"),
            ("davs://a.org:443/dir/é.root", "/dir/é.root"),
            ("davs://a.org:443/dir/%41.root", "/dir/%41.root"),
        ];
        for (locator, path) in cases {
            let s = split_locator(locator);
            assert_eq!(s.origin, "https://a.org:443", "{locator}");
            assert_eq!(s.path, path, "{locator}");
        }
    }

    #[test]
    fn netloc_kept_even_when_not_a_valid_url() {
        let s = split_locator("davs://a.org:99999/x");
        assert_eq!(s.origin, "https://a.org:99999");
        assert_eq!(s.path, "/x");

        let s = split_locator("davs://bad host:443/x");
        assert_eq!(s.origin, "https://bad host:443");
        assert_eq!(s.path, "/x");
    }

    #[test]
    fn userinfo_stays_in_origin() {
        let s = split_locator("davs://op@a.org:2880/x");
        assert_eq!(s.origin, "https://op@a.org:2880");
    }

    #[test]
    fn relative_reference_goes_to_empty_origin() {
        let s = split_locator("/store/data/file.root");
        assert_eq!(s.origin, "https://");
        assert_eq!(s.path, "/store/data/file.root");

        let s = split_locator("not a uri");
        assert_eq!(s.origin, "https://");
        assert_eq!(s.path, "not a uri");

        let s = split_locator("");
        assert_eq!(s.origin, "https://");
        assert_eq!(s.path, "");
    }

    #[test]
    fn scheme_relative_locator_keeps_host() {
        let s = split_locator("//a.org:443/x");
        assert_eq!(s.origin, "https://a.org:443");
        assert_eq!(s.path, "/x");
    }

    #[test]
    fn hostless_uri_has_empty_network_location() {
        let s = split_locator("file:///data/x.root");
        assert_eq!(s.origin, "https://");
        assert_eq!(s.path, "/data/x.root");
    }
}
