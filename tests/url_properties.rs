//! Property-based tests for outbound URL construction
//!
//! For any inbound `/proxy/<p>`, the upstream URL is the base plus exactly one
//! separating slash plus every segment of `<p>`, whatever slashes surround it.

use http::Uri;
use iiko_relay::domain::UpstreamBaseUrl;
use iiko_relay::proxy::url_resolver::UrlResolver;
use proptest::collection::vec;
use proptest::prelude::*;

const BASE: &str = "https://api-ru.iiko.net";

pub mod generators {
    use super::*;

    /// A single non-empty path segment
    pub fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._~-]{1,12}".prop_filter("dot segments are refused by the resolver", |s| {
            s != "." && s != ".."
        })
    }

    /// Between one and three slashes
    pub fn slashes() -> impl Strategy<Value = String> {
        (1usize..=3).prop_map(|n| "/".repeat(n))
    }

    /// Segments, plus the slashes placed before, between and after them
    pub fn path() -> impl Strategy<Value = (Vec<String>, String, bool)> {
        (vec(segment(), 1..6), 0usize..=3, any::<bool>()).prop_flat_map(
            |(segments, leading, trailing)| {
                let gaps = vec(slashes(), segments.len());
                (Just(segments), gaps, Just(leading), Just(trailing))
            },
        )
        .prop_map(|(segments, gaps, leading, trailing)| {
            let mut raw = "/".repeat(leading);
            for (i, (segment, gap)) in segments.iter().zip(&gaps).enumerate() {
                if i > 0 {
                    raw.push_str(gap);
                }
                raw.push_str(segment);
            }
            if trailing {
                raw.push('/');
            }
            (segments, raw, trailing)
        })
    }
}

fn expected(segments: &[String], trailing: bool) -> String {
    let mut url = format!("{BASE}/{}", segments.join("/"));
    if trailing {
        url.push('/');
    }
    url
}

proptest! {
    #[test]
    fn join_uses_exactly_one_separator(
        (segments, raw, trailing) in generators::path(),
        base_slashes in 0usize..=3,
    ) {
        let base = UpstreamBaseUrl::try_new(format!("{BASE}{}", "/".repeat(base_slashes))).unwrap();
        prop_assert_eq!(UrlResolver::join(&base, &raw), expected(&segments, trailing));
    }

    #[test]
    fn proxy_paths_resolve_without_segment_loss(
        (segments, raw, trailing) in generators::path(),
    ) {
        let base = UpstreamBaseUrl::try_new(BASE.to_string()).unwrap();
        let inbound: Uri = format!("/proxy/{raw}").parse().unwrap();

        let url = UrlResolver::resolve_target_url(&base, &inbound).unwrap();

        prop_assert_eq!(url.as_str(), expected(&segments, trailing));
        prop_assert!(!url.path().contains("//"));
    }

    #[test]
    fn query_string_survives_resolution(
        (segments, raw, trailing) in generators::path(),
        query in "[a-zA-Z0-9]{1,8}=[a-zA-Z0-9]{0,8}",
    ) {
        let base = UpstreamBaseUrl::try_new(BASE.to_string()).unwrap();
        let inbound: Uri = format!("/proxy/{raw}?{query}").parse().unwrap();

        let url = UrlResolver::resolve_target_url(&base, &inbound).unwrap();

        prop_assert_eq!(url.query(), Some(query.as_str()));
        prop_assert_eq!(
            format!("{}://{}{}", url.scheme(), url.host_str().unwrap(), url.path()),
            expected(&segments, trailing)
        );
    }
}
