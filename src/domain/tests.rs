use super::*;
use crate::config::DEFAULT_MEDIA_HOSTS;

fn default_set() -> ClassificationSet {
    ClassificationSet::new(DEFAULT_MEDIA_HOSTS.iter().copied())
}

#[test]
fn test_every_configured_host_is_media() {
    let set = default_set();
    for host in DEFAULT_MEDIA_HOSTS {
        let url = format!("https://{}/some/path?q=1", host);
        let (extracted, class) = set.classify(&url).expect("valid URL");
        assert_eq!(extracted, *host);
        assert_eq!(class, Classification::Media, "{} should be media", host);
    }
}

#[test]
fn test_other_hosts_are_articles() {
    let set = default_set();
    for url in [
        "http://www.nytimes.com/2014/article.html",
        "http://youtube.com/watch?v=xyz",
        "http://m.facebook.com/story",
        "http://127.0.0.1:8080/page",
    ] {
        let (_, class) = set.classify(url).expect("valid URL");
        assert_eq!(class, Classification::Article, "{} should be an article", url);
    }
}

#[test]
fn test_youtube_watch_url() {
    let (host, class) = default_set()
        .classify("http://www.youtube.com/watch?v=xyz")
        .expect("valid URL");
    assert_eq!(host, "www.youtube.com");
    assert_eq!(class, Classification::Media);
}

#[test]
fn test_membership_is_exact_and_case_sensitive() {
    let set = ClassificationSet::new(["Vimeo.com"]);
    assert_eq!(set.classify_host("Vimeo.com"), Classification::Media);
    assert_eq!(set.classify_host("vimeo.com"), Classification::Article);
    assert_eq!(set.classify_host("player.Vimeo.com"), Classification::Article);
}

#[test]
fn test_url_parser_lowercases_host() {
    // Hosts come out of the URL parser lowercased, so configured hosts should be lowercase
    let set = default_set();
    let (host, class) = set.classify("https://WWW.YOUTUBE.COM/watch").expect("valid URL");
    assert_eq!(host, "www.youtube.com");
    assert_eq!(class, Classification::Media);
}

#[test]
fn test_optional_twitter_membership() {
    let without = default_set();
    let with = ClassificationSet::new(
        DEFAULT_MEDIA_HOSTS
            .iter()
            .copied()
            .chain(std::iter::once("twitter.com")),
    );
    assert_eq!(without.classify_host("twitter.com"), Classification::Article);
    assert_eq!(with.classify_host("twitter.com"), Classification::Media);
    assert_eq!(with.len(), DEFAULT_MEDIA_HOSTS.len() + 1);
}

#[test]
fn test_unparseable_url_is_resolution_failure() {
    let result = default_set().classify("::not a url::");
    assert!(matches!(result, Err(ResolutionError::InvalidUrl { .. })));
}

#[test]
fn test_url_without_host_is_resolution_failure() {
    let result = default_set().classify("mailto:someone@example.com");
    assert!(matches!(result, Err(ResolutionError::InvalidUrl { .. })));
}

#[test]
fn test_empty_set_routes_everything_to_articles() {
    let set = ClassificationSet::default();
    assert!(set.is_empty());
    assert_eq!(set.classify_host("vimeo.com"), Classification::Article);
}
