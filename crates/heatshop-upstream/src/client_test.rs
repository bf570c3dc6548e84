use super::*;

#[test]
fn products_url_first_page() {
    let url = UpstreamClient::products_url("http://217.0.0.1:8000", Category::Terea, 0, 50).unwrap();
    assert_eq!(url, "http://217.0.0.1:8000/products/terea?skip=0&limit=50");
}

#[test]
fn products_url_later_page() {
    let url = UpstreamClient::products_url("http://catalog.local", Category::Iqos, 100, 50).unwrap();
    assert_eq!(url, "http://catalog.local/products/iqos?skip=100&limit=50");
}

#[test]
fn products_url_strips_trailing_slash() {
    let url = UpstreamClient::products_url("http://catalog.local/", Category::Devices, 0, 10).unwrap();
    assert_eq!(url, "http://catalog.local/products/devices?skip=0&limit=10");
}

#[test]
fn products_url_keeps_base_path() {
    let url = UpstreamClient::products_url("https://catalog.local/api/v1", Category::Terea, 0, 50)
        .unwrap();
    assert_eq!(url, "https://catalog.local/api/v1/products/terea?skip=0&limit=50");
}

#[test]
fn products_url_rejects_invalid_base() {
    let result = UpstreamClient::products_url("not-a-url", Category::Terea, 0, 50);
    let err = result.unwrap_err();
    assert!(
        matches!(err, UpstreamError::InvalidBaseUrl { .. }),
        "expected InvalidBaseUrl, got: {err:?}"
    );
}

#[test]
fn new_rejects_non_http_scheme() {
    let err = UpstreamClient::new("ftp://catalog.local", 5, "heatshop-test/0.1").unwrap_err();
    assert!(matches!(err, UpstreamError::InvalidBaseUrl { .. }));
}

#[test]
fn new_trims_trailing_slash() {
    let client = UpstreamClient::new("http://catalog.local/", 5, "heatshop-test/0.1").unwrap();
    assert_eq!(client.base_url(), "http://catalog.local");
}
