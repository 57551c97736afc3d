mod helpers;

use harvest::export::ExportFormat;
use harvest::runner::{ErrorKind, RunForm, RunMode};
use harvest::store::Payload;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{any, method, path},
};

fn form(url: String) -> RunForm {
    RunForm {
        url,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_curl_preview_is_raw_body() {
    let server = MockServer::start().await;
    helpers::mount_page(&server, "/", "hello", "text/plain").await;

    let state = helpers::test_state();
    let output = state.runner.run(&form(server.uri())).await.unwrap();

    assert!(output.table.is_none());
    assert_eq!(output.raw_preview.as_deref(), Some("hello"));
    assert_eq!(output.metadata.mode, RunMode::Curl);
}

#[tokio::test]
async fn test_curl_long_body_is_truncated_but_stored_whole() {
    let server = MockServer::start().await;
    let body = "x".repeat(12_000);
    helpers::mount_page(&server, "/big", &body, "text/plain").await;

    let state = helpers::test_state();
    let output = state
        .runner
        .run(&form(format!("{}/big", server.uri())))
        .await
        .unwrap();

    let preview = output.raw_preview.unwrap();
    assert_eq!(preview.len(), 10_003);
    assert!(preview.ends_with("..."));

    let stored = state.runner.store().take(&output.token).unwrap();
    match stored.payload {
        Payload::Raw { content, .. } => assert_eq!(content.len(), 12_000),
        other => panic!("expected raw payload, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scrape_quotes_with_alignment() {
    let server = MockServer::start().await;
    helpers::mount_page(
        &server,
        "/quotes",
        r#"<div class="quote"><span class="text">Quote one</span><small class="author">Ada</small></div>
           <div class="quote"><span class="text">Quote two</span></div>"#,
        "text/html; charset=utf-8",
    )
    .await;

    let mut f = form(format!("{}/quotes", server.uri()));
    f.mode = "scrape".to_string();
    f.selectors = ".text, .author".to_string();
    f.format = "json".to_string();

    let state = helpers::test_state();
    let output = state.runner.run(&f).await.unwrap();
    let table = output.table.unwrap();

    assert_eq!(table.columns(), &[".text", ".author"]);
    assert_eq!(
        table.rows(),
        &[vec!["Quote one", "Ada"], vec!["Quote two", ""]]
    );

    let stored = state.runner.store().take(&output.token).unwrap();
    assert_eq!(stored.format, ExportFormat::Json);
}

#[tokio::test]
async fn test_regex_dates() {
    let server = MockServer::start().await;
    helpers::mount_page(
        &server,
        "/blog",
        "Posted 2024-01-05 and 2024-02-10",
        "text/html",
    )
    .await;

    let mut f = form(format!("{}/blog", server.uri()));
    f.mode = "scrape".to_string();
    f.regex_pattern = r"\d{4}-\d{2}-\d{2}".to_string();

    let table = helpers::test_state()
        .runner
        .run(&f)
        .await
        .unwrap()
        .table
        .unwrap();
    assert_eq!(table.rows(), &[vec!["2024-01-05"], vec!["2024-02-10"]]);
}

#[tokio::test]
async fn test_malformed_headers_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut f = form(server.uri());
    f.custom_headers = "{oops".to_string();

    let err = helpers::test_state().runner.run(&f).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_autofind_home_and_contact() {
    let server = MockServer::start().await;
    helpers::mount_page(
        &server,
        "/",
        r#"<p>reach us at a@b.com</p><a href="/contact">Contact</a>"#,
        "text/html",
    )
    .await;
    helpers::mount_page(&server, "/contact", "mail us: c@d.com", "text/html").await;

    let mut f = form(format!("{}/", server.uri()));
    f.autofind = true;

    let output = helpers::test_state().runner.run(&f).await.unwrap();
    let home = format!("{}/", server.uri());
    let contact = format!("{}/contact", server.uri());

    assert_eq!(output.metadata.contact_candidates, Some(1));
    assert_eq!(
        output.table.unwrap().rows(),
        &[
            vec![home.as_str(), "homepage", "a@b.com"],
            vec![contact.as_str(), "Contact", "c@d.com"],
        ]
    );
}

#[tokio::test]
async fn test_autofind_skips_failing_candidates() {
    let server = MockServer::start().await;
    helpers::mount_page(
        &server,
        "/",
        r#"<a href="/support">Support</a><a href="/about">About</a>"#,
        "text/html",
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/support"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    helpers::mount_page(
        &server,
        "/about",
        r#"<a href="mailto:team@example.org?subject=hi">Write</a>"#,
        "text/html",
    )
    .await;

    let mut f = form(format!("{}/", server.uri()));
    f.autofind = true;

    let output = helpers::test_state().runner.run(&f).await.unwrap();
    let table = output.table.unwrap();
    assert_eq!(output.metadata.contact_candidates, Some(2));
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows()[0][1], "About");
    assert_eq!(table.rows()[0][2], "team@example.org");
}

#[tokio::test]
async fn test_autofind_home_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut f = form(server.uri());
    f.autofind = true;

    let err = helpers::test_state().runner.run(&f).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fetch);
}
