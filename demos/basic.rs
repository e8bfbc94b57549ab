use http_request_kit::{
    RequestBuilder, ReqwestTransport, RetryConfig, RetryTransport, Transport, TransportOptions,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct Search<'a> {
    q: &'a str,
    page: u32,
    cursor: Option<&'a str>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url =
        std::env::var("HTTP_KIT_BASE_URL").unwrap_or_else(|_| "https://httpbin.org/".to_owned());
    let retry = RetryConfig::from_env().map_err(anyhow::Error::msg)?;

    let transport = RetryTransport::new(
        ReqwestTransport::new()
            .with_base_url(&base_url)?
            .with_options(TransportOptions { timeout_ms: 5_000 }),
        retry,
    )?;

    let request = RequestBuilder::get("anything/{0}", &["hello world".into()])
        .query_object(&Search {
            q: "rust & http",
            page: 1,
            cursor: None,
        })
        .header("accept", "application/json")
        .build()?;

    let cancel = CancellationToken::new();
    let response = transport.send(&request, &cancel).await?;
    println!("{} {}", response.status(), request.target());
    println!("{}", response.text());

    Ok(())
}
