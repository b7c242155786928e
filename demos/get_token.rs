//! Demonstrates the cache against a mocked issuer: one login, a memory hit, a warm start from the
//! durable record, and signing a downstream request with the cached token.

// std
use std::{env, process, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use onemap_token_cache::{
	cache::CredentialCache,
	config::{IssuerConfig, IssuerCredentials},
	ext::{AuthorizationHeaderSigner, RequestSignerExt},
	http::ReqwestHttpClient,
	reqwest::Client,
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expiry = (OffsetDateTime::now_utc() + Duration::days(3)).unix_timestamp();
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/post/getToken");
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"access_token\":\"demo-access\",\"expiry_timestamp\":\"{expiry}\"}}"
			));
		})
		.await;
	let cache_path = env::temp_dir().join(format!("onemap_token_demo_{}.json", process::id()));
	let config = IssuerConfig::new(Url::parse(&server.url("/api/auth/post/getToken"))?)
		.with_credentials(IssuerCredentials::new("demo@example.com", "demo-password"))
		.with_cache_path(&cache_path);
	let http_client = ReqwestHttpClient::with_timeout(Duration::seconds(10))?;
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(&cache_path));
	let cache = <CredentialCache<ReqwestHttpClient>>::with_http_client(
		config.clone(),
		http_client.clone(),
		store,
	);
	let token = cache.get_token().await?;

	cache.get_token().await?;

	println!(
		"Logged in once; memory hits: {}, issuer calls: {}.",
		cache.stats.fast_hits(),
		cache.stats.cold_attempts()
	);

	// A second instance stands in for a restarted process and reads the durable record.
	let restarted = <CredentialCache<ReqwestHttpClient>>::with_http_client(
		config,
		http_client,
		Arc::new(FileStore::new(&cache_path)) as Arc<dyn CredentialStore>,
	);

	restarted.get_token().await?;

	println!("Restarted instance warm hits: {}.", restarted.stats.warm_hits());

	let request = AuthorizationHeaderSigner::default()
		.attach_token(Client::new().get(server.url("/api/public/popapi/getPlanningarea")), &token)?
		.build()?;

	println!(
		"Signed request carries an Authorization header: {}.",
		request.headers().contains_key("authorization")
	);

	token_mock.assert_async().await;
	restarted.invalidate().await?;

	Ok(())
}
