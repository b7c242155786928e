// std
use std::fs;
// crates.io
use time::macros;
// self
use onemap_token_cache::{
	_preludet::*,
	auth::CachedCredential,
	store::{CredentialStore, FileStore, MemoryStore},
};

fn fixture() -> CachedCredential {
	let acquired = macros::datetime!(2025-06-01 08:00 UTC);

	CachedCredential::acquired_at("durable-token", 1_748_800_000, acquired)
}

#[tokio::test]
async fn writing_identical_records_twice_is_idempotent() {
	let path = temp_cache_path("idempotent");
	let store = FileStore::new(&path);
	let record = fixture();

	store.save(&record).await.expect("First save should succeed.");

	let first: serde_json::Value =
		serde_json::from_slice(&fs::read(&path).expect("File should exist after first save."))
			.expect("First write should be valid JSON.");

	store.save(&record).await.expect("Second save should succeed.");

	let second: serde_json::Value =
		serde_json::from_slice(&fs::read(&path).expect("File should exist after second save."))
			.expect("Second write should be valid JSON.");

	assert_eq!(first, second);
	assert_eq!(
		store.load().await.expect("Load should succeed.").expect("Record should be present."),
		record
	);

	fs::remove_file(&path).expect("Durable record should be removable.");
}

#[tokio::test]
async fn overwrite_replaces_the_whole_record() {
	let path = temp_cache_path("overwrite");
	let store = FileStore::new(&path);

	store.save(&fixture()).await.expect("Initial save should succeed.");
	store.save(&CachedCredential::new("replacement", 42)).await.expect("Overwrite should succeed.");

	let raw: serde_json::Value =
		serde_json::from_slice(&fs::read(&path).expect("File should exist after overwrite."))
			.expect("Overwritten file should be valid JSON.");
	let object = raw.as_object().expect("Durable record should be a JSON object.");

	assert_eq!(object.len(), 3);
	assert_eq!(raw["access_token"], "replacement");
	assert_eq!(raw["expiry_timestamp"], 42);
	assert!(raw["cached_at"].is_string());

	fs::remove_file(&path).expect("Durable record should be removable.");
}

#[tokio::test]
async fn stores_share_the_same_contract() {
	let path = temp_cache_path("contract");
	let stores: Vec<Arc<dyn CredentialStore>> =
		vec![Arc::new(FileStore::new(&path)), Arc::new(MemoryStore::default())];

	for store in stores {
		assert!(store.load().await.expect("Empty load should succeed.").is_none());

		store.save(&fixture()).await.expect("Save should succeed.");

		let loaded =
			store.load().await.expect("Load should succeed.").expect("Record should be present.");

		assert_eq!(loaded.token.expose(), "durable-token");
		assert_eq!(loaded.expiry_timestamp, 1_748_800_000);

		store.clear().await.expect("Clear should succeed.");

		assert!(store.load().await.expect("Load after clear should succeed.").is_none());
	}

	assert!(!path.exists());
}

#[tokio::test]
async fn file_written_by_hand_with_numeric_string_expiry_loads() {
	let path = temp_cache_path("hand_written");
	let contents = r#"{
		"access_token": "manual",
		"expiry_timestamp": "1748800000",
		"cached_at": "2025-06-01T08:00:00.123456"
	}"#;

	fs::write(&path, contents).expect("Fixture should be writable.");

	let loaded = FileStore::new(&path)
		.load()
		.await
		.expect("Load should succeed.")
		.expect("Record should be present.");

	assert_eq!(loaded.token.expose(), "manual");
	assert_eq!(loaded.expiry_timestamp, 1_748_800_000);
	// Offset-less timestamps are diagnostic only and are dropped rather than rejected.
	assert!(loaded.cached_at.is_none());

	fs::remove_file(&path).expect("Durable record should be removable.");
}
