//! Process-wide credential cache: in-memory holder, durable record, and issuer refresh.
//!
//! [`CredentialCache::get_token`] consults three tiers in strict order and stops at the first
//! one that yields a token valid beyond `now + SAFETY_BUFFER`:
//!
//! 1. the in-memory holder (no I/O),
//! 2. the durable record, consulted only while the holder is empty (e.g. after a restart),
//! 3. a login against the issuer, whose result replaces the holder first and the durable record
//!    second.
//!
//! The warm and cold tiers run under a single async mutex, so concurrent callers that all
//! observe a stale token trigger one login and the rest re-read the refreshed holder.

mod stats;

pub use stats::CacheStats;

// self
use crate::{
	_prelude::*,
	auth::{CachedCredential, TokenSecret},
	config::IssuerConfig,
	http::TokenHttpClient,
	issuer::IssuerClient,
	obs::{self, CachePath, FlowOutcome, FlowSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestHttpClient, store::FileStore};

#[cfg(feature = "reqwest")]
/// Cache specialized for the crate's default reqwest transport.
pub type ReqwestCredentialCache = CredentialCache<ReqwestHttpClient>;

/// Owns the shared bearer token for one issuer account.
///
/// Construct one instance at startup and share it (it is cheap to clone; clones share state).
pub struct CredentialCache<C>
where
	C: TokenHttpClient,
{
	/// HTTP client used for issuer logins.
	pub http_client: Arc<C>,
	/// Durable tier.
	pub store: Arc<dyn CredentialStore>,
	/// Issuer endpoint, credentials, and cache location.
	pub config: IssuerConfig,
	/// Per-tier counters.
	pub stats: Arc<CacheStats>,
	holder: Arc<RwLock<Option<CachedCredential>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<C> CredentialCache<C>
where
	C: TokenHttpClient,
{
	/// Margin subtracted from the declared expiry before a token is handed out.
	pub const SAFETY_BUFFER: Duration = Duration::hours(1);

	/// Creates a cache that reuses the caller-provided transport and store.
	pub fn with_http_client(
		config: IssuerConfig,
		http_client: impl Into<Arc<C>>,
		store: Arc<dyn CredentialStore>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store,
			config,
			stats: Default::default(),
			holder: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Returns a token valid for at least [`Self::SAFETY_BUFFER`], refreshing it if needed.
	///
	/// At most one issuer login happens per call and none is retried; an `Err` means no usable
	/// token is available right now. Durable-tier problems never surface here.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		self.get_token_at(OffsetDateTime::now_utc()).await
	}

	/// Same as [`Self::get_token`] with an explicit notion of "now".
	pub async fn get_token_at(&self, now: OffsetDateTime) -> Result<TokenSecret> {
		let span = FlowSpan::new("get_token");
		let path_span = span.clone();

		span.instrument(self.lookup(now, path_span)).await
	}

	/// Drops the in-memory token and deletes the durable record.
	///
	/// Use this when the downstream API rejects a token the cache still considers fresh; the
	/// next lookup goes straight to the issuer.
	pub async fn invalidate(&self) -> Result<()> {
		let _singleflight = self.refresh_guard.lock().await;

		self.holder.write().take();
		self.store.clear().await?;

		obs::record_event("invalidate", "cached token dropped");

		Ok(())
	}

	/// Returns the in-memory credential, fresh or not, without any I/O.
	pub fn current(&self) -> Option<CachedCredential> {
		self.holder.read().clone()
	}

	async fn lookup(&self, now: OffsetDateTime, span: FlowSpan) -> Result<TokenSecret> {
		span.record_path(CachePath::Fast);
		obs::record_flow_outcome(CachePath::Fast, FlowOutcome::Attempt);

		if let Some(token) = self.fresh_in_memory(now) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed the holder while this one waited.
		if let Some(token) = self.fresh_in_memory(now) {
			return Ok(token);
		}

		obs::record_flow_outcome(CachePath::Fast, FlowOutcome::Miss);

		let holder_empty = self.holder.read().is_none();

		if holder_empty {
			span.record_path(CachePath::Warm);
			obs::record_flow_outcome(CachePath::Warm, FlowOutcome::Attempt);

			if let Some(token) = self.warm_path(now).await {
				return Ok(token);
			}

			obs::record_flow_outcome(CachePath::Warm, FlowOutcome::Miss);
		}

		span.record_path(CachePath::Cold);
		obs::record_flow_outcome(CachePath::Cold, FlowOutcome::Attempt);

		match self.cold_path(now).await {
			Ok(token) => {
				obs::record_flow_outcome(CachePath::Cold, FlowOutcome::Success);

				Ok(token)
			},
			Err(e) => {
				self.stats.record_failure();
				obs::record_flow_outcome(CachePath::Cold, FlowOutcome::Failure);
				obs::record_warning("cold", "failed to obtain a token from the issuer", &e);

				Err(e)
			},
		}
	}

	fn fresh_in_memory(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let token = self
			.holder
			.read()
			.as_ref()
			.filter(|credential| credential.is_fresh_at(now, Self::SAFETY_BUFFER))
			.map(|credential| credential.token.clone())?;

		self.stats.record_fast_hit();
		obs::record_flow_outcome(CachePath::Fast, FlowOutcome::Success);

		Some(token)
	}

	async fn warm_path(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let credential = match self.store.load().await {
			Ok(credential) => credential?,
			Err(e) => {
				obs::record_warning(
					"warm",
					"durable token record is unreadable; treating it as absent",
					&e,
				);

				return None;
			},
		};
		let fresh = credential.is_fresh_at(now, Self::SAFETY_BUFFER);
		let token = credential.token.clone();

		*self.holder.write() = Some(credential);

		if !fresh {
			return None;
		}

		self.stats.record_warm_hit();
		obs::record_flow_outcome(CachePath::Warm, FlowOutcome::Success);
		obs::record_event("warm", "loaded a valid token from the durable record");

		Some(token)
	}

	async fn cold_path(&self, now: OffsetDateTime) -> Result<TokenSecret> {
		self.stats.record_cold_attempt();
		obs::record_event("cold", "token missing or inside the safety buffer; requesting a new one");

		let credential =
			IssuerClient::new(self.http_client.as_ref(), &self.config).request_token(now).await?;
		let token = credential.token.clone();

		*self.holder.write() = Some(credential.clone());

		if let Err(e) = self.store.save(&credential).await {
			self.stats.record_write_failure();
			obs::record_warning(
				"cold",
				"failed to persist the refreshed token; continuing with the in-memory copy",
				&e,
			);
		}

		obs::record_event("cold", "refreshed and cached a new token");

		Ok(token)
	}
}
#[cfg(feature = "reqwest")]
impl CredentialCache<ReqwestHttpClient> {
	/// Creates a cache with a default reqwest transport and a [`FileStore`] at
	/// `config.cache_path`.
	pub fn new(config: IssuerConfig) -> Self {
		let store: Arc<dyn CredentialStore> = Arc::new(FileStore::new(config.cache_path.clone()));

		Self::with_http_client(config, ReqwestHttpClient::default(), store)
	}

	/// Reads [`IssuerConfig::from_env`] and builds a cache with [`Self::new`].
	pub fn from_env() -> Result<Self, ConfigError> {
		IssuerConfig::from_env().map(Self::new)
	}
}
impl<C> Clone for CredentialCache<C>
where
	C: TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			stats: self.stats.clone(),
			holder: self.holder.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<C> Debug for CredentialCache<C>
where
	C: TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("config", &self.config)
			.field("current", &self.holder.read())
			.field("stats", &self.stats)
			.finish()
	}
}
