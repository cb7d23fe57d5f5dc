use std::future::Future;
use std::time::Duration;

use futures::future;
use tracing::{debug, warn};

use agora_ledger::{HttpLedger, LedgerError, LedgerReader, LedgerWriter};
use agora_store::{read_to_end, ContentStore, HttpContentStore, StoreError};
use agora_types::{AccountId, ContentRecord, FeedCursor, Post, PostId, Signer};

use crate::cache::PostCache;
use crate::config::ClientConfig;
use crate::draft::{CreatedPost, PostDraft, TxConfirmation};
use crate::error::{ClientError, ClientResult, WriteError, WriteResult};

/// Pagination window for a feed read.
///
/// The cursor is whatever opaque token the ledger handed out; `None`
/// starts from the newest post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedQuery {
    pub limit: usize,
    pub cursor: Option<FeedCursor>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            cursor: None,
        }
    }
}

/// Client facade over the content store and the post registry.
///
/// Each operation is a short sequence of calls into the two collaborators.
/// The facade owns its [`PostCache`], so separate instances never share
/// cached state, and applies a per-call deadline to every external
/// suspension point.
///
/// Write operations (`create_post`, `like_post`, `follow_account`) return
/// a structured [`WriteError`] on failure instead of propagating
/// collaborator errors. Read operations (`get_post`, `get_feed`) propagate
/// a wrapped [`ClientError`]. Nothing is retried; any single failure
/// leaves the facade fully usable.
pub struct PostStore<S, L> {
    store: S,
    ledger: L,
    cache: PostCache,
    op_timeout: Duration,
}

impl PostStore<HttpContentStore, HttpLedger> {
    /// Assemble the HTTP-backed collaborators from configuration.
    pub fn connect(config: &ClientConfig) -> Self {
        let store = HttpContentStore::new(&config.store);
        let ledger = HttpLedger::new(config.ledger_url.clone(), config.registry.clone());
        Self::with_config(store, ledger, config)
    }
}

impl<S, L> PostStore<S, L>
where
    S: ContentStore,
    L: LedgerReader + LedgerWriter,
{
    /// Create a facade over the given collaborators with default settings.
    pub fn new(store: S, ledger: L) -> Self {
        Self::with_config(store, ledger, &ClientConfig::default())
    }

    /// Create a facade over the given collaborators, taking cache capacity
    /// and deadline from `config`.
    pub fn with_config(store: S, ledger: L, config: &ClientConfig) -> Self {
        Self {
            store,
            ledger,
            cache: PostCache::new(config.cache_capacity),
            op_timeout: config.op_timeout,
        }
    }

    /// Publish a post: store the content record, register it on the
    /// ledger, and wait for confirmation.
    ///
    /// The post id comes from the creation event in the confirmation
    /// receipt. No cache interaction; the cache entry is created lazily
    /// on first read.
    pub async fn create_post(&self, draft: PostDraft, signer: &Signer) -> WriteResult<CreatedPost> {
        match self.create_post_inner(draft, signer).await {
            Ok(created) => Ok(created),
            Err(e) => {
                warn!(error = %e, "create_post failed");
                Err(WriteError::from(e))
            }
        }
    }

    async fn create_post_inner(
        &self,
        draft: PostDraft,
        signer: &Signer,
    ) -> ClientResult<CreatedPost> {
        let record = ContentRecord::new(draft.text, draft.attachments, now_ms());
        let bytes = record.to_bytes()?;

        let content_address = self.bounded("content store", self.store.store(&bytes)).await?;
        let pending = self
            .bounded(
                "ledger submission",
                self.ledger
                    .submit_create_post(signer, &content_address, draft.reply_to),
            )
            .await?;
        let receipt = self
            .bounded("ledger confirmation", self.ledger.await_receipt(&pending))
            .await?;

        let id = receipt.post_created().ok_or_else(|| {
            ClientError::Ledger(LedgerError::MalformedReceipt {
                tx_hash: receipt.tx_hash,
                reason: "no creation event in receipt".into(),
            })
        })?;
        debug!(%id, address = %content_address.short_hex(), "post created");
        Ok(CreatedPost {
            id,
            content_address,
            tx_hash: receipt.tx_hash,
        })
    }

    /// Fetch a fully materialized post, cache-first.
    ///
    /// On a miss the post is assembled from ledger metadata plus the
    /// stored content record and cached. A post whose stored payload does
    /// not decode is never cached.
    pub async fn get_post(&self, id: PostId) -> ClientResult<Post> {
        if let Some(post) = self.cache.lookup(id) {
            debug!(%id, "post cache hit");
            return Ok(post);
        }

        match self.fetch_post(id).await {
            Ok(post) => {
                self.cache.insert(id, post.clone());
                Ok(post)
            }
            Err(source) => Err(ClientError::PostFetchFailed {
                id,
                source: Box::new(source),
            }),
        }
    }

    async fn fetch_post(&self, id: PostId) -> ClientResult<Post> {
        let record = self.bounded("ledger read", self.ledger.get_post(id)).await?;
        let address = record.content_address;

        let bytes = self
            .bounded("content retrieval", async {
                let stream = self.store.retrieve(&address).await?;
                read_to_end(stream).await
            })
            .await?;
        let content = ContentRecord::from_bytes(&bytes).map_err(|e| StoreError::Corrupt {
            address,
            reason: e.to_string(),
        })?;

        Ok(Post {
            id,
            author: record.author,
            content: content.text,
            attachments: content.attachments,
            timestamp_ms: content.timestamp_ms,
            reply_to: record.reply_to,
            likes: record.like_count,
            reposts: record.repost_count,
        })
    }

    /// Fetch a feed for `account`: posts by followed accounts and the
    /// account itself, newest first.
    ///
    /// Constituent posts are fetched concurrently and the whole feed fails
    /// if any one of them does; there is no partial result.
    pub async fn get_feed(&self, account: &AccountId, query: FeedQuery) -> ClientResult<Vec<Post>> {
        match self.fetch_feed(account, query).await {
            Ok(posts) => Ok(posts),
            Err(source) => Err(ClientError::FeedFetchFailed {
                account: account.clone(),
                source: Box::new(source),
            }),
        }
    }

    async fn fetch_feed(&self, account: &AccountId, query: FeedQuery) -> ClientResult<Vec<Post>> {
        let mut authors = self
            .bounded("ledger read", self.ledger.get_following(account))
            .await?;
        if !authors.contains(account) {
            authors.push(account.clone());
        }

        let ids = self
            .bounded(
                "ledger read",
                self.ledger
                    .posts_by_authors(&authors, query.limit, query.cursor.as_ref()),
            )
            .await?;
        debug!(account = %account.short_id(), posts = ids.len(), "feed ids fetched");

        let mut posts = future::try_join_all(ids.iter().map(|id| self.get_post(*id))).await?;
        // Stable sort: posts with equal timestamps keep retrieval order.
        posts.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        Ok(posts)
    }

    /// Like a post and wait for confirmation.
    ///
    /// On success the cached entry for the post is invalidated before
    /// returning, so the next read refetches fresh counters. On failure
    /// the cache is left untouched.
    pub async fn like_post(&self, id: PostId, signer: &Signer) -> WriteResult<TxConfirmation> {
        match self.like_post_inner(id, signer).await {
            Ok(confirmation) => {
                self.cache.invalidate(id);
                Ok(confirmation)
            }
            Err(e) => {
                warn!(%id, error = %e, "like_post failed");
                Err(WriteError::from(e))
            }
        }
    }

    async fn like_post_inner(&self, id: PostId, signer: &Signer) -> ClientResult<TxConfirmation> {
        let pending = self
            .bounded("ledger submission", self.ledger.submit_like(signer, id))
            .await?;
        let receipt = self
            .bounded("ledger confirmation", self.ledger.await_receipt(&pending))
            .await?;
        debug!(%id, tx = %receipt.tx_hash.short_hex(), "post liked");
        Ok(TxConfirmation {
            tx_hash: receipt.tx_hash,
        })
    }

    /// Follow an account and wait for confirmation. No cache interaction;
    /// the client holds no social-graph state.
    pub async fn follow_account(
        &self,
        account: &AccountId,
        signer: &Signer,
    ) -> WriteResult<TxConfirmation> {
        match self.follow_account_inner(account, signer).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                warn!(account = %account.short_id(), error = %e, "follow_account failed");
                Err(WriteError::from(e))
            }
        }
    }

    async fn follow_account_inner(
        &self,
        account: &AccountId,
        signer: &Signer,
    ) -> ClientResult<TxConfirmation> {
        let pending = self
            .bounded(
                "ledger submission",
                self.ledger.submit_follow(signer, account),
            )
            .await?;
        let receipt = self
            .bounded("ledger confirmation", self.ledger.await_receipt(&pending))
            .await?;
        debug!(account = %account.short_id(), tx = %receipt.tx_hash.short_hex(), "account followed");
        Ok(TxConfirmation {
            tx_hash: receipt.tx_hash,
        })
    }

    /// Run one external call under the configured deadline.
    async fn bounded<T, E, F>(&self, op: &'static str, fut: F) -> ClientResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ClientError>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(ClientError::Timeout {
                op,
                after: self.op_timeout,
            }),
        }
    }

    // ---- Accessors ----

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn cache(&self) -> &PostCache {
        &self.cache
    }
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
