use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use agora_types::{AccountId, ContentAddress, FeedCursor, PostId, Signer, TxHash};

use crate::error::{LedgerError, LedgerResult};
use crate::records::{LedgerEvent, PendingTx, PostRecord, TxReceipt};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory post registry for tests, local demos, and embedding.
///
/// Writes are two-phase like the real ledger: `submit_*` parks the
/// operation under its transaction hash, and nothing touches registry state
/// until `await_receipt` applies it. Post ids are assigned sequentially at
/// confirmation, starting from 1. Cursor tokens minted by this ledger are
/// decimal post ids meaning "resume strictly below"; any other token
/// restarts from the newest post. Call counters and failure toggles let
/// tests observe and disturb the facade's traffic.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
    get_post_calls: AtomicU64,
    offline: AtomicBool,
    reject_writes: AtomicBool,
    revert_writes: AtomicBool,
    omit_creation_event: AtomicBool,
}

#[derive(Default)]
struct LedgerState {
    posts: BTreeMap<u64, PostRecord>,
    following: HashMap<AccountId, Vec<AccountId>>,
    pending: HashMap<TxHash, PendingOp>,
    next_post_id: u64,
    next_tx_nonce: u64,
}

enum PendingOp {
    CreatePost {
        author: AccountId,
        content_address: ContentAddress,
        reply_to: Option<PostId>,
    },
    Like {
        account: AccountId,
        post: PostId,
    },
    Follow {
        follower: AccountId,
        followee: AccountId,
    },
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
            get_post_calls: AtomicU64::new(0),
            offline: AtomicBool::new(false),
            reject_writes: AtomicBool::new(false),
            revert_writes: AtomicBool::new(false),
            omit_creation_event: AtomicBool::new(false),
        }
    }

    /// Number of confirmed posts.
    pub fn post_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").posts.len()
    }

    /// Number of submitted-but-unconfirmed transactions.
    pub fn pending_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").pending.len()
    }

    /// Number of `get_post` calls observed so far.
    pub fn get_post_count(&self) -> u64 {
        self.get_post_calls.load(Ordering::Relaxed)
    }

    /// Make every subsequent call fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    /// Refuse every subsequent submission with `Rejected`.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    /// Revert every subsequent confirmation, dropping its effects.
    pub fn set_revert_writes(&self, revert: bool) {
        self.revert_writes.store(revert, Ordering::Relaxed);
    }

    /// Confirm creations without emitting the creation event.
    pub fn set_omit_creation_event(&self, omit: bool) {
        self.omit_creation_event.store(omit, Ordering::Relaxed);
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(LedgerError::Unavailable("ledger is offline".into()));
        }
        Ok(())
    }

    fn submit(&self, op: PendingOp, tag: &str) -> LedgerResult<PendingTx> {
        self.check_online()?;
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(LedgerError::Rejected("submission refused by node".into()));
        }
        let mut state = self.inner.write().expect("lock poisoned");
        let tx_hash = mint_tx_hash(&mut state, tag);
        state.pending.insert(tx_hash, op);
        Ok(PendingTx { tx_hash })
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        tx_hash: TxHash,
        op: PendingOp,
    ) -> LedgerResult<TxReceipt> {
        let events = match op {
            PendingOp::CreatePost {
                author,
                content_address,
                reply_to,
            } => {
                state.next_post_id += 1;
                let post_id = PostId::new(state.next_post_id);
                state.posts.insert(
                    post_id.as_u64(),
                    PostRecord {
                        author: author.clone(),
                        content_address,
                        reply_to,
                        like_count: 0,
                        repost_count: 0,
                    },
                );
                if self.omit_creation_event.load(Ordering::Relaxed) {
                    vec![]
                } else {
                    vec![LedgerEvent::PostCreated { post_id, author }]
                }
            }
            PendingOp::Like { account, post } => {
                let record =
                    state
                        .posts
                        .get_mut(&post.as_u64())
                        .ok_or_else(|| LedgerError::Reverted {
                            tx_hash,
                            reason: format!("like of unknown post {post}"),
                        })?;
                record.like_count += 1;
                vec![LedgerEvent::PostLiked {
                    post_id: post,
                    account,
                }]
            }
            PendingOp::Follow { follower, followee } => {
                let edges = state.following.entry(follower.clone()).or_default();
                if !edges.contains(&followee) {
                    edges.push(followee.clone());
                }
                vec![LedgerEvent::Followed { follower, followee }]
            }
        };
        Ok(TxReceipt { tx_hash, events })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn get_post(&self, id: PostId) -> LedgerResult<PostRecord> {
        self.get_post_calls.fetch_add(1, Ordering::Relaxed);
        self.check_online()?;
        let state = self.inner.read().expect("lock poisoned");
        state
            .posts
            .get(&id.as_u64())
            .cloned()
            .ok_or(LedgerError::UnknownPost(id))
    }

    async fn get_following(&self, account: &AccountId) -> LedgerResult<Vec<AccountId>> {
        self.check_online()?;
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.following.get(account).cloned().unwrap_or_default())
    }

    async fn posts_by_authors(
        &self,
        authors: &[AccountId],
        limit: usize,
        cursor: Option<&FeedCursor>,
    ) -> LedgerResult<Vec<PostId>> {
        self.check_online()?;
        let authors: HashSet<&AccountId> = authors.iter().collect();
        // Tokens this ledger mints are decimal post ids; anything else
        // restarts from the newest post.
        let below = cursor.and_then(|c| c.as_str().parse::<u64>().ok());

        let state = self.inner.read().expect("lock poisoned");
        let ids = state
            .posts
            .iter()
            .rev()
            .filter(|(id, _)| below.map_or(true, |bound| **id < bound))
            .filter(|(_, record)| authors.contains(&record.author))
            .take(limit)
            .map(|(id, _)| PostId::new(*id))
            .collect();
        Ok(ids)
    }
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn submit_create_post(
        &self,
        signer: &Signer,
        content_address: &ContentAddress,
        reply_to: Option<PostId>,
    ) -> LedgerResult<PendingTx> {
        self.submit(
            PendingOp::CreatePost {
                author: signer.account(),
                content_address: *content_address,
                reply_to,
            },
            "create-post",
        )
    }

    async fn submit_like(&self, signer: &Signer, post: PostId) -> LedgerResult<PendingTx> {
        self.submit(
            PendingOp::Like {
                account: signer.account(),
                post,
            },
            "like",
        )
    }

    async fn submit_follow(
        &self,
        signer: &Signer,
        account: &AccountId,
    ) -> LedgerResult<PendingTx> {
        self.submit(
            PendingOp::Follow {
                follower: signer.account(),
                followee: account.clone(),
            },
            "follow",
        )
    }

    async fn await_receipt(&self, pending: &PendingTx) -> LedgerResult<TxReceipt> {
        self.check_online()?;
        let mut state = self.inner.write().expect("lock poisoned");
        let op = state
            .pending
            .remove(&pending.tx_hash)
            .ok_or(LedgerError::UnknownTx(pending.tx_hash))?;
        if self.revert_writes.load(Ordering::Relaxed) {
            return Err(LedgerError::Reverted {
                tx_hash: pending.tx_hash,
                reason: "forced revert".into(),
            });
        }
        self.apply(&mut state, pending.tx_hash, op)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("post_count", &self.post_count())
            .field("pending_count", &self.pending_count())
            .finish()
    }
}

fn mint_tx_hash(state: &mut LedgerState, tag: &str) -> TxHash {
    state.next_tx_nonce += 1;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"agora-tx-v1:");
    hasher.update(tag.as_bytes());
    hasher.update(b":");
    hasher.update(&state.next_tx_nonce.to_le_bytes());
    TxHash::from_hash(*hasher.finalize().as_bytes())
}
