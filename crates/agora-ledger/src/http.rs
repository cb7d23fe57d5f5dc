use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use agora_types::{AccountId, ContentAddress, FeedCursor, PostId, Signer, TxHash};

use crate::error::{LedgerError, LedgerResult};
use crate::records::{LedgerEvent, PendingTx, PostRecord, TxReceipt};
use crate::traits::{LedgerReader, LedgerWriter};

/// HTTP endpoint paths exposed by a ledger node.
pub mod endpoints {
    pub const REGISTRY: &str = "/v1/registry";
    pub const TX: &str = "/v1/tx";
}

/// How often the binding polls for a confirmation.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The registry's wire sentinel for "no parent post".
const NO_REPLY: u64 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct PostRecordDto {
    author: String,
    content_address: String,
    reply_to: u64,
    like_count: u64,
    repost_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct FollowingDto {
    accounts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PostIdsDto {
    ids: Vec<u64>,
}

/// Signed operation payload. The signature in the envelope covers these
/// exact serialized bytes, registry included, so an envelope cannot be
/// replayed against another registry.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum TxPayload<'a> {
    CreatePost {
        registry: &'a str,
        content_address: String,
        reply_to: u64,
    },
    LikePost {
        registry: &'a str,
        post_id: u64,
    },
    Follow {
        registry: &'a str,
        account: String,
    },
}

#[derive(Debug, Serialize)]
struct TxEnvelope<'a> {
    account: String,
    payload: &'a str,
    signature: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitResponse {
    tx_hash: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TxStatusDto {
    Pending,
    Confirmed,
    Reverted,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReceiptDto {
    status: TxStatusDto,
    #[serde(default)]
    events: Vec<EventDto>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EventDto {
    PostCreated { post_id: u64, author: String },
    PostLiked { post_id: u64, account: String },
    Followed { follower: String, followee: String },
}

/// Thin HTTP JSON binding to a ledger node.
///
/// Reads hit the registry's query endpoints directly. Writes post a signed
/// envelope and then poll the transaction endpoint until the ledger reports
/// a terminal status; the poll is unbounded here and bounded by the
/// caller's deadline.
pub struct HttpLedger {
    http: reqwest::Client,
    base: String,
    registry: String,
}

impl HttpLedger {
    /// Create a binding to the node at `base_url` for the registry contract
    /// at `registry` (hex address).
    pub fn new(base_url: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base_url.into(),
            registry: registry.into(),
        }
    }

    fn registry_url(&self, path: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base,
            endpoints::REGISTRY,
            self.registry,
            path
        )
    }

    async fn submit_payload(
        &self,
        signer: &Signer,
        payload: &TxPayload<'_>,
    ) -> LedgerResult<PendingTx> {
        let payload_json = serde_json::to_string(payload)
            .map_err(|e| LedgerError::Rejected(format!("unserializable payload: {e}")))?;
        let signature = signer.sign(payload_json.as_bytes());
        let envelope = TxEnvelope {
            account: signer.account().to_hex(),
            payload: &payload_json,
            signature: signature.to_hex(),
        };

        let response = self
            .http
            .post(self.registry_url("tx"))
            .json(&envelope)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if response.status().is_client_error() {
            return Err(LedgerError::Rejected(format!(
                "node returned {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned {}",
                response.status()
            )));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let tx_hash = TxHash::from_hex(&body.tx_hash).map_err(|e| {
            LedgerError::Unavailable(format!("node returned an unparseable tx hash: {e}"))
        })?;
        debug!(tx = %tx_hash.short_hex(), "transaction submitted");
        Ok(PendingTx { tx_hash })
    }
}

fn parse_account(s: &str, tx_context: Option<TxHash>) -> LedgerResult<AccountId> {
    AccountId::from_hex(s).map_err(|e| match tx_context {
        Some(tx_hash) => LedgerError::MalformedReceipt {
            tx_hash,
            reason: format!("unparseable account: {e}"),
        },
        None => LedgerError::Unavailable(format!("node returned an unparseable account: {e}")),
    })
}

fn event_from_dto(dto: EventDto, tx_hash: TxHash) -> LedgerResult<LedgerEvent> {
    Ok(match dto {
        EventDto::PostCreated { post_id, author } => LedgerEvent::PostCreated {
            post_id: PostId::new(post_id),
            author: parse_account(&author, Some(tx_hash))?,
        },
        EventDto::PostLiked { post_id, account } => LedgerEvent::PostLiked {
            post_id: PostId::new(post_id),
            account: parse_account(&account, Some(tx_hash))?,
        },
        EventDto::Followed { follower, followee } => LedgerEvent::Followed {
            follower: parse_account(&follower, Some(tx_hash))?,
            followee: parse_account(&followee, Some(tx_hash))?,
        },
    })
}

#[async_trait::async_trait]
impl LedgerReader for HttpLedger {
    async fn get_post(&self, id: PostId) -> LedgerResult<PostRecord> {
        let url = self.registry_url(&format!("posts/{}", id.as_u64()));
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LedgerError::UnknownPost(id));
        }
        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned {}",
                response.status()
            )));
        }

        let dto: PostRecordDto = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        Ok(PostRecord {
            author: parse_account(&dto.author, None)?,
            content_address: ContentAddress::from_hex(&dto.content_address).map_err(|e| {
                LedgerError::Unavailable(format!("node returned an unparseable address: {e}"))
            })?,
            reply_to: (dto.reply_to != NO_REPLY).then(|| PostId::new(dto.reply_to)),
            like_count: dto.like_count,
            repost_count: dto.repost_count,
        })
    }

    async fn get_following(&self, account: &AccountId) -> LedgerResult<Vec<AccountId>> {
        let url = self.registry_url(&format!("following/{}", account.to_hex()));
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        // An account with no edges is not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned {}",
                response.status()
            )));
        }

        let dto: FollowingDto = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        dto.accounts
            .iter()
            .map(|s| parse_account(s, None))
            .collect()
    }

    async fn posts_by_authors(
        &self,
        authors: &[AccountId],
        limit: usize,
        cursor: Option<&FeedCursor>,
    ) -> LedgerResult<Vec<PostId>> {
        let joined = authors
            .iter()
            .map(AccountId::to_hex)
            .collect::<Vec<_>>()
            .join(",");
        let mut query = vec![("authors", joined), ("limit", limit.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.as_str().to_string()));
        }

        let response = self
            .http
            .get(self.registry_url("posts"))
            .query(&query)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LedgerError::Unavailable(format!(
                "node returned {}",
                response.status()
            )));
        }

        let dto: PostIdsDto = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        Ok(dto.ids.into_iter().map(PostId::new).collect())
    }
}

#[async_trait::async_trait]
impl LedgerWriter for HttpLedger {
    async fn submit_create_post(
        &self,
        signer: &Signer,
        content_address: &ContentAddress,
        reply_to: Option<PostId>,
    ) -> LedgerResult<PendingTx> {
        self.submit_payload(
            signer,
            &TxPayload::CreatePost {
                registry: &self.registry,
                content_address: content_address.to_hex(),
                reply_to: reply_to.map_or(NO_REPLY, |id| id.as_u64()),
            },
        )
        .await
    }

    async fn submit_like(&self, signer: &Signer, post: PostId) -> LedgerResult<PendingTx> {
        self.submit_payload(
            signer,
            &TxPayload::LikePost {
                registry: &self.registry,
                post_id: post.as_u64(),
            },
        )
        .await
    }

    async fn submit_follow(
        &self,
        signer: &Signer,
        account: &AccountId,
    ) -> LedgerResult<PendingTx> {
        self.submit_payload(
            signer,
            &TxPayload::Follow {
                registry: &self.registry,
                account: account.to_hex(),
            },
        )
        .await
    }

    async fn await_receipt(&self, pending: &PendingTx) -> LedgerResult<TxReceipt> {
        let url = format!(
            "{}{}/{}",
            self.base,
            endpoints::TX,
            pending.tx_hash.to_hex()
        );
        loop {
            let response = self
                .http
                .get(&url)
                .send()
                .await
                .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(LedgerError::UnknownTx(pending.tx_hash));
            }
            if !response.status().is_success() {
                return Err(LedgerError::Unavailable(format!(
                    "node returned {}",
                    response.status()
                )));
            }

            let dto: ReceiptDto = response
                .json()
                .await
                .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
            match dto.status {
                TxStatusDto::Pending => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
                TxStatusDto::Reverted => {
                    return Err(LedgerError::Reverted {
                        tx_hash: pending.tx_hash,
                        reason: dto.reason.unwrap_or_else(|| "no reason given".into()),
                    })
                }
                TxStatusDto::Confirmed => {
                    let events = dto
                        .events
                        .into_iter()
                        .map(|e| event_from_dto(e, pending.tx_hash))
                        .collect::<LedgerResult<Vec<_>>>()?;
                    debug!(tx = %pending.tx_hash.short_hex(), "transaction confirmed");
                    return Ok(TxReceipt {
                        tx_hash: pending.tx_hash,
                        events,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_tagged_snake_case() {
        let payload = TxPayload::LikePost {
            registry: "0xabc",
            post_id: 7,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"op":"like_post","registry":"0xabc","post_id":7}"#);
    }

    #[test]
    fn create_payload_uses_zero_sentinel_for_no_reply() {
        let payload = TxPayload::CreatePost {
            registry: "0xabc",
            content_address: "aa".into(),
            reply_to: NO_REPLY,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""reply_to":0"#));
    }

    #[test]
    fn status_deserializes_lowercase() {
        let status: TxStatusDto = serde_json::from_str("\"reverted\"").unwrap();
        assert_eq!(status, TxStatusDto::Reverted);
    }

    #[test]
    fn receipt_defaults_events_and_reason() {
        let dto: ReceiptDto = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(dto.events.is_empty());
        assert!(dto.reason.is_none());
    }

    #[test]
    fn event_dto_maps_to_ledger_event() {
        let author = AccountId::ephemeral();
        let dto: EventDto = serde_json::from_str(&format!(
            r#"{{"kind":"post_created","post_id":3,"author":"{}"}}"#,
            author.to_hex()
        ))
        .unwrap();
        let event = event_from_dto(dto, TxHash::from_hash([0; 32])).unwrap();
        assert_eq!(
            event,
            LedgerEvent::PostCreated {
                post_id: PostId::new(3),
                author,
            }
        );
    }

    #[test]
    fn malformed_event_account_is_malformed_receipt() {
        let dto = EventDto::PostCreated {
            post_id: 1,
            author: "not-hex".into(),
        };
        let err = event_from_dto(dto, TxHash::from_hash([9; 32])).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedReceipt { .. }));
    }

    #[test]
    fn envelope_serializes_flat() {
        let envelope = TxEnvelope {
            account: "aa".into(),
            payload: r#"{"op":"follow"}"#,
            signature: "bb".into(),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""account":"aa""#));
        assert!(json.contains(r#""signature":"bb""#));
    }
}
