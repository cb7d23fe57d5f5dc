use agora_types::{ContentAddress, PostId, TxHash};

/// What a caller wants to publish.
///
/// The ledger assigns the post id; the draft never carries one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDraft {
    /// Post text.
    pub text: String,
    /// Ordered references to already-stored attachment blobs.
    pub attachments: Vec<ContentAddress>,
    /// Parent post, when publishing a reply.
    pub reply_to: Option<PostId>,
}

impl PostDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
            reply_to: None,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<ContentAddress>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn in_reply_to(mut self, parent: PostId) -> Self {
        self.reply_to = Some(parent);
        self
    }
}

/// Successful outcome of a post creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedPost {
    /// Id assigned by the ledger's creation event.
    pub id: PostId,
    /// Where the content record landed in the blob store.
    pub content_address: ContentAddress,
    /// The confirmed creation transaction.
    pub tx_hash: TxHash,
}

/// Successful outcome of a like or follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxConfirmation {
    pub tx_hash: TxHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_builder_fills_fields() {
        let attachment = ContentAddress::from_bytes(b"image");
        let draft = PostDraft::new("hello")
            .with_attachments(vec![attachment])
            .in_reply_to(PostId::new(5));
        assert_eq!(draft.text, "hello");
        assert_eq!(draft.attachments, vec![attachment]);
        assert_eq!(draft.reply_to, Some(PostId::new(5)));
    }

    #[test]
    fn draft_defaults_to_top_level_post() {
        let draft = PostDraft::new("standalone");
        assert!(draft.attachments.is_empty());
        assert_eq!(draft.reply_to, None);
    }
}
