//! Ledger boundary for Agora.
//!
//! The ledger is the authoritative record of post metadata, the social
//! graph, and engagement counters, exposed through a fixed post-registry
//! interface. It is an external collaborator: this crate defines the narrow
//! read/write traits the client talks through, the records and receipts
//! crossing that boundary, an in-memory implementation for tests and
//! embedding, and a thin HTTP binding to a ledger node.
//!
//! Writes are two-phase: submission returns a [`PendingTx`] handle, and the
//! effect is durable only once [`LedgerWriter::await_receipt`] confirms it.

pub mod error;
pub mod http;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use http::HttpLedger;
pub use memory::InMemoryLedger;
pub use records::{LedgerEvent, PendingTx, PostRecord, TxReceipt};
pub use traits::{LedgerReader, LedgerWriter};
