//! Ledger state and the connect/disconnect transaction algorithm (§4.1).

pub mod connect;
pub mod connectors;
pub mod errors;
pub mod journal;
pub mod state;
pub mod view;

pub use connect::{connect_transaction, ConnectOutcome};
pub use errors::{ConnectError, DisconnectError};
pub use journal::{Journal, Op};
pub use view::{LedgerConfig, LedgerView, METAMASK_SIGNATURE_FORK};
