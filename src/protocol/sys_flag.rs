//! Helpers for the message system-flag bitfield.
//!
//! Bits 2 and 3 encode the transaction type of a message. The remaining bits
//! carry compression and batching markers that the dispatcher never reads.

/// Body is compressed.
pub const COMPRESSED_FLAG: i32 = 0x1;
/// Message is part of a multi-tag set.
pub const MULTI_TAGS_FLAG: i32 = 0x1 << 1;
/// Plain, non-transactional message.
pub const TRANSACTION_NOT_TYPE: i32 = 0;
/// First phase of a two-phase commit: staged but not yet visible.
pub const TRANSACTION_PREPARED_TYPE: i32 = 0x1 << 2;
/// Commit of a previously prepared message.
pub const TRANSACTION_COMMIT_TYPE: i32 = 0x2 << 2;
/// Rollback of a previously prepared message. Doubles as the type mask.
pub const TRANSACTION_ROLLBACK_TYPE: i32 = 0x3 << 2;
/// Message was sent through the batch path.
pub const BATCH_FLAG: i32 = 0x1 << 4;

/// Extract the transaction-type bits from `flag`.
#[must_use]
pub const fn transaction_value(flag: i32) -> i32 { flag & TRANSACTION_ROLLBACK_TYPE }

/// Replace the transaction-type bits of `flag` with `transaction_type`.
#[must_use]
pub const fn reset_transaction_value(flag: i32, transaction_type: i32) -> i32 {
    (flag & !TRANSACTION_ROLLBACK_TYPE) | transaction_type
}

/// Transaction type decoded from a system-flag bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
    /// Not part of a transaction.
    NotType,
    /// Staged half message.
    Prepared,
    /// Commit request.
    Commit,
    /// Rollback request.
    Rollback,
}

impl TransactionType {
    /// Decode the transaction type carried by `flag`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::protocol::{TransactionType, sys_flag};
    ///
    /// let flag = sys_flag::COMPRESSED_FLAG | sys_flag::TRANSACTION_PREPARED_TYPE;
    /// assert_eq!(TransactionType::from_sys_flag(flag), TransactionType::Prepared);
    /// ```
    #[must_use]
    pub const fn from_sys_flag(flag: i32) -> Self {
        match transaction_value(flag) {
            TRANSACTION_PREPARED_TYPE => Self::Prepared,
            TRANSACTION_COMMIT_TYPE => Self::Commit,
            TRANSACTION_ROLLBACK_TYPE => Self::Rollback,
            _ => Self::NotType,
        }
    }

    /// Return the raw bit pattern for this transaction type.
    #[must_use]
    pub const fn bits(self) -> i32 {
        match self {
            Self::NotType => TRANSACTION_NOT_TYPE,
            Self::Prepared => TRANSACTION_PREPARED_TYPE,
            Self::Commit => TRANSACTION_COMMIT_TYPE,
            Self::Rollback => TRANSACTION_ROLLBACK_TYPE,
        }
    }
}
