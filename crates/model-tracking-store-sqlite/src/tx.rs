// crates/model-tracking-store-sqlite/src/tx.rs
// ============================================================================
// Module: SQLite Transaction Wrapper
// Description: Fresh, borrowed, and spent transaction handles.
// Purpose: Let nested operations share one transaction with one finalizer.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! A [`Txable`] either owns a connection and will begin a real immediate
//! transaction, borrows a transaction that is already open, or has been
//! spent. Only the owner of a real transaction commits it; a borrowed handle
//! commits as a no-op so the outermost caller decides. Dropping an
//! uncommitted owned transaction rolls it back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::mem;
use std::ops::Deref;

use rusqlite::Connection;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;

use crate::store::SqliteStoreError;

// ============================================================================
// SECTION: Txable
// ============================================================================

/// Internal state of a [`Txable`].
#[derive(Debug)]
enum TxableState<'c> {
    /// Owns a connection; `begin` opens a real transaction.
    Fresh(&'c mut Connection),
    /// Wraps a transaction opened elsewhere.
    Borrowed(&'c Connection),
    /// Already handed out.
    Spent,
}

/// A source of at most one transaction.
///
/// # Invariants
/// - [`Txable::begin`] succeeds at most once; later calls fail with
///   [`SqliteStoreError::TransactionSpent`].
#[derive(Debug)]
pub struct Txable<'c> {
    /// Current state.
    state: TxableState<'c>,
}

impl<'c> Txable<'c> {
    /// Wraps a connection that will begin its own transaction.
    #[must_use]
    pub const fn fresh(connection: &'c mut Connection) -> Self {
        Self {
            state: TxableState::Fresh(connection),
        }
    }

    /// Wraps a transaction that is already open and owned by a caller.
    #[must_use]
    pub const fn borrowed(transaction: &'c Connection) -> Self {
        Self {
            state: TxableState::Borrowed(transaction),
        }
    }

    /// Returns true once the handle has been spent.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        matches!(self.state, TxableState::Spent)
    }

    /// Hands out the transaction, leaving the handle spent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::TransactionSpent`] when called twice and
    /// [`SqliteStoreError::Db`] when `SQLite` cannot begin a transaction.
    pub fn begin(&mut self) -> Result<Tx<'c>, SqliteStoreError> {
        match mem::replace(&mut self.state, TxableState::Spent) {
            TxableState::Fresh(connection) => connection
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map(Tx::Owned)
                .map_err(|err| SqliteStoreError::Db(err.to_string())),
            TxableState::Borrowed(connection) => Ok(Tx::Borrowed(connection)),
            TxableState::Spent => Err(SqliteStoreError::TransactionSpent),
        }
    }
}

// ============================================================================
// SECTION: Tx
// ============================================================================

/// An open transaction, owned or borrowed.
#[derive(Debug)]
pub enum Tx<'c> {
    /// Real transaction; rolls back on drop unless committed.
    Owned(Transaction<'c>),
    /// Transaction owned by an outer caller.
    Borrowed(&'c Connection),
}

impl Tx<'_> {
    /// Returns true when this handle owns the underlying transaction.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Commits an owned transaction; borrowed handles commit as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Db`] when the commit fails.
    pub fn commit(self) -> Result<(), SqliteStoreError> {
        match self {
            Self::Owned(transaction) => {
                transaction.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
            }
            Self::Borrowed(_) => Ok(()),
        }
    }

    /// Rolls back an owned transaction; borrowed handles roll back as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Db`] when the rollback fails.
    pub fn rollback(self) -> Result<(), SqliteStoreError> {
        match self {
            Self::Owned(transaction) => {
                transaction.rollback().map_err(|err| SqliteStoreError::Db(err.to_string()))
            }
            Self::Borrowed(_) => Ok(()),
        }
    }
}

impl Deref for Tx<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Self::Owned(transaction) => transaction,
            Self::Borrowed(connection) => connection,
        }
    }
}
