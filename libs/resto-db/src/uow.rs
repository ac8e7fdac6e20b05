use sea_orm::{DatabaseTransaction, DbErr, EntityTrait};

use crate::Repository;

/// Caller-owned transaction scope.
///
/// Repositories borrowed from a unit of work all share its transaction.
/// Dropping it without calling [`commit`](Self::commit) rolls everything back.
#[derive(Debug)]
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    pub fn new(txn: DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub fn repo<E: EntityTrait>(&self) -> Repository<'_, E, DatabaseTransaction> {
        Repository::new(&self.txn)
    }

    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await?;
        tracing::debug!("unit of work committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await?;
        tracing::debug!("unit of work rolled back");
        Ok(())
    }
}
