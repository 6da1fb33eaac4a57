use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, accounts, transactions};

use super::Engine;

/// Generates `find_*_owned` and `require_*_owned` methods for an entity owned
/// by a user. A row owned by someone else is reported exactly like a missing
/// one.
macro_rules! impl_owned_by_user {
    (
        $find_fn:ident,
        $require_fn:ident,
        $entity:path,
        $model:path,
        $user_col:expr,
        $err_msg:literal
    ) => {
        pub(super) async fn $find_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<Option<$model>> {
            <$entity>::find_by_id(id.to_string())
                .filter($user_col.eq(user_id.to_string()))
                .one(db)
                .await
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: &str,
        ) -> ResultEngine<$model> {
            self.$find_fn(db, id, user_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_by_user!(
        find_account_owned,
        require_account_owned,
        accounts::Entity,
        accounts::Model,
        accounts::Column::UserId,
        "account not exists"
    );

    impl_owned_by_user!(
        find_transaction_owned,
        require_transaction_owned,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );
}
