use async_trait::async_trait;
use campusnet_sdk::{User, UserFilter, UserSummary, UserType};
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db::{db_err, unique_or_db_err};
use super::entity::{connection, connection_request, user};
use super::mapper::{new_user_active_model, profile_active_model};
use crate::domain::error::DomainError;
use crate::domain::repos::{StoredUser, UserListQuery, UserTypeCounts, UsersRepository};

pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `%term%` with LIKE wildcards in `term` escaped by backslash.
pub(super) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Substring match on any of `columns`, which must hold lowercased text.
fn search_condition(term: &str, columns: &[user::Column]) -> Condition {
    let pattern = like_pattern(term);
    columns.iter().fold(Condition::any(), |cond, col| {
        cond.add(
            Expr::col((user::Entity, *col)).like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

fn filter_condition(filter: &UserFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(user_type) = filter.user_type {
        cond = cond.add(user::Column::UserType.eq(user_type.as_str()));
    }
    if let Some(term) = filter.search_term() {
        cond = cond.add(search_condition(
            term,
            &[user::Column::NameSearch, user::Column::ProfessionSearch],
        ));
    }
    cond
}

fn to_users(models: Vec<user::Model>) -> Result<Vec<User>, DomainError> {
    models.into_iter().map(User::try_from).collect()
}

fn to_summaries(models: Vec<user::Model>) -> Result<Vec<UserSummary>, DomainError> {
    models
        .into_iter()
        .map(|m| User::try_from(m).map(|u| u.summary()))
        .collect()
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<StoredUser>, DomainError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(StoredUser::try_from)
            .transpose()
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(StoredUser::try_from)
            .transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn insert(&self, user: &StoredUser) -> Result<(), DomainError> {
        new_user_active_model(user)?
            .insert(&self.db)
            .await
            .map_err(|e| unique_or_db_err(e, DomainError::EmailTaken))?;
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), DomainError> {
        profile_active_model(user)?
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(updated_at))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, DomainError> {
        let models = user::Entity::find()
            .filter(user::Column::UserType.eq(user_type.as_str()))
            .order_by_asc(user::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        to_users(models)
    }

    async fn summaries(
        &self,
        ids: &[Uuid],
        filter: &UserFilter,
    ) -> Result<Vec<UserSummary>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .filter(filter_condition(filter))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        to_summaries(models)
    }

    async fn discover(
        &self,
        exclude: &[Uuid],
        filter: &UserFilter,
        limit: u64,
    ) -> Result<Vec<UserSummary>, DomainError> {
        let mut query = user::Entity::find()
            .filter(user::Column::UserType.ne(UserType::Admin.as_str()))
            .filter(filter_condition(filter));
        if !exclude.is_empty() {
            query = query.filter(user::Column::Id.is_not_in(exclude.iter().copied()));
        }
        let models = query
            .order_by_asc(user::Column::Name)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        to_summaries(models)
    }

    async fn count_by_type(&self) -> Result<UserTypeCounts, DomainError> {
        let count = |user_type: UserType| {
            user::Entity::find()
                .filter(user::Column::UserType.eq(user_type.as_str()))
                .count(&self.db)
        };
        Ok(UserTypeCounts {
            students: count(UserType::Student).await.map_err(db_err)?,
            professionals: count(UserType::Professional).await.map_err(db_err)?,
            admins: count(UserType::Admin).await.map_err(db_err)?,
        })
    }

    async fn list_page(&self, query: &UserListQuery) -> Result<(Vec<User>, u64), DomainError> {
        let mut select = user::Entity::find();
        if let Some(user_type) = query.user_type {
            select = select.filter(user::Column::UserType.eq(user_type.as_str()));
        }
        if let Some(term) = query.search.as_deref() {
            select = select.filter(search_condition(
                term,
                &[user::Column::NameSearch, user::Column::Email],
            ));
        }

        let total = select.clone().count(&self.db).await.map_err(db_err)?;
        let models = select
            .order_by_desc(user::Column::CreatedAt)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok((to_users(models)?, total))
    }

    async fn delete_with_relations(&self, id: Uuid) -> Result<bool, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        connection::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(connection::Column::OwnerId.eq(id))
                    .add(connection::Column::PeerId.eq(id)),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        connection_request::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(connection_request::Column::SenderId.eq(id))
                    .add(connection_request::Column::ReceiverId.eq(id)),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        let deleted = user::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if deleted.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Ok(false);
        }
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
