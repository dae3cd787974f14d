//! PostgreSQL post store.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};

use quill_core::domain::{Post, PostFields, PostFilter};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::post::{self, ActiveModel, Entity as PostEntity};

/// Post store backed by the `posts` table.
///
/// Slug uniqueness is enforced by the table's unique index.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    fn filtered(filter: &PostFilter) -> Select<PostEntity> {
        PostEntity::find()
            .filter(condition(filter))
            .order_by_asc(post::Column::Id)
    }
}

fn condition(filter: &PostFilter) -> Condition {
    let mut cond = Condition::all();

    if filter.published_only {
        cond = cond.add(post::Column::Published.eq(true));
    }
    if let Some(author) = &filter.author {
        cond = cond.add(lower(post::Column::Author).eq(author.to_lowercase()));
    }
    if let Some(tag) = &filter.tag {
        cond = cond.add(Expr::cust_with_values(
            "EXISTS (SELECT 1 FROM jsonb_array_elements_text(tags) AS t(tag) WHERE LOWER(t.tag) = $1)",
            [tag.to_lowercase()],
        ));
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        cond = cond.add(
            Condition::any()
                .add(lower_like(post::Column::Title, &pattern))
                .add(lower_like(post::Column::Content, &pattern)),
        );
    }

    cond
}

fn lower(column: post::Column) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

fn lower_like(column: post::Column, pattern: &str) -> SimpleExpr {
    lower(column).like(pattern)
}

/// Escape LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        _ => RepoError::Query(e.to_string()),
    }
}

fn write_err(e: DbErr, slug: &str) -> RepoError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return RepoError::DuplicateSlug(slug.to_string());
    }
    query_err(e)
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, fields: PostFields) -> Result<Post, RepoError> {
        let slug = fields.slug.clone();
        let model = ActiveModel::from_fields(fields)
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, &slug))?;

        tracing::debug!(post_id = model.id, "Inserted post row");
        Ok(model.into())
    }

    async fn get(&self, id: i64) -> Result<Post, RepoError> {
        PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Post, RepoError> {
        PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn update(&self, id: i64, fields: PostFields) -> Result<Post, RepoError> {
        let existing = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)?;

        let slug = fields.slug.clone();
        let mut active = existing.into_active_model();
        active.set_fields(fields, chrono::Utc::now().into());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, &slug))?;
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let select = Self::filtered(filter);

        let total = select.clone().count(&self.db).await.map_err(query_err)?;
        let rows = select
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn find_all(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let rows = Self::filtered(filter)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn increment_views(&self, id: i64) -> Result<i64, RepoError> {
        let rows = PostEntity::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .filter(post::Column::Id.eq(id))
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        rows.first().map(|row| row.views).ok_or(RepoError::NotFound)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
