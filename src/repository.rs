use crate::models::{Content, CreateContentRequest, NewUser, UpdateContentRequest, User};
use crate::query::ContentScope;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// RepoError
///
/// Failures the write path must distinguish. Everything else on the read path
/// is logged and collapsed into an empty/absent result, matching how the
/// store is consumed by the handlers.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Unique-violation on users.email.
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The abstract contract for all persistence operations, covering the
/// credential store (users) and the content store. Handlers interact with
/// this trait only, so tests can substitute an in-memory implementation.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential store ---
    /// Inserts a new identity record. The email must already be normalized
    /// and the password already hashed.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;
    async fn get_user(&self, id: Uuid) -> Option<User>;
    /// Lookup by the normalized email key.
    async fn find_user_by_email(&self, email: &str) -> Option<User>;

    // --- Content store, read path ---
    /// The access-filtered listing: visibility scope first, then the optional
    /// search narrowing, ordered by id ascending, sliced by limit/offset.
    async fn list_content(
        &self,
        scope: ContentScope,
        search: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Vec<Content>;
    /// Total row count under the same scope and search filters.
    async fn count_content(&self, scope: ContentScope, search: Option<String>) -> i64;
    /// Raw fetch by id, no visibility check; callers apply `can_access`.
    async fn get_content(&self, id: i64) -> Option<Content>;

    // --- Content store, write path ---
    /// Inserts a row owned by `author_id` (always the authenticated requester).
    async fn create_content(
        &self,
        author_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, RepoError>;
    /// Partial update via COALESCE; refreshes updated_at. None when the row
    /// vanished between the caller's access check and this statement.
    async fn update_content(&self, id: i64, req: UpdateContentRequest) -> Option<Content>;
    /// Deletes the row and returns it, so the caller can run the post-delete
    /// document cleanup hook against the returned `document` key.
    async fn delete_content(&self, id: i64) -> Option<Content>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, phone, address, city, state, \
     country, pincode, is_staff, is_superuser, is_author, is_active, date_joined";

const CONTENT_COLUMNS: &str =
    "id, author_id, title, body, summary, categories, document, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL connection pool. Queries are runtime-bound so the crate builds
/// without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the visibility scope and the optional search narrowing to a query
/// under construction. Used identically by the listing and the count so the
/// two can never disagree about which rows are in play.
///
/// The scope is applied before the search term: a non-staff requester's
/// search runs only over their own rows.
fn push_filters(builder: &mut QueryBuilder<Postgres>, scope: ContentScope, search: Option<&str>) {
    if let ContentScope::AuthoredBy(author_id) = scope {
        builder.push(" AND author_id = ");
        builder.push_bind(author_id);
    }

    if let Some(term) = search {
        // Case-insensitive literal substring across all four text fields;
        // like_pattern escapes any LIKE metacharacters in the term.
        let pattern = crate::query::like_pattern(term);
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR body ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR summary ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR categories ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// create_user
    ///
    /// Inserts the identity record, mapping the unique-violation on email to
    /// `RepoError::DuplicateEmail` so the handler can answer 400 instead of 500.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, email, password_hash, full_name, phone, address, city, state, \
             country, pincode, is_staff, is_superuser, is_author, is_active, date_joined) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, NOW()) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.full_name)
            .bind(user.phone)
            .bind(user.address)
            .bind(user.city)
            .bind(user.state)
            .bind(user.country)
            .bind(user.pincode)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .bind(user.is_author)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false)
                {
                    RepoError::DuplicateEmail
                } else {
                    tracing::error!("create_user error: {:?}", e);
                    RepoError::Database(e)
                }
            })
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_user error: {:?}", e);
                None
            })
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("find_user_by_email error: {:?}", e);
                None
            })
    }

    /// list_content
    ///
    /// The query engine's data path. The scope filter is part of the base
    /// query and applied unconditionally; ORDER BY id ASC keeps page
    /// boundaries stable across requests.
    async fn list_content(
        &self,
        scope: ContentScope,
        search: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Vec<Content> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE 1 = 1"
        ));
        push_filters(&mut builder, scope, search.as_deref());
        builder.push(" ORDER BY id ASC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        match builder.build_query_as::<Content>().fetch_all(&self.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("list_content error: {:?}", e);
                vec![]
            }
        }
    }

    async fn count_content(&self, scope: ContentScope, search: Option<String>) -> i64 {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM contents WHERE 1 = 1");
        push_filters(&mut builder, scope, search.as_deref());

        match builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("count_content error: {:?}", e);
                0
            }
        }
    }

    async fn get_content(&self, id: i64) -> Option<Content> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1");
        sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_content error: {:?}", e);
                None
            })
    }

    async fn create_content(
        &self,
        author_id: Uuid,
        req: CreateContentRequest,
    ) -> Result<Content, RepoError> {
        let sql = format!(
            "INSERT INTO contents (author_id, title, body, summary, categories, document, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) \
             RETURNING {CONTENT_COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&sql)
            .bind(author_id)
            .bind(req.title)
            .bind(req.body)
            .bind(req.summary)
            .bind(req.categories)
            .bind(req.document)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("create_content error: {:?}", e);
                RepoError::Database(e)
            })
    }

    /// update_content
    ///
    /// COALESCE keeps every column whose corresponding request field is None,
    /// implementing the partial-update contract in one statement; updated_at
    /// is refreshed on every successful pass.
    async fn update_content(&self, id: i64, req: UpdateContentRequest) -> Option<Content> {
        let sql = format!(
            "UPDATE contents SET \
                title = COALESCE($2, title), \
                body = COALESCE($3, body), \
                summary = COALESCE($4, summary), \
                categories = COALESCE($5, categories), \
                document = COALESCE($6, document), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.body)
            .bind(req.summary)
            .bind(req.categories)
            .bind(req.document)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_content error: {:?}", e);
                None
            })
    }

    /// delete_content
    ///
    /// Returns the deleted row so the handler can fire the best-effort
    /// document cleanup hook. The row delete commits regardless of what the
    /// hook later does.
    async fn delete_content(&self, id: i64) -> Option<Content> {
        let sql = format!("DELETE FROM contents WHERE id = $1 RETURNING {CONTENT_COLUMNS}");
        sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("delete_content error: {:?}", e);
                None
            })
    }
}
