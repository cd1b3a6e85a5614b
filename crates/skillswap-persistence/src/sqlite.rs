use crate::store::{MessageStore, RequestQuery, RequestStore, UserStore};
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skillswap_types::{
    running_average, Message, RatingSubmission, RequestId, Result, Review, Side,
    SkillSwapError, SwapRequest, SwapStatus, User, UserId,
};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, info};

const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, skill_offered, skill_wanted, \
     message, status, created_at, from_user_name, from_user_avatar, to_user_name, \
     to_user_avatar, from_user_rated, to_user_rated";

const USER_COLUMNS: &str = "id, name, email, avatar_url, bio, skills_offered, skills_wanted, \
     availability, rating, reviews, created_at";

/// Persistence service for storing data in SQLite
pub struct PersistenceService {
    pool: SqlitePool,
}

impl PersistenceService {
    /// Open (or create) a database file and run migrations
    pub async fn new(database_path: &str) -> AnyResult<Self> {
        let database_url = format!("sqlite:{}?mode=rwc", database_path);
        let pool = SqlitePool::connect(&database_url).await?;

        let service = Self { pool };
        service.run_migrations().await?;

        info!("Persistence service initialized with database: {}", database_path);
        Ok(service)
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> AnyResult<Self> {
        // Every connection to :memory: is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
            .connect("sqlite::memory:")
            .await?;

        let service = Self { pool };
        service.run_migrations().await?;
        Ok(service)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> AnyResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                avatar_url TEXT NOT NULL DEFAULT '',
                bio TEXT NOT NULL DEFAULT '',
                skills_offered TEXT NOT NULL DEFAULT '[]',
                skills_wanted TEXT NOT NULL DEFAULT '[]',
                availability TEXT NOT NULL DEFAULT '',
                rating REAL NOT NULL DEFAULT 0,
                reviews INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS swap_requests (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                from_user_id TEXT NOT NULL,
                to_user_id TEXT NOT NULL,
                skill_offered TEXT NOT NULL,
                skill_wanted TEXT NOT NULL,
                message TEXT,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                from_user_name TEXT NOT NULL,
                from_user_avatar TEXT NOT NULL,
                to_user_name TEXT NOT NULL,
                to_user_avatar TEXT NOT NULL,
                from_user_rated INTEGER NOT NULL DEFAULT 0,
                to_user_rated INTEGER NOT NULL DEFAULT 0,
                CHECK (from_user_id <> to_user_id)
            );

            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT UNIQUE NOT NULL,
                request_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                author_id TEXT NOT NULL,
                author_name TEXT NOT NULL,
                author_avatar TEXT NOT NULL,
                FOREIGN KEY (request_id) REFERENCES swap_requests(id)
            );

            CREATE TABLE IF NOT EXISTS reviews (
                request_id TEXT NOT NULL,
                rater_id TEXT NOT NULL,
                rated_user_id TEXT NOT NULL,
                value INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
                comment TEXT,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (request_id, rater_id)
            );

            CREATE INDEX IF NOT EXISTS idx_requests_from ON swap_requests(from_user_id, status);
            CREATE INDEX IF NOT EXISTS idx_requests_to ON swap_requests(to_user_id, status);
            CREATE INDEX IF NOT EXISTS idx_messages_request ON messages(request_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_reviews_rated ON reviews(rated_user_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PersistenceService {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, avatar_url, bio, skills_offered, skills_wanted,
                               availability, rating, reviews, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(to_json(&user.skills_offered)?)
        .bind(to_json(&user.skills_wanted)?)
        .bind(&user.availability)
        .bind(user.rating)
        .bind(i64::from(user.reviews))
        .bind(user.created_at.timestamp_micros())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                SkillSwapError::Validation(format!("user '{}' already exists", user.id)),
            ),
            Err(e) => Err(SkillSwapError::storage(e)),
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        fetch_user(&self.pool, id.as_str()).await
    }

    async fn save_profile(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, avatar_url = ?, bio = ?, skills_offered = ?, skills_wanted = ?,
                availability = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(to_json(&user.skills_offered)?)
        .bind(to_json(&user.skills_wanted)?)
        .bind(&user.availability)
        .bind(user.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(SkillSwapError::storage)?;

        if result.rows_affected() == 0 {
            return Err(SkillSwapError::not_found("User", &user.id));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(SkillSwapError::storage)?;

        rows.iter().map(user_from_row).collect()
    }
}

#[async_trait]
impl RequestStore for PersistenceService {
    async fn insert_request(&self, request: &SwapRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO swap_requests (id, from_user_id, to_user_id, skill_offered, skill_wanted,
                                       message, status, created_at, from_user_name,
                                       from_user_avatar, to_user_name, to_user_avatar,
                                       from_user_rated, to_user_rated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.id.as_str())
        .bind(request.from_user_id.as_str())
        .bind(request.to_user_id.as_str())
        .bind(&request.skill_offered)
        .bind(&request.skill_wanted)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(request.created_at.timestamp_micros())
        .bind(&request.from_user_name)
        .bind(&request.from_user_avatar)
        .bind(&request.to_user_name)
        .bind(&request.to_user_avatar)
        .bind(request.from_user_rated)
        .bind(request.to_user_rated)
        .execute(&self.pool)
        .await
        .map_err(SkillSwapError::storage)?;

        debug!("Stored swap request {}", request.id);
        Ok(())
    }

    async fn get_request(&self, id: &RequestId) -> Result<Option<SwapRequest>> {
        fetch_request(&self.pool, id.as_str()).await
    }

    async fn find_requests(&self, user: &UserId, query: &RequestQuery) -> Result<Vec<SwapRequest>> {
        let side_clause = match query.side {
            Some(Side::From) => "from_user_id = ?1",
            Some(Side::To) => "to_user_id = ?1",
            None => "(from_user_id = ?1 OR to_user_id = ?1)",
        };
        let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM swap_requests WHERE {side_clause}");
        if !query.statuses.is_empty() {
            let placeholders: Vec<String> = (0..query.statuses.len())
                .map(|i| format!("?{}", i + 2))
                .collect();
            sql.push_str(&format!(" AND status IN ({})", placeholders.join(", ")));
        }
        sql.push_str(" ORDER BY created_at DESC, seq DESC");

        let mut q = sqlx::query(&sql).bind(user.as_str());
        for status in &query.statuses {
            q = q.bind(status.as_str());
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(SkillSwapError::storage)?;

        rows.iter().map(request_from_row).collect()
    }

    async fn update_status(
        &self,
        id: &RequestId,
        expected: SwapStatus,
        next: SwapStatus,
    ) -> Result<SwapRequest> {
        let mut tx = self.pool.begin().await.map_err(SkillSwapError::storage)?;

        let result = sqlx::query("UPDATE swap_requests SET status = ? WHERE id = ? AND status = ?")
            .bind(next.as_str())
            .bind(id.as_str())
            .bind(expected.as_str())
            .execute(&mut *tx)
            .await
            .map_err(SkillSwapError::storage)?;

        let stored = fetch_request(&mut *tx, id.as_str())
            .await?
            .ok_or_else(|| SkillSwapError::not_found("Swap request", id))?;

        if result.rows_affected() == 0 {
            return Err(SkillSwapError::StaleStatus {
                expected,
                actual: stored.status,
            });
        }

        tx.commit().await.map_err(SkillSwapError::storage)?;
        info!("Swap request {} moved {} -> {}", id, expected, next);
        Ok(stored)
    }

    async fn record_rating(&self, rating: &RatingSubmission) -> Result<User> {
        if !(1..=5).contains(&rating.value) {
            return Err(SkillSwapError::Validation(format!(
                "rating must be between 1 and 5, got {}",
                rating.value
            )));
        }

        let (rater_column, rated_column) = match rating.side {
            Side::From => ("from_user_id", "to_user_id"),
            Side::To => ("to_user_id", "from_user_id"),
        };
        let flag_column = rating.side.rated_column();

        let mut tx = self.pool.begin().await.map_err(SkillSwapError::storage)?;

        // Flag check-and-set first: it takes the write lock and makes retries no-ops
        let sql = format!(
            "UPDATE swap_requests SET {flag_column} = 1 \
             WHERE id = ? AND status = 'completed' AND {flag_column} = 0 \
             AND {rater_column} = ? AND {rated_column} = ?"
        );
        let flagged = sqlx::query(&sql)
            .bind(rating.request_id.as_str())
            .bind(rating.rater_id.as_str())
            .bind(rating.rated_user_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(SkillSwapError::storage)?;

        if flagged.rows_affected() == 0 {
            let request = fetch_request(&mut *tx, rating.request_id.as_str()).await?;
            return Err(explain_rejected_rating(rating, request));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO reviews (request_id, rater_id, rated_user_id, value, comment, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(rating.request_id.as_str())
        .bind(rating.rater_id.as_str())
        .bind(rating.rated_user_id.as_str())
        .bind(i64::from(rating.value))
        .bind(&rating.comment)
        .bind(rating.created_at.timestamp_micros())
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(SkillSwapError::AlreadyRated {
                    request: rating.request_id.to_string(),
                    actor: rating.rater_id.to_string(),
                });
            }
            Err(e) => return Err(SkillSwapError::storage(e)),
        }

        let mut rated = fetch_user(&mut *tx, rating.rated_user_id.as_str())
            .await?
            .ok_or_else(|| SkillSwapError::not_found("User", &rating.rated_user_id))?;

        rated.rating = running_average(rated.rating, rated.reviews, rating.value);
        rated.reviews += 1;

        sqlx::query("UPDATE users SET rating = ?, reviews = ? WHERE id = ?")
            .bind(rated.rating)
            .bind(i64::from(rated.reviews))
            .bind(rated.id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(SkillSwapError::storage)?;

        tx.commit().await.map_err(SkillSwapError::storage)?;

        info!(
            "User {} rated {} on {}: value={}, new average={:.2} over {} reviews",
            rating.rater_id, rated.id, rating.request_id, rating.value, rated.rating, rated.reviews
        );
        Ok(rated)
    }

    async fn reviews_for(&self, user: &UserId) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT request_id, rater_id, rated_user_id, value, comment, created_at
            FROM reviews
            WHERE rated_user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(SkillSwapError::storage)?;

        rows.iter()
            .map(|row| {
                let value: i64 = row.try_get("value").map_err(SkillSwapError::storage)?;
                Ok(Review {
                    request_id: RequestId::from(get_string(row, "request_id")?),
                    rater_id: UserId::from(get_string(row, "rater_id")?),
                    rated_user_id: UserId::from(get_string(row, "rated_user_id")?),
                    value: u8::try_from(value).map_err(SkillSwapError::storage)?,
                    comment: row.try_get("comment").map_err(SkillSwapError::storage)?,
                    created_at: get_timestamp(row, "created_at")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl MessageStore for PersistenceService {
    async fn append_message(&self, message: &Message) -> Result<()> {
        // Guarded insert: the session check and the write are one statement
        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, request_id, text, created_at, author_id, author_name,
                                  author_avatar)
            SELECT ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (
                SELECT 1 FROM swap_requests
                WHERE id = ? AND status = 'accepted' AND (from_user_id = ? OR to_user_id = ?)
            )
            "#,
        )
        .bind(message.id.as_str())
        .bind(message.request_id.as_str())
        .bind(&message.text)
        .bind(message.created_at.timestamp_micros())
        .bind(message.author_id.as_str())
        .bind(&message.author_name)
        .bind(&message.author_avatar)
        .bind(message.request_id.as_str())
        .bind(message.author_id.as_str())
        .bind(message.author_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(SkillSwapError::storage)?;

        if result.rows_affected() == 0 {
            let request = fetch_request(&self.pool, message.request_id.as_str())
                .await?
                .ok_or_else(|| SkillSwapError::not_found("Swap request", &message.request_id))?;
            if !request.is_participant(&message.author_id) {
                return Err(SkillSwapError::unauthorized(
                    &message.author_id,
                    "post in a session it is not part of",
                ));
            }
            return Err(SkillSwapError::SessionNotOpen {
                request: request.id.to_string(),
                status: request.status,
            });
        }

        debug!("Stored message {} in {}", message.id, message.request_id);
        Ok(())
    }

    async fn messages_for(&self, request_id: &RequestId) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, request_id, text, created_at, author_id, author_name, author_avatar
            FROM messages
            WHERE request_id = ?
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(request_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(SkillSwapError::storage)?;

        rows.iter()
            .map(|row| {
                Ok(Message {
                    id: get_string(row, "id")?.into(),
                    request_id: get_string(row, "request_id")?.into(),
                    text: get_string(row, "text")?,
                    created_at: get_timestamp(row, "created_at")?,
                    author_id: get_string(row, "author_id")?.into(),
                    author_name: get_string(row, "author_name")?,
                    author_avatar: get_string(row, "author_avatar")?,
                })
            })
            .collect()
    }
}

/// Work out why the guarded rating update touched no row
fn explain_rejected_rating(
    rating: &RatingSubmission,
    request: Option<SwapRequest>,
) -> SkillSwapError {
    let Some(request) = request else {
        return SkillSwapError::not_found("Swap request", &rating.request_id);
    };
    if request.side_of(&rating.rater_id) != Some(rating.side)
        || request.counterpart(&rating.rater_id) != Some(&rating.rated_user_id)
    {
        return SkillSwapError::unauthorized(
            &rating.rater_id,
            format!("rate '{}' on this swap", rating.rated_user_id),
        );
    }
    if request.status != SwapStatus::Completed {
        return SkillSwapError::NotCompleted(request.id.to_string());
    }
    SkillSwapError::AlreadyRated {
        request: request.id.to_string(),
        actor: rating.rater_id.to_string(),
    }
}

async fn fetch_user<'e, E>(executor: E, id: &str) -> Result<Option<User>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(SkillSwapError::storage)?;

    row.as_ref().map(user_from_row).transpose()
}

async fn fetch_request<'e, E>(executor: E, id: &str) -> Result<Option<SwapRequest>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM swap_requests WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(SkillSwapError::storage)?;

    row.as_ref().map(request_from_row).transpose()
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let reviews: i64 = row.try_get("reviews").map_err(SkillSwapError::storage)?;
    Ok(User {
        id: get_string(row, "id")?.into(),
        name: get_string(row, "name")?,
        email: get_string(row, "email")?,
        avatar_url: get_string(row, "avatar_url")?,
        bio: get_string(row, "bio")?,
        skills_offered: from_json(&get_string(row, "skills_offered")?)?,
        skills_wanted: from_json(&get_string(row, "skills_wanted")?)?,
        availability: get_string(row, "availability")?,
        rating: row.try_get("rating").map_err(SkillSwapError::storage)?,
        reviews: u32::try_from(reviews).map_err(SkillSwapError::storage)?,
        created_at: get_timestamp(row, "created_at")?,
    })
}

fn request_from_row(row: &SqliteRow) -> Result<SwapRequest> {
    Ok(SwapRequest {
        id: get_string(row, "id")?.into(),
        from_user_id: get_string(row, "from_user_id")?.into(),
        to_user_id: get_string(row, "to_user_id")?.into(),
        skill_offered: get_string(row, "skill_offered")?,
        skill_wanted: get_string(row, "skill_wanted")?,
        message: row.try_get("message").map_err(SkillSwapError::storage)?,
        status: get_string(row, "status")?.parse()?,
        created_at: get_timestamp(row, "created_at")?,
        from_user_name: get_string(row, "from_user_name")?,
        from_user_avatar: get_string(row, "from_user_avatar")?,
        to_user_name: get_string(row, "to_user_name")?,
        to_user_avatar: get_string(row, "to_user_avatar")?,
        from_user_rated: row.try_get("from_user_rated").map_err(SkillSwapError::storage)?,
        to_user_rated: row.try_get("to_user_rated").map_err(SkillSwapError::storage)?,
    })
}

fn get_string(row: &SqliteRow, column: &str) -> Result<String> {
    row.try_get(column).map_err(SkillSwapError::storage)
}

fn get_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>> {
    let micros: i64 = row.try_get(column).map_err(SkillSwapError::storage)?;
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| SkillSwapError::Storage(format!("invalid timestamp in {column}: {micros}")))
}

fn to_json(skills: &[String]) -> Result<String> {
    serde_json::to_string(skills).map_err(SkillSwapError::storage)
}

fn from_json(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(SkillSwapError::storage)
}
