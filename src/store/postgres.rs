use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};

use super::{
    apply_amount, NewBooking, NewReview, NewSqlLog, NewTransaction, Store, StoreError,
    StoreResult, UpsertUser,
};
use crate::models::{
    booking::BookingStatus,
    review::mean_rating_tenths,
    transaction::booking_payment_description,
    workspace::WorkspaceRow,
    BookingDetails, ReviewDetails, SqlLog, Transaction, User, Workspace, WorkspaceFilter,
};

/// Хранилище поверх PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/* ---------- helpers ---------- */

// Блокирует строку пользователя до конца транзакции: списания одного
// пользователя выполняются строго по очереди.
async fn lock_user(tx: &mut PgTransaction<'_, Postgres>, user_id: i64) -> StoreResult<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::NotFound { entity: "Пользователь", id: user_id })?;
    Ok(())
}

async fn balance_in(tx: &mut PgTransaction<'_, Postgres>, user_id: i64) -> StoreResult<i64> {
    let balance = sqlx::query_scalar::<_, i64>(
        "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM transactions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(balance)
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl Store for PgStore {
    /* ---------- USERS ---------- */

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash, login_method, role, last_signed_in)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'user'::user_role), NOW())
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, users.name),
                login_method = EXCLUDED.login_method,
                role = COALESCE($5, users.role),
                last_signed_in = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.login_method)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /* ---------- WORKSPACES ---------- */

    async fn list_workspaces(&self, filter: &WorkspaceFilter) -> StoreResult<Vec<Workspace>> {
        let search = filter.search_term().map(|t| like_pattern(&t));

        let mut q = String::from("SELECT * FROM workspaces WHERE TRUE");
        let mut bind_idx = 1;
        if filter.kind.is_some() {
            q.push_str(&format!(" AND type = ${}", bind_idx));
            bind_idx += 1;
        }
        if search.is_some() {
            q.push_str(&format!(
                " AND (name ILIKE ${0} OR description ILIKE ${0})",
                bind_idx
            ));
        }
        q.push_str(" ORDER BY rating_tenths DESC, id");

        let mut dbq = sqlx::query_as::<_, WorkspaceRow>(&q);
        if let Some(kind) = filter.kind {
            dbq = dbq.bind(kind);
        }
        if let Some(pattern) = search {
            dbq = dbq.bind(pattern);
        }

        let rows = dbq.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Workspace::from).collect())
    }

    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>> {
        let row = sqlx::query_as::<_, WorkspaceRow>("SELECT * FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Workspace::from))
    }

    /* ---------- BOOKINGS ---------- */

    async fn user_bookings(&self, user_id: i64) -> StoreResult<Vec<BookingDetails>> {
        let rows = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.*,
                   w.name AS workspace_name,
                   w.type AS workspace_type,
                   w.image_url AS workspace_image
            FROM bookings b
            LEFT JOIN workspaces w ON w.id = b.workspace_id
            WHERE b.user_id = $1
            ORDER BY b.start_time DESC, b.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_paid_booking(&self, booking: NewBooking) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        // 1) Блокируем пользователя и проверяем баланс
        lock_user(&mut tx, booking.user_id).await?;
        let balance = balance_in(&mut tx, booking.user_id).await?;
        apply_amount(balance, -booking.total_price)?;

        // 2) Бронь сразу подтверждена и оплачена
        let booking_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO bookings
                (workspace_id, user_id, start_time, end_time, status, total_price, payment_status, notes)
            VALUES ($1, $2, $3, $4, 'confirmed', $5, 'paid', $6)
            RETURNING id
            "#,
        )
        .bind(booking.workspace_id)
        .bind(booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.total_price)
        .bind(&booking.notes)
        .fetch_one(&mut *tx)
        .await?;

        // 3) Списание в журнал
        sqlx::query(
            r#"
            INSERT INTO transactions (user_id, booking_id, type, amount, status, description)
            VALUES ($1, $2, 'payment', $3, 'completed', $4)
            "#,
        )
        .bind(booking.user_id)
        .bind(booking_id)
        .bind(-booking.total_price)
        .bind(booking_payment_description(booking_id))
        .execute(&mut *tx)
        .await?;

        // 4) Коммитим
        tx.commit().await?;
        Ok(booking_id)
    }

    async fn update_booking_status(
        &self,
        user_id: i64,
        booking_id: i64,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2 AND user_id = $3",
        )
        .bind(status)
        .bind(booking_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /* ---------- REVIEWS ---------- */

    async fn workspace_reviews(&self, workspace_id: i64) -> StoreResult<Vec<ReviewDetails>> {
        let rows = sqlx::query_as::<_, ReviewDetails>(
            r#"
            SELECT r.*, u.name AS user_name
            FROM reviews r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.workspace_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_review(&self, review: NewReview) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        // Блокировка строки рабочего места защищает счётчик отзывов от потерянных обновлений
        sqlx::query_scalar::<_, i64>("SELECT id FROM workspaces WHERE id = $1 FOR UPDATE")
            .bind(review.workspace_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound { entity: "Рабочее место", id: review.workspace_id })?;

        // Отзыв по брони: бронь должна быть этого пользователя и этого места
        if let Some(booking_id) = review.booking_id {
            sqlx::query_scalar::<_, i64>(
                "SELECT id FROM bookings WHERE id = $1 AND user_id = $2 AND workspace_id = $3",
            )
            .bind(booking_id)
            .bind(review.user_id)
            .bind(review.workspace_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound { entity: "Бронирование", id: booking_id })?;
        }

        let review_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (workspace_id, user_id, booking_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(review.workspace_id)
        .bind(review.user_id)
        .bind(review.booking_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&mut *tx)
        .await?;

        let ratings =
            sqlx::query_scalar::<_, i32>("SELECT rating FROM reviews WHERE workspace_id = $1")
                .bind(review.workspace_id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query(
            "UPDATE workspaces SET rating_tenths = $1, review_count = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(mean_rating_tenths(&ratings))
        .bind(ratings.len() as i32)
        .bind(review.workspace_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(review_id)
    }

    /* ---------- TRANSACTIONS ---------- */

    async fn user_transactions(&self, user_id: i64) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn user_balance(&self, user_id: i64) -> StoreResult<i64> {
        let balance = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM transactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(balance)
    }

    async fn append_transaction(&self, transaction: NewTransaction) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        lock_user(&mut tx, transaction.user_id).await?;
        let balance = balance_in(&mut tx, transaction.user_id).await?;
        apply_amount(balance, transaction.amount)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transactions (user_id, booking_id, type, amount, status, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(transaction.user_id)
        .bind(transaction.booking_id)
        .bind(transaction.kind)
        .bind(transaction.amount)
        .bind(transaction.status)
        .bind(&transaction.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /* ---------- SQL LOGS ---------- */

    async fn insert_sql_log(&self, entry: NewSqlLog) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sql_logs (query, operation, execution_time, user_id, endpoint, params, error)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&entry.query)
        .bind(entry.operation)
        .bind(entry.execution_time)
        .bind(entry.user_id)
        .bind(&entry.endpoint)
        .bind(&entry.params)
        .bind(&entry.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_sql_logs(&self, limit: i64) -> StoreResult<Vec<SqlLog>> {
        let rows = sqlx::query_as::<_, SqlLog>(
            "SELECT * FROM sql_logs ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
