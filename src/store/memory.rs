use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{
    apply_amount, NewBooking, NewReview, NewSqlLog, NewTransaction, Store, StoreError,
    StoreResult, UpsertUser,
};
use crate::models::{
    review::mean_rating_tenths,
    transaction::{balance_of, booking_payment_description}, Booking,
    BookingDetails, BookingStatus, PaymentStatus, Review, ReviewDetails, RewardStatus, SqlLog,
    Transaction, TransactionStatus, TransactionType, User, UserRole, Workspace, WorkspaceFilter,
    WorkspaceType,
};

/// Хранилище в памяти. Один мьютекс на всё состояние делает каждую операцию атомарной.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: Vec<User>,
    workspaces: Vec<Workspace>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
    transactions: Vec<Transaction>,
    sql_logs: Vec<SqlLog>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn balance(&self, user_id: i64) -> StoreResult<i64> {
        balance_of(self.transactions.iter().filter(|t| t.user_id == user_id))
            .ok_or(StoreError::AmountOutOfRange)
    }

    fn require_user(&self, user_id: i64) -> StoreResult<()> {
        if self.users.iter().any(|u| u.id == user_id) {
            Ok(())
        } else {
            Err(StoreError::NotFound { entity: "Пользователь", id: user_id })
        }
    }
}

/// Данные нового рабочего места для наполнения каталога.
#[derive(Debug, Clone)]
pub struct WorkspaceSeed {
    pub name: String,
    pub description: Option<String>,
    pub kind: WorkspaceType,
    pub price_per_hour: i64,
    pub price_per_day: i64,
    pub amenities: Vec<String>,
}

impl WorkspaceSeed {
    pub fn new(name: impl Into<String>, kind: WorkspaceType, price_per_hour: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            price_per_hour,
            price_per_day: price_per_hour * 8,
            amenities: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_workspace(&self, seed: WorkspaceSeed) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        state.workspaces.push(Workspace {
            id,
            name: seed.name,
            description: seed.description,
            kind: seed.kind,
            price_per_hour: seed.price_per_hour,
            price_per_day: seed.price_per_day,
            image_url: None,
            amenities: seed.amenities,
            is_available: true,
            rating_tenths: 0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub async fn booking(&self, booking_id: i64) -> Option<Booking> {
        let state = self.state.lock().await;
        state.bookings.iter().find(|b| b.id == booking_id).cloned()
    }

    pub async fn booking_count(&self) -> usize {
        self.state.lock().await.bookings.len()
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn upsert_user(&self, user: UpsertUser) -> StoreResult<User> {
        let mut state = self.state.lock().await;
        let now = Utc::now();

        if let Some(existing) = state.users.iter_mut().find(|u| u.email == user.email) {
            if user.name.is_some() {
                existing.name = user.name;
            }
            existing.login_method = Some(user.login_method);
            if let Some(role) = user.role {
                existing.role = role;
            }
            existing.last_signed_in = now;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = state.next_id();
        let created = User {
            id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            login_method: Some(user.login_method),
            role: user.role.unwrap_or(UserRole::User),
            phone: None,
            avatar: None,
            bio: None,
            specialization: None,
            points: 0,
            status: RewardStatus::Bronze,
            created_at: now,
            updated_at: now,
            last_signed_in: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn list_workspaces(&self, filter: &WorkspaceFilter) -> StoreResult<Vec<Workspace>> {
        let state = self.state.lock().await;
        let mut list: Vec<Workspace> = state
            .workspaces
            .iter()
            .filter(|w| w.matches(filter))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.rating_tenths.cmp(&a.rating_tenths).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>> {
        let state = self.state.lock().await;
        Ok(state.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn user_bookings(&self, user_id: i64) -> StoreResult<Vec<BookingDetails>> {
        let state = self.state.lock().await;
        let mut list: Vec<BookingDetails> = state
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .map(|b| {
                let workspace = state.workspaces.iter().find(|w| w.id == b.workspace_id);
                BookingDetails {
                    booking: b.clone(),
                    workspace_name: workspace.map(|w| w.name.clone()),
                    workspace_type: workspace.map(|w| w.kind),
                    workspace_image: workspace.and_then(|w| w.image_url.clone()),
                }
            })
            .collect();
        list.sort_by(|a, b| {
            b.booking
                .start_time
                .cmp(&a.booking.start_time)
                .then(b.booking.id.cmp(&a.booking.id))
        });
        Ok(list)
    }

    async fn create_paid_booking(&self, booking: NewBooking) -> StoreResult<i64> {
        let mut state = self.state.lock().await;
        state.require_user(booking.user_id)?;
        apply_amount(state.balance(booking.user_id)?, -booking.total_price)?;

        let now = Utc::now();
        let booking_id = state.next_id();
        state.bookings.push(Booking {
            id: booking_id,
            workspace_id: booking.workspace_id,
            user_id: booking.user_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Confirmed,
            total_price: booking.total_price,
            payment_status: PaymentStatus::Paid,
            notes: booking.notes,
            created_at: now,
            updated_at: now,
        });

        let transaction_id = state.next_id();
        state.transactions.push(Transaction {
            id: transaction_id,
            user_id: booking.user_id,
            booking_id: Some(booking_id),
            kind: TransactionType::Payment,
            amount: -booking.total_price,
            status: TransactionStatus::Completed,
            description: Some(booking_payment_description(booking_id)),
            created_at: now,
            updated_at: now,
        });
        Ok(booking_id)
    }

    async fn update_booking_status(
        &self,
        user_id: i64,
        booking_id: i64,
        status: BookingStatus,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id && b.user_id == user_id)
        {
            Some(booking) => {
                booking.status = status;
                booking.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn workspace_reviews(&self, workspace_id: i64) -> StoreResult<Vec<ReviewDetails>> {
        let state = self.state.lock().await;
        let mut list: Vec<ReviewDetails> = state
            .reviews
            .iter()
            .filter(|r| r.workspace_id == workspace_id)
            .map(|r| ReviewDetails {
                review: r.clone(),
                user_name: state
                    .users
                    .iter()
                    .find(|u| u.id == r.user_id)
                    .and_then(|u| u.name.clone()),
            })
            .collect();
        list.sort_by(|a, b| b.review.id.cmp(&a.review.id));
        Ok(list)
    }

    async fn create_review(&self, review: NewReview) -> StoreResult<i64> {
        let mut state = self.state.lock().await;
        if !state.workspaces.iter().any(|w| w.id == review.workspace_id) {
            return Err(StoreError::NotFound { entity: "Рабочее место", id: review.workspace_id });
        }
        if let Some(booking_id) = review.booking_id {
            let owned = state.bookings.iter().any(|b| {
                b.id == booking_id
                    && b.user_id == review.user_id
                    && b.workspace_id == review.workspace_id
            });
            if !owned {
                return Err(StoreError::NotFound { entity: "Бронирование", id: booking_id });
            }
        }

        let now = Utc::now();
        let review_id = state.next_id();
        state.reviews.push(Review {
            id: review_id,
            workspace_id: review.workspace_id,
            user_id: review.user_id,
            booking_id: review.booking_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        });

        let ratings: Vec<i32> = state
            .reviews
            .iter()
            .filter(|r| r.workspace_id == review.workspace_id)
            .map(|r| r.rating)
            .collect();
        if let Some(workspace) = state.workspaces.iter_mut().find(|w| w.id == review.workspace_id) {
            workspace.rating_tenths = mean_rating_tenths(&ratings);
            workspace.review_count = ratings.len() as i32;
            workspace.updated_at = now;
        }
        Ok(review_id)
    }

    async fn user_transactions(&self, user_id: i64) -> StoreResult<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut list: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(list)
    }

    async fn user_balance(&self, user_id: i64) -> StoreResult<i64> {
        self.state.lock().await.balance(user_id)
    }

    async fn append_transaction(&self, transaction: NewTransaction) -> StoreResult<i64> {
        let mut state = self.state.lock().await;
        state.require_user(transaction.user_id)?;
        apply_amount(state.balance(transaction.user_id)?, transaction.amount)?;

        let now = Utc::now();
        let id = state.next_id();
        state.transactions.push(Transaction {
            id,
            user_id: transaction.user_id,
            booking_id: transaction.booking_id,
            kind: transaction.kind,
            amount: transaction.amount,
            status: transaction.status,
            description: transaction.description,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn insert_sql_log(&self, entry: NewSqlLog) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.sql_logs.push(SqlLog {
            id,
            query: entry.query,
            operation: entry.operation,
            execution_time: Some(entry.execution_time),
            user_id: entry.user_id,
            endpoint: entry.endpoint,
            params: entry.params,
            error: entry.error,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn recent_sql_logs(&self, limit: i64) -> StoreResult<Vec<SqlLog>> {
        let state = self.state.lock().await;
        let take = usize::try_from(limit).unwrap_or(0);
        Ok(state.sql_logs.iter().rev().take(take).cloned().collect())
    }
}
