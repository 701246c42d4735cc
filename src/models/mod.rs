pub mod user;
pub mod workspace;
pub mod booking;
pub mod review;
pub mod transaction;
pub mod sql_log;

pub use user::{User, UserProfile, UserRole, RewardStatus};
pub use workspace::{Workspace, WorkspaceFilter, WorkspaceType};
pub use booking::{Booking, BookingDetails, BookingStatus, PaymentStatus, UserStats};
pub use review::{Review, ReviewDetails};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use sql_log::{SqlLog, SqlOperation};
