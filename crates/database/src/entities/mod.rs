//! Domain entities for the database layer

pub mod notification;
pub mod profile;
pub mod user;

pub use notification::{NewNotification, Notification, NotificationPriority, NotificationType};
pub use profile::{ProfileChanges, ProfileView, PublicProfileView};
pub use user::{NewUser, User, UserRecord, UserRole};
