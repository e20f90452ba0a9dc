use nexa_database::{
    NewNotification, NotificationPriority, NotificationRepository, NotificationType, User,
};
use tracing::warn;

pub(crate) fn welcome_batch(user: &User) -> Vec<NewNotification> {
    vec![
        NewNotification::new(
            user.id,
            NotificationType::System,
            NotificationPriority::High,
            "Welcome to NexaUI!",
            format!(
                "Welcome {}! Your account has been created successfully.",
                user.full_name
            ),
        ),
        NewNotification::new(
            user.id,
            NotificationType::Promotion,
            NotificationPriority::Medium,
            "Complete Your Profile",
            "Welcome! Complete your profile to get the most out of NexaUI. Add your bio, location, and profile picture.",
        ),
        NewNotification::new(
            user.id,
            NotificationType::System,
            NotificationPriority::Medium,
            "Security Setup",
            "For better security, consider enabling two-factor authentication in your account settings.",
        ),
    ]
}

pub(crate) fn login_batch(user: &User) -> Vec<NewNotification> {
    vec![
        NewNotification::new(
            user.id,
            NotificationType::System,
            NotificationPriority::Medium,
            "Login Successful",
            format!(
                "Welcome back {}! You have successfully logged in.",
                user.full_name
            ),
        ),
        NewNotification::new(
            user.id,
            NotificationType::System,
            NotificationPriority::Low,
            "Account Activity",
            "Your account was accessed from a new session. If this wasn't you, please review your security settings.",
        ),
    ]
}

/// Failures are logged and never reach the caller.
pub(crate) async fn deliver(repo: &NotificationRepository, batch: Vec<NewNotification>) {
    for notification in batch {
        if let Err(error) = repo.create(&notification).await {
            warn!(
                ?error,
                account_id = notification.user_id,
                title = %notification.title,
                "failed to create notification"
            );
        }
    }
}
