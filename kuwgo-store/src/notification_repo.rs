use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kuwgo_core::{NotificationRepository, StoreResult};
use kuwgo_shared::time::to_kuwait;
use kuwgo_shared::{Notification, NotificationType};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient: String,
    message: String,
    notification_type: String,
    trip_id: Option<Uuid>,
    booking_id: Option<Uuid>,
    is_sent: bool,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn record(&self, notification: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient, message, notification_type, trip_id, booking_id, is_sent, error_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(notification.id)
        .bind(&notification.recipient)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.trip_id)
        .bind(notification.booking_id)
        .bind(notification.is_sent)
        .bind(&notification.error_message)
        .bind(notification.created_at.with_timezone(&Utc))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT id, recipient, message, notification_type, trip_id, booking_id, is_sent, error_message, created_at
            FROM notifications
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let notification_type = NotificationType::parse(&r.notification_type)
                    .ok_or_else(|| format!("unknown notification type: {}", r.notification_type))?;
                Ok(Notification {
                    id: r.id,
                    recipient: r.recipient,
                    message: r.message,
                    notification_type,
                    trip_id: r.trip_id,
                    booking_id: r.booking_id,
                    is_sent: r.is_sent,
                    error_message: r.error_message,
                    created_at: to_kuwait(r.created_at),
                })
            })
            .collect()
    }
}
