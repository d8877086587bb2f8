//! Activity trail, recorded inside the same transaction as the transition it
//! describes.

use crate::entities::user_activity;
use crate::errors::ServiceError;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Set};

pub async fn record<C: ConnectionTrait>(
    conn: &C,
    number: &str,
    user_id: i64,
    activity: &str,
) -> Result<(), ServiceError> {
    user_activity::ActiveModel {
        id: NotSet,
        number: Set(number.to_string()),
        activity: Set(activity.to_string()),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;
    Ok(())
}
