//! Form number allocation.
//!
//! Numbers follow `<prefix><YYMM><NNN>` and increment within a per-month
//! group (`increment_group` = YYYYMM). The counter is a database row updated
//! inside the caller's transaction: the row is seeded with an ON CONFLICT
//! no-op insert and then read under SELECT ... FOR UPDATE, so concurrent
//! allocations serialize on the row instead of both reading the same
//! `last_number` (backends without row locks ignore the clause).

use crate::entities::form_sequence;
use crate::errors::ServiceError;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set,
};

#[derive(Debug, Clone)]
pub struct AllocatedNumber {
    pub number: String,
    pub increment_number: i32,
    pub increment_group: i32,
}

pub async fn next_form_number<C: ConnectionTrait>(
    conn: &C,
    prefix: &str,
    date: DateTime<Utc>,
) -> Result<AllocatedNumber, ServiceError> {
    let increment_group = date.year() * 100 + date.month() as i32;

    // Seed the counter row at zero if this is the first allocation of the
    // month; a concurrent seeder winning the race is fine.
    let seed = form_sequence::ActiveModel {
        id: NotSet,
        prefix: Set(prefix.to_string()),
        increment_group: Set(increment_group),
        last_number: Set(0),
    };
    match form_sequence::Entity::insert(seed)
        .on_conflict(
            OnConflict::columns([
                form_sequence::Column::Prefix,
                form_sequence::Column::IncrementGroup,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(conn)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(err) => return Err(err.into()),
    }

    let row = form_sequence::Entity::find()
        .filter(form_sequence::Column::Prefix.eq(prefix))
        .filter(form_sequence::Column::IncrementGroup.eq(increment_group))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!(
                "sequence row missing for {prefix} {increment_group}"
            ))
        })?;

    let increment_number = row.last_number + 1;
    let mut active = row.into_active_model();
    active.last_number = Set(increment_number);
    active.update(conn).await?;

    let number = format!("{}{}{:03}", prefix, date.format("%y%m"), increment_number);
    Ok(AllocatedNumber {
        number,
        increment_number,
        increment_group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::TimeZone;
    use sea_orm::Database;

    #[tokio::test]
    async fn numbers_increment_within_a_group_and_reset_across_months() {
        let conn = Database::connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        db::create_schema(&conn).await.expect("create schema");

        let december = Utc.with_ymd_and_hms(2022, 12, 3, 0, 0, 0).unwrap();
        let first = next_form_number(&conn, "PP", december).await.expect("first");
        assert_eq!(first.number, "PP2212001");
        assert_eq!(first.increment_number, 1);
        assert_eq!(first.increment_group, 202212);

        let second = next_form_number(&conn, "PP", december).await.expect("second");
        assert_eq!(second.number, "PP2212002");
        assert_eq!(second.increment_number, 2);

        let january = Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap();
        let next_month = next_form_number(&conn, "PP", january).await.expect("january");
        assert_eq!(next_month.number, "PP2301001");
        assert_eq!(next_month.increment_number, 1);
        assert_eq!(next_month.increment_group, 202301);
    }

    #[tokio::test]
    async fn prefixes_count_independently() {
        let conn = Database::connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        db::create_schema(&conn).await.expect("create schema");

        let date = Utc.with_ymd_and_hms(2022, 12, 3, 0, 0, 0).unwrap();
        next_form_number(&conn, "PP", date).await.expect("pp");
        let other = next_form_number(&conn, "PR", date).await.expect("pr");
        assert_eq!(other.number, "PR2212001");
    }
}
