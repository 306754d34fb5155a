//! `SQLite` implementation of [`ThingRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use toxotes_app::ports::ThingRepository;
use toxotes_domain::command::Selector;
use toxotes_domain::error::ToxotesError;
use toxotes_domain::power::PowerState;
use toxotes_domain::qos::Qos;
use toxotes_domain::reconcile::{ThingChange, ThingUpdate};
use toxotes_domain::thing::Thing;
use toxotes_domain::time;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Thing`].
struct Wrapper(Thing);

/// Unrecognised spellings decode as unknown rather than failing the row.
fn decode_power(unique_id: &str, column: &str, value: Option<String>) -> Option<PowerState> {
    let value = value?;
    match PowerState::from_str(value.trim()) {
        Ok(state) => Some(state),
        Err(_) => {
            tracing::warn!(
                %unique_id,
                column,
                value = %value,
                "ignoring unrecognised stored power value"
            );
            None
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let unique_id: String = row.try_get("unique_id")?;
        let under_manual_control: Option<i64> = row.try_get("under_manual_control")?;
        let manual_control_for: i64 = row.try_get("manual_control_for")?;
        let current_value: Option<String> = row.try_get("current_value")?;
        let automatic_command: Option<String> = row.try_get("automatic_command")?;
        let automatic_qos: i64 = row.try_get("automatic_qos")?;

        let under_manual_control = under_manual_control
            .map(|millis| {
                time::from_epoch_millis(millis).ok_or_else(|| {
                    sqlx::Error::Decode(format!("timestamp out of range: {millis}").into())
                })
            })
            .transpose()?;
        let manual_control_for = u32::try_from(manual_control_for)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        let current_value = decode_power(&unique_id, "current_value", current_value);
        let automatic_command = decode_power(&unique_id, "automatic_command", automatic_command);

        Ok(Self(Thing {
            unique_id,
            friendly_name: row.try_get("friendly_name")?,
            host_id: row.try_get("host_id")?,
            under_manual_control,
            manual_control_for,
            current_value,
            automatic_command,
            automatic_retain: row.try_get("automatic_retain")?,
            automatic_qos: Qos::from_level(automatic_qos),
            show_automatic_control: row.try_get("show_automatic_control")?,
        }))
    }
}

const SELECT_BY_UNIQUE_ID: &str = "SELECT * FROM things WHERE unique_id = ?";
const SELECT_BY_FRIENDLY_NAME: &str = "SELECT * FROM things WHERE friendly_name = ? ORDER BY rowid";
const SELECT_ALL: &str = "SELECT * FROM things ORDER BY rowid";
const UPDATE_MANUAL: &str =
    "UPDATE things SET under_manual_control = ?, automatic_command = ? WHERE unique_id = ?";
const UPDATE_AUTOMATIC: &str = "UPDATE things SET automatic_command = ?, automatic_retain = ?, automatic_qos = ?, show_automatic_control = 1 WHERE unique_id = ?";
const UPSERT: &str = "INSERT INTO things (unique_id, friendly_name, host_id, under_manual_control, manual_control_for, current_value, automatic_command, automatic_retain, automatic_qos, show_automatic_control) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) ON CONFLICT (unique_id) DO UPDATE SET friendly_name = excluded.friendly_name, host_id = excluded.host_id, under_manual_control = excluded.under_manual_control, manual_control_for = excluded.manual_control_for, current_value = excluded.current_value, automatic_command = excluded.automatic_command, automatic_retain = excluded.automatic_retain, automatic_qos = excluded.automatic_qos, show_automatic_control = excluded.show_automatic_control";

fn power_column(value: Option<PowerState>) -> Option<String> {
    value.map(|state| state.to_string())
}

/// `SQLite`-backed thing repository.
pub struct SqliteThingRepository {
    pool: SqlitePool,
}

impl SqliteThingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ThingRepository for SqliteThingRepository {
    fn find_by_selector(
        &self,
        selector: &Selector,
    ) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send {
        let pool = self.pool.clone();
        let (sql, value) = match selector {
            Selector::ByUniqueId(id) => (SELECT_BY_UNIQUE_ID, id.clone()),
            Selector::ByFriendlyName(name) => (SELECT_BY_FRIENDLY_NAME, name.clone()),
        };
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(sql)
                .bind(value)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn apply_updates(
        &self,
        batch: Vec<ThingUpdate>,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            for update in &batch {
                let query = match &update.change {
                    ThingChange::Manual {
                        under_manual_control,
                        automatic_command,
                    } => sqlx::query(UPDATE_MANUAL)
                        .bind(time::to_epoch_millis(*under_manual_control))
                        .bind(power_column(*automatic_command)),
                    ThingChange::Automatic {
                        automatic_command,
                        automatic_retain,
                        automatic_qos,
                    } => sqlx::query(UPDATE_AUTOMATIC)
                        .bind(automatic_command.to_string())
                        .bind(*automatic_retain)
                        .bind(i64::from(automatic_qos.level())),
                };
                let result = query
                    .bind(&update.unique_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;

                if result.rows_affected() == 0 {
                    return Err(StorageError::MissingRow(update.unique_id.clone()).into());
                }
            }

            tx.commit().await.map_err(StorageError::from)?;
            tracing::debug!(rows = batch.len(), "thing update batch committed");
            Ok(())
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn upsert(&self, thing: Thing) -> impl Future<Output = Result<Thing, ToxotesError>> + Send {
        let pool = self.pool.clone();
        async move {
            thing.validate()?;

            sqlx::query(UPSERT)
                .bind(&thing.unique_id)
                .bind(&thing.friendly_name)
                .bind(&thing.host_id)
                .bind(thing.under_manual_control.map(time::to_epoch_millis))
                .bind(i64::from(thing.manual_control_for))
                .bind(power_column(thing.current_value))
                .bind(power_column(thing.automatic_command))
                .bind(thing.automatic_retain)
                .bind(i64::from(thing.automatic_qos.level()))
                .bind(thing.show_automatic_control)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(thing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Config, Database};
    use chrono::{Duration, TimeZone, Utc};
    use toxotes_domain::time::Timestamp;

    async fn setup() -> (Database, SqliteThingRepository) {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let repo = SqliteThingRepository::new(db.pool().clone());
        (db, repo)
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn relay(id: &str, name: &str) -> Thing {
        Thing::builder()
            .unique_id(id)
            .friendly_name(name)
            .host_id(format!("tasmota_{id}"))
            .current_value(PowerState::Off)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_find_single_thing_by_unique_id() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Porch")).await.unwrap();
        repo.upsert(relay("relay_2", "Porch")).await.unwrap();

        let found = repo
            .find_by_selector(&Selector::ByUniqueId("relay_2".to_string()))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].host_id, "tasmota_relay_2");
        assert_eq!(found[0].current_value, Some(PowerState::Off));
    }

    #[tokio::test]
    async fn should_find_every_thing_sharing_friendly_name_in_insert_order() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_b", "Garden")).await.unwrap();
        repo.upsert(relay("relay_x", "Kitchen")).await.unwrap();
        repo.upsert(relay("relay_a", "Garden")).await.unwrap();

        let found = repo
            .find_by_selector(&Selector::ByFriendlyName("Garden".to_string()))
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().map(|t| t.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["relay_b", "relay_a"]);
    }

    #[tokio::test]
    async fn should_return_empty_when_nothing_matches() {
        let (_db, repo) = setup().await;

        let found = repo
            .find_by_selector(&Selector::ByFriendlyName("Attic".to_string()))
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn should_store_manual_window_as_epoch_millis() {
        let (db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Porch")).await.unwrap();
        let until = t0() + Duration::minutes(10);

        repo.apply_updates(vec![ThingUpdate {
            unique_id: "relay_1".to_string(),
            change: ThingChange::Manual {
                under_manual_control: until,
                automatic_command: Some(PowerState::Off),
            },
        }])
        .await
        .unwrap();

        let (millis, command): (i64, String) = sqlx::query_as(
            "SELECT under_manual_control, automatic_command FROM things WHERE unique_id = 'relay_1'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(millis, t0().timestamp_millis() + 600_000);
        assert_eq!(command, "off");

        let stored = repo.get_all().await.unwrap();
        assert_eq!(stored[0].under_manual_control, Some(until));
    }

    #[tokio::test]
    async fn should_apply_automatic_change_and_show_automatic_control() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Porch")).await.unwrap();

        repo.apply_updates(vec![ThingUpdate {
            unique_id: "relay_1".to_string(),
            change: ThingChange::Automatic {
                automatic_command: PowerState::On,
                automatic_retain: true,
                automatic_qos: Qos::AtLeastOnce,
            },
        }])
        .await
        .unwrap();

        let thing = repo.get_all().await.unwrap().remove(0);
        assert_eq!(thing.automatic_command, Some(PowerState::On));
        assert!(thing.automatic_retain);
        assert_eq!(thing.automatic_qos, Qos::AtLeastOnce);
        assert!(thing.show_automatic_control);
        assert_eq!(thing.under_manual_control, None);
    }

    #[tokio::test]
    async fn should_roll_back_whole_batch_when_one_row_is_missing() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Garden")).await.unwrap();

        let automatic = ThingChange::Automatic {
            automatic_command: PowerState::On,
            automatic_retain: false,
            automatic_qos: Qos::ExactlyOnce,
        };
        let result = repo
            .apply_updates(vec![
                ThingUpdate {
                    unique_id: "relay_1".to_string(),
                    change: automatic.clone(),
                },
                ThingUpdate {
                    unique_id: "relay_gone".to_string(),
                    change: automatic,
                },
            ])
            .await;

        assert!(matches!(result, Err(ToxotesError::Persistence(_))));
        let thing = repo.get_all().await.unwrap().remove(0);
        assert_eq!(thing.automatic_command, None);
        assert!(!thing.show_automatic_control);
    }

    #[tokio::test]
    async fn should_decode_legacy_power_spellings() {
        let (_db, repo) = setup().await;
        sqlx::query(
            "INSERT INTO things (unique_id, host_id, current_value, automatic_command) VALUES ('relay_1', 'h1', 'ON', '0')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let thing = repo.get_all().await.unwrap().remove(0);
        assert_eq!(thing.current_value, Some(PowerState::On));
        assert_eq!(thing.automatic_command, Some(PowerState::Off));
        assert_eq!(thing.manual_control_for, 10);
        assert_eq!(thing.automatic_qos, Qos::ExactlyOnce);
    }

    #[tokio::test]
    async fn should_read_group_when_one_member_has_unrecognised_stored_value() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Garden")).await.unwrap();
        sqlx::query(
            "INSERT INTO things (unique_id, friendly_name, host_id, current_value, automatic_command) VALUES ('relay_2', 'Garden', 'h2', '', 'dim')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let things = repo
            .find_by_selector(&Selector::ByFriendlyName("Garden".to_string()))
            .await
            .unwrap();

        assert_eq!(things.len(), 2);
        assert_eq!(things[1].unique_id, "relay_2");
        assert_eq!(things[1].current_value, None);
        assert_eq!(things[1].automatic_command, None);
    }

    #[tokio::test]
    async fn should_replace_existing_thing_on_upsert() {
        let (_db, repo) = setup().await;
        repo.upsert(relay("relay_1", "Porch")).await.unwrap();

        let mut renamed = relay("relay_1", "Front porch");
        renamed.manual_control_for = 30;
        repo.upsert(renamed).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].friendly_name, "Front porch");
        assert_eq!(all[0].manual_control_for, 30);
    }

    #[tokio::test]
    async fn should_reject_invalid_thing_on_upsert() {
        let (_db, repo) = setup().await;
        let mut thing = relay("relay_1", "Porch");
        thing.host_id = String::new();

        let result = repo.upsert(thing).await;

        assert!(matches!(result, Err(ToxotesError::Validation(_))));
    }
}
