//! Rows the job machinery reads, inserted straight through the entities.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::database::models::{
    brand, job, post, scheduled_post, scheduled_post_status::ScheduledPostStatus,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_id(prefix: &str) -> String {
    format!("{prefix}-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub async fn insert_brand(
    db: &DatabaseConnection,
    id: &str,
    schedule_interval_hours: i32,
) -> brand::Model {
    brand::ActiveModel {
        id: Set(id.to_string()),
        name: Set(format!("{id} brand")),
        schedule_interval_hours: Set(schedule_interval_hours),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert brand")
}

pub async fn insert_post(
    db: &DatabaseConnection,
    brand_id: &str,
    created_at: NaiveDateTime,
) -> post::Model {
    post::ActiveModel {
        id: Set(unique_id("post")),
        brand_id: Set(brand_id.to_string()),
        topic: Set("Release notes".to_string()),
        content: Set("We shipped a thing.".to_string()),
        platform: Set("linkedin".to_string()),
        created_at: Set(created_at),
    }
    .insert(db)
    .await
    .expect("Failed to insert post")
}

pub async fn insert_scheduled_post(
    db: &DatabaseConnection,
    brand_id: &str,
    status: ScheduledPostStatus,
    scheduled_at: NaiveDateTime,
) -> scheduled_post::Model {
    scheduled_post::ActiveModel {
        id: Set(unique_id("scheduled")),
        brand_id: Set(brand_id.to_string()),
        topic: Set("Weekly tip".to_string()),
        content: Set("Tip of the week.".to_string()),
        platform: Set("x".to_string()),
        status: Set(status),
        scheduled_at: Set(scheduled_at),
        created_at: Set(now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert scheduled post")
}

/// Move a job's `next_run_at` to `ago` before now so it can be claimed.
pub async fn make_due(db: &DatabaseConnection, job_id: i64, ago: chrono::Duration) {
    let mut job: job::ActiveModel = job::Entity::find_by_id(job_id)
        .one(db)
        .await
        .expect("Failed to load job")
        .expect("Job does not exist")
        .into();

    job.next_run_at = Set(now() - ago);
    job.update(db).await.expect("Failed to update job");
}

pub async fn all_jobs(db: &DatabaseConnection) -> Vec<job::Model> {
    job::Entity::find()
        .all(db)
        .await
        .expect("Failed to load jobs")
}
