use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Gig, GigId, NewGig};

pub async fn insert_gig(gig: NewGig, conn: &mut SqliteConnection) -> Result<Gig, sqlx::Error> {
    let gig: Gig = sqlx::query_as(
        r#"
            INSERT INTO gigs (id, freelancer_id, title, description, price, delivery_days, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            RETURNING *;
        "#,
    )
    .bind(GigId::random())
    .bind(gig.freelancer_id)
    .bind(gig.title)
    .bind(gig.description)
    .bind(gig.price)
    .bind(gig.delivery_days)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Gig {} published by {}", gig.id, gig.freelancer_id);
    Ok(gig)
}

pub async fn fetch_gig(gig_id: &GigId, conn: &mut SqliteConnection) -> Result<Option<Gig>, sqlx::Error> {
    let gig = sqlx::query_as("SELECT * FROM gigs WHERE id = $1").bind(gig_id.as_str()).fetch_optional(conn).await?;
    Ok(gig)
}
