use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewPaymentProof, OrderId, PaymentProof, PaymentProofId};

/// Stores a payment proof. The `order_id` column is unique, so a second proof for the same order fails with a
/// uniqueness violation.
pub async fn insert_payment_proof(
    proof: NewPaymentProof,
    conn: &mut SqliteConnection,
) -> Result<PaymentProof, sqlx::Error> {
    let proof: PaymentProof = sqlx::query_as(
        r#"
            INSERT INTO payment_proofs (
                id,
                order_id,
                user_id,
                proof_reference,
                payer_name,
                amount,
                submitted_at,
                verified
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE)
            RETURNING *;
        "#,
    )
    .bind(PaymentProofId::random())
    .bind(proof.order_id)
    .bind(proof.user_id)
    .bind(proof.proof_reference)
    .bind(proof.payer_name)
    .bind(proof.amount)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Payment proof {} of {} stored for order {}", proof.id, proof.amount, proof.order_id);
    Ok(proof)
}

pub async fn fetch_payment_proof(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentProof>, sqlx::Error> {
    let proof = sqlx::query_as("SELECT * FROM payment_proofs WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(proof)
}
