use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentStatus, UserId},
    objects::Pagination,
};

/// Inserts a new order in `PENDING_PAYMENT`. This is not atomic. You can embed this call inside a transaction if you
/// need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let now = Utc::now();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id,
                gig_id,
                client_id,
                freelancer_id,
                status,
                payment_status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(OrderId::random())
    .bind(order.gig_id)
    .bind(order.client_id)
    .bind(order.freelancer_id)
    .bind(OrderStatusType::PendingPayment)
    .bind(PaymentStatus::Pending)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order {} inserted for gig {}", order.id, order.gig_id);
    Ok(order)
}

pub async fn fetch_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Orders where the user is on either side, newest first.
pub async fn fetch_orders_for_user(
    user_id: &UserId,
    page: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE client_id = $1 OR freelancer_id = $1
            ORDER BY created_at DESC, rowid DESC
            LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id.as_str())
    .bind(page.limit())
    .bind(page.skip())
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Compare-and-swap on the order status. The row is only touched if its status is still `expected`, so of several
/// concurrent callers reading the same status at most one gets `Some` back.
pub async fn update_order_status(
    order_id: &OrderId,
    expected: OrderStatusType,
    new_status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, updated_at = $2
            WHERE id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(new_status)
    .bind(Utc::now())
    .bind(order_id.as_str())
    .bind(expected)
    .fetch_optional(conn)
    .await?;
    match &order {
        Some(_) => debug!("🗃️ Order {order_id} status changed from {expected} to {new_status}"),
        None => trace!("🗃️ Order {order_id} was not in {expected}. Status not changed"),
    }
    Ok(order)
}
