//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here is async and all I/O goes through the database
//! pool, so a slow query parks the future instead of the worker.
//!
//! Every route under `/api` requires an access token (see [`crate::auth`]). The acting user is always taken from the
//! token's subject, never from the request body.
use actix_web::{get, web, HttpResponse, Responder};
use devmarket_engine::{
    db_types::{OrderId, UserId},
    objects::{Pagination, PaymentDetails},
    traits::{MessageManagement, OrderManagement, ReviewManagement, UserManagement},
    MessageDispatcher,
    OrderFlowApi,
    ProfileApi,
    ReviewApi,
};
use log::*;

use crate::{
    auth::JwtClaims,
    data_objects::{NewOrderParams, NewReviewParams, ProfileParams, SendMessageParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(my_profile => Get "/me" impl UserManagement);
pub async fn my_profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET profile for {}", claims.sub);
    let profile = api.profile(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(update_my_profile => Put "/me" impl UserManagement);
/// Creates or updates the caller's profile. Users exist in the identity provider before they ever reach us, so the
/// first call to this endpoint is what makes them known to the marketplace.
pub async fn update_my_profile<B: UserManagement>(
    claims: JwtClaims,
    body: web::Json<ProfileParams>,
    api: web::Data<ProfileApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PUT profile for {}", claims.sub);
    let profile = api.upsert_profile(body.into_inner().into_profile(claims.sub)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement);
pub async fn create_order<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Json<NewOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let NewOrderParams { gig_id } = body.into_inner();
    debug!("💻️ POST order for gig {gig_id} from {}", claims.sub);
    let order = api.create_order(&claims.sub, &gig_id).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl OrderManagement);
/// The orders the caller takes part in, as client or as freelancer, newest first.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    page: web::Query<Pagination>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.sub);
    let orders = api.orders_for_user(&claims.sub, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", claims.sub);
    let order = api.order_for_participant(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(payment_proof => Get "/orders/{order_id}/payment-proof" impl OrderManagement);
pub async fn payment_proof<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET payment proof for order {order_id}");
    let proof = api
        .payment_proof(&order_id, &claims.sub)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No payment proof has been submitted for {order_id}")))?;
    Ok(HttpResponse::Ok().json(proof))
}

route!(submit_payment => Patch "/orders/{order_id}/submit-payment" impl OrderManagement);
pub async fn submit_payment<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    body: web::Json<PaymentDetails>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH submit payment for order {order_id}");
    let order = api.submit_payment(&order_id, &claims.sub, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(confirm_payment => Patch "/orders/{order_id}/confirm-payment" impl OrderManagement);
pub async fn confirm_payment<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH confirm payment for order {order_id}");
    let order = api.confirm_payment(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(start_work => Patch "/orders/{order_id}/start-work" impl OrderManagement);
pub async fn start_work<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH start work on order {order_id}");
    let order = api.start_work(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(submit_work => Patch "/orders/{order_id}/submit-work" impl OrderManagement);
pub async fn submit_work<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH submit work for order {order_id}");
    let order = api.submit_work(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(approve_work => Patch "/orders/{order_id}/approve" impl OrderManagement);
pub async fn approve_work<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH approve work for order {order_id}");
    let order = api.approve_work(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(request_revision => Patch "/orders/{order_id}/revision" impl OrderManagement);
pub async fn request_revision<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PATCH request revision for order {order_id}");
    let order = api.request_revision(&order_id, &claims.sub).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Messages  ----------------------------------------------------
route!(send_message => Post "/messages" impl MessageManagement);
/// Stores the message and pushes it to the recipient if they are connected. Succeeds whether or not the push landed.
pub async fn send_message<B: MessageManagement>(
    claims: JwtClaims,
    body: web::Json<SendMessageParams>,
    api: web::Data<MessageDispatcher<B>>,
) -> Result<HttpResponse, ServerError> {
    let message = body.into_inner().into_message(claims.sub);
    debug!("💻️ POST message from {} to {}", message.sender_id, message.receiver_id);
    let message = api.send(message).await?;
    Ok(HttpResponse::Created().json(message))
}

route!(conversation => Get "/messages/{user_id}" impl MessageManagement);
pub async fn conversation<B: MessageManagement>(
    claims: JwtClaims,
    path: web::Path<UserId>,
    page: web::Query<Pagination>,
    api: web::Data<MessageDispatcher<B>>,
) -> Result<HttpResponse, ServerError> {
    let other = path.into_inner();
    debug!("💻️ GET conversation between {} and {other}", claims.sub);
    let messages = api.history(&claims.sub, &other, page.into_inner()).await?;
    Ok(HttpResponse::Ok().json(messages))
}

//----------------------------------------------   Reviews  ----------------------------------------------------
route!(create_review => Post "/reviews" impl ReviewManagement);
pub async fn create_review<B: ReviewManagement>(
    claims: JwtClaims,
    body: web::Json<NewReviewParams>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let NewReviewParams { order_id, rating, comment } = body.into_inner();
    debug!("💻️ POST review of order {order_id} by {}", claims.sub);
    let review = api.create_review(&claims.sub, &order_id, rating, comment).await?;
    Ok(HttpResponse::Created().json(review))
}

route!(reviews_for_user => Get "/reviews/user/{user_id}" impl ReviewManagement);
pub async fn reviews_for_user<B: ReviewManagement>(
    _claims: JwtClaims,
    path: web::Path<UserId>,
    api: web::Data<ReviewApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = path.into_inner();
    debug!("💻️ GET reviews for {user_id}");
    let reviews = api.reviews_for_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(reviews))
}
