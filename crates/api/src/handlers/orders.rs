//! Handlers for the `/orders` resource.
//!
//! Order creation and cancellation each run in a single transaction:
//! product rows are locked in ascending id order, stock and the inventory
//! ledger move together, coupon usage is claimed with a conditional update,
//! and the customer's running totals are adjusted before commit. Any error
//! drops the transaction, which rolls everything back.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::coupons::{evaluate_coupon, CouponRejection};
use backoffice_core::error::CoreError;
use backoffice_core::inventory::{apply_movement, MovementType};
use backoffice_core::orders::{next_order_number, validate_transition, OrderStatus, PaymentStatus};
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::pricing::{self, OrderTotals, PricedLine};
use backoffice_core::types::{DbId, Money};
use backoffice_core::validation::validate_input;
use backoffice_db::models::inventory::CreateMovement;
use backoffice_db::models::order::{
    CreateOrderRequest, NewOrder, NewOrderItem, OrderListParams, OrderSummary, OrderWithItems,
    UpdateOrderStatus,
};
use backoffice_db::models::product::PRODUCT_STATUS_ACTIVE;
use backoffice_db::repositories::order_repo::OrderFilter;
use backoffice_db::repositories::{
    CouponRepo, CustomerRepo, InventoryRepo, OrderRepo, ProductRepo, SettingRepo,
};
use chrono::Utc;
use sqlx::PgConnection;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Setting consulted when an order does not specify a shipping fee.
const DEFAULT_SHIPPING_FEE_KEY: &str = "default_shipping_fee";

/// GET /api/v1/orders
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<OrderListParams>,
) -> AppResult<Json<PaginatedResponse<OrderSummary>>> {
    auth.require(Resource::Orders, Action::View)?;

    let status = params
        .status
        .as_deref()
        .map(OrderStatus::parse)
        .transpose()?;
    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();

    let filter = OrderFilter {
        status: status.map(OrderStatus::as_str),
        customer_id: params.customer_id,
        search: params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    };
    let (orders, total) = OrderRepo::list(&state.pool, filter, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: orders,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderWithItems>>> {
    auth.require(Resource::Orders, Action::View)?;
    let order = OrderRepo::find_with_items(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Order", id })?;
    Ok(Json(DataResponse::new(order)))
}

/// POST /api/v1/orders
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderWithItems>>)> {
    auth.require(Resource::Orders, Action::Create)?;
    validate_input(&input)?;

    if input.customer_id.is_some() && input.customer.is_some() {
        return Err(CoreError::validation(
            "Provide either customer_id or an inline customer, not both",
        )
        .into());
    }
    let quantities = merge_lines(&input)?;
    let shipping_fee = match input.shipping_fee {
        Some(fee) => fee,
        None => default_shipping_fee(&state).await?,
    };

    let mut tx = state.pool.begin().await?;

    let customer_id = if let Some(id) = input.customer_id {
        if CustomerRepo::lock_for_update(&mut tx, id).await?.is_none() {
            return Err(CoreError::NotFound { entity: "Customer", id }.into());
        }
        id
    } else if let Some(inline) = &input.customer {
        let existing = match inline.email.as_deref() {
            Some(email) => CustomerRepo::find_by_email(&mut tx, email).await?,
            None => None,
        };
        match existing {
            Some(customer) => customer.id,
            None => CustomerRepo::create(&mut tx, inline).await?.id,
        }
    } else {
        return Err(CoreError::validation("Order requires customer_id or an inline customer").into());
    };

    // Lock in ascending id order so concurrent orders cannot deadlock.
    let mut lines = Vec::with_capacity(quantities.len());
    for (&product_id, &quantity) in &quantities {
        let product = ProductRepo::lock_for_update(&mut tx, product_id)
            .await?
            .ok_or_else(|| {
                CoreError::validation(format!("Product {product_id} does not exist"))
            })?;
        if product.status != PRODUCT_STATUS_ACTIVE {
            return Err(CoreError::validation(format!(
                "Product {} is not available for sale",
                product.sku
            ))
            .into());
        }
        if product.stock < quantity {
            return Err(CoreError::validation(format!(
                "Insufficient stock for {}: available {}, requested {quantity}",
                product.sku, product.stock
            ))
            .into());
        }
        lines.push((product, quantity));
    }

    let priced: Vec<PricedLine> = lines
        .iter()
        .map(|(product, quantity)| PricedLine {
            quantity: *quantity,
            unit_price: product.price,
        })
        .collect();
    let subtotal = pricing::subtotal(&priced)?;

    let (coupon_id, discount) = match input.coupon_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let (id, discount) = claim_coupon(&mut tx, code, subtotal, shipping_fee).await?;
            (Some(id), discount)
        }
        _ => (None, 0),
    };

    let totals = OrderTotals::compute(&priced, discount, shipping_fee, state.config.tax_rate_bp)?;

    let order = OrderRepo::insert(
        &mut tx,
        &NewOrder {
            order_number: next_order_number(),
            customer_id,
            payment_method: input.payment_method.clone(),
            subtotal: totals.subtotal,
            discount: totals.discount,
            shipping_fee: totals.shipping_fee,
            tax: totals.tax,
            total: totals.total,
            coupon_id,
            shipping_address: input.shipping_address.clone(),
            note: input.note.clone(),
            created_by: auth.user_id,
        },
    )
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for ((product, quantity), line) in lines.iter().zip(&priced) {
        let item = OrderRepo::insert_item(
            &mut tx,
            order.id,
            &NewOrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                quantity: *quantity,
                unit_price: product.price,
                line_total: line.line_total()?,
            },
        )
        .await?;
        items.push(item);

        move_stock(
            &mut tx,
            product.id,
            product.stock,
            MovementType::Sale,
            *quantity,
            format!("Order {}", order.order_number),
            auth.user_id,
        )
        .await?;
    }

    CustomerRepo::add_order_totals(&mut tx, customer_id, 1, totals.total).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        order_id = order.id,
        order_number = %order.order_number,
        total = order.total,
        "Order created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(OrderWithItems { order, items })),
    ))
}

/// PUT /api/v1/orders/{id}/status
///
/// Moving to `CANCELLED` before shipment restocks every line, releases the
/// coupon use and takes the order out of the customer's totals.
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrderStatus>,
) -> AppResult<Json<DataResponse<OrderWithItems>>> {
    auth.require(Resource::Orders, Action::Update)?;

    let next = input.status.as_deref().map(OrderStatus::parse).transpose()?;
    let payment = input
        .payment_status
        .as_deref()
        .map(PaymentStatus::parse)
        .transpose()?;
    if next.is_none() && payment.is_none() {
        return Err(CoreError::validation("Nothing to update: send status or payment_status").into());
    }

    let mut tx = state.pool.begin().await?;
    let order = OrderRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Order", id })?;
    let current = OrderStatus::parse(&order.status)?;

    if let Some(next) = next.filter(|&n| n != current) {
        validate_transition(current, next)?;

        if next == OrderStatus::Cancelled && current.releases_stock_on_cancel() {
            for item in OrderRepo::items_in_tx(&mut tx, id).await? {
                // Lines whose product was deleted have nothing to restock.
                let Some(product_id) = item.product_id else {
                    continue;
                };
                let Some(product) = ProductRepo::lock_for_update(&mut tx, product_id).await? else {
                    continue;
                };
                move_stock(
                    &mut tx,
                    product.id,
                    product.stock,
                    MovementType::Return,
                    item.quantity,
                    format!("Cancelled order {}", order.order_number),
                    auth.user_id,
                )
                .await?;
            }
            if let Some(coupon_id) = order.coupon_id {
                CouponRepo::release_use(&mut tx, coupon_id).await?;
            }
            CustomerRepo::add_order_totals(&mut tx, order.customer_id, -1, -order.total).await?;
        }
    }

    let updated = OrderRepo::update_status(
        &mut tx,
        id,
        next.map(OrderStatus::as_str),
        payment.map(PaymentStatus::as_str),
    )
    .await?
    .ok_or(CoreError::NotFound { entity: "Order", id })?;
    let items = OrderRepo::items_in_tx(&mut tx, id).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user_id,
        order_id = id,
        from = %current,
        to = %updated.status,
        payment_status = %updated.payment_status,
        "Order status updated"
    );
    Ok(Json(DataResponse::new(OrderWithItems {
        order: updated,
        items,
    })))
}

/// DELETE /api/v1/orders/{id}
///
/// Only CANCELLED or REFUNDED orders can be deleted. Anything else still
/// holds stock, a coupon use and the customer's totals; cancel it first.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Orders, Action::Delete)?;

    let mut tx = state.pool.begin().await?;
    let order = OrderRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Order", id })?;
    let status = OrderStatus::parse(&order.status)?;
    if !status.is_terminal() {
        return Err(CoreError::conflict(format!(
            "Order {} is {status}; cancel it before deleting",
            order.order_number
        ))
        .into());
    }

    OrderRepo::delete(&mut tx, id).await?;
    tx.commit().await?;
    tracing::info!(user_id = auth.user_id, order_id = id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Quantities per product, summing repeated lines. Keyed by id so the
/// iteration order is also the lock order.
fn merge_lines(input: &CreateOrderRequest) -> Result<BTreeMap<DbId, i32>, CoreError> {
    let mut merged = BTreeMap::new();
    for line in &input.items {
        let quantity = merged.entry(line.product_id).or_insert(0i32);
        *quantity = quantity
            .checked_add(line.quantity)
            .ok_or_else(|| CoreError::validation("Quantity out of range"))?;
    }
    Ok(merged)
}

async fn default_shipping_fee(state: &AppState) -> AppResult<Money> {
    let fee = SettingRepo::get(&state.pool, DEFAULT_SHIPPING_FEE_KEY)
        .await?
        .and_then(|setting| setting.value.as_i64())
        .filter(|fee| *fee >= 0)
        .unwrap_or(0);
    Ok(fee)
}

/// Lock the coupon, evaluate it against the order and claim one use.
async fn claim_coupon(
    conn: &mut PgConnection,
    code: &str,
    subtotal: Money,
    shipping_fee: Money,
) -> AppResult<(DbId, Money)> {
    let coupon = CouponRepo::lock_by_code(conn, code)
        .await?
        .ok_or_else(|| CoreError::validation(format!("Coupon '{}' is not valid", code.to_uppercase())))?;

    let discount = evaluate_coupon(&coupon.terms()?, subtotal, shipping_fee, Utc::now())
        .map_err(CoreError::from)?;
    if !CouponRepo::claim_use(conn, coupon.id).await? {
        return Err(CoreError::from(CouponRejection::UsageExhausted).into());
    }
    Ok((coupon.id, discount))
}

/// Apply a stock movement to a locked product and record it in the ledger.
async fn move_stock(
    conn: &mut PgConnection,
    product_id: DbId,
    stock_before: i32,
    movement: MovementType,
    quantity: i32,
    reason: String,
    user_id: DbId,
) -> AppResult<()> {
    let stock_after = apply_movement(stock_before, movement, quantity)?;
    ProductRepo::set_stock(conn, product_id, stock_after).await?;
    InventoryRepo::insert_movement(
        conn,
        &CreateMovement {
            product_id,
            movement_type: movement.as_str().to_string(),
            quantity,
            stock_before,
            stock_after,
            reason: Some(reason),
            user_id: Some(user_id),
        },
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use backoffice_db::models::order::OrderLineInput;

    use super::*;

    fn request(items: &[(DbId, i32)]) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: Some(1),
            customer: None,
            items: items
                .iter()
                .map(|&(product_id, quantity)| OrderLineInput {
                    product_id,
                    quantity,
                })
                .collect(),
            coupon_code: None,
            shipping_fee: None,
            payment_method: None,
            shipping_address: None,
            note: None,
        }
    }

    #[test]
    fn repeated_products_are_summed_in_id_order() {
        let merged = merge_lines(&request(&[(9, 1), (3, 2), (9, 4)])).unwrap();
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec![(3, 2), (9, 5)]);
    }

    #[test]
    fn overflowing_quantities_are_rejected() {
        assert!(merge_lines(&request(&[(1, i32::MAX), (1, 1)])).is_err());
    }
}
