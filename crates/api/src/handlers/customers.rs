//! Handlers for the `/customers` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use backoffice_core::error::CoreError;
use backoffice_core::pagination::{PageRequest, PaginatedResponse};
use backoffice_core::permissions::{Action, Resource};
use backoffice_core::types::DbId;
use backoffice_core::validation::validate_input;
use backoffice_db::models::customer::{
    CreateCustomer, Customer, CustomerListParams, UpdateCustomer,
};
use backoffice_db::models::order::OrderSummary;
use backoffice_db::repositories::order_repo::OrderFilter;
use backoffice_db::repositories::{CustomerRepo, OrderRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/customers
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<CustomerListParams>,
) -> AppResult<Json<PaginatedResponse<Customer>>> {
    auth.require(Resource::Customers, Action::View)?;

    let (limit, offset) = PageRequest {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (customers, total) = CustomerRepo::list(&state.pool, search, limit, offset).await?;
    Ok(Json(PaginatedResponse {
        data: customers,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Customer>>> {
    auth.require(Resource::Customers, Action::View)?;
    let customer = find_customer(&state, id).await?;
    Ok(Json(DataResponse::new(customer)))
}

/// POST /api/v1/customers
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<DataResponse<Customer>>)> {
    auth.require(Resource::Customers, Action::Create)?;
    validate_input(&input)?;

    let mut conn = state.pool.acquire().await?;
    if let Some(email) = input.email.as_deref() {
        if CustomerRepo::find_by_email(&mut conn, email).await?.is_some() {
            return Err(CoreError::conflict(format!(
                "A customer with email {} already exists",
                email.to_lowercase()
            ))
            .into());
        }
    }
    let customer = CustomerRepo::create(&mut conn, &input).await?;

    tracing::info!(user_id = auth.user_id, customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(customer))))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<Json<DataResponse<Customer>>> {
    auth.require(Resource::Customers, Action::Update)?;
    validate_input(&input)?;

    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound { entity: "Customer", id })?;

    tracing::info!(user_id = auth.user_id, customer_id = id, "Customer updated");
    Ok(Json(DataResponse::new(customer)))
}

/// DELETE /api/v1/customers/{id}
///
/// Refused while the customer has orders on record.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    auth.require(Resource::Customers, Action::Delete)?;

    let orders = CustomerRepo::order_count(&state.pool, id).await?;
    if orders > 0 {
        return Err(CoreError::conflict(format!(
            "Customer has {orders} order(s) and cannot be deleted"
        ))
        .into());
    }

    if CustomerRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, customer_id = id, "Customer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound { entity: "Customer", id }.into())
    }
}

/// GET /api/v1/customers/{id}/orders
pub async fn orders(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<PaginatedResponse<OrderSummary>>> {
    auth.require(Resource::Orders, Action::View)?;
    find_customer(&state, id).await?;

    let (limit, offset) = page.resolve();
    let filter = OrderFilter {
        customer_id: Some(id),
        ..OrderFilter::default()
    };
    let (orders, total) = OrderRepo::list(&state.pool, filter, limit, offset).await?;

    Ok(Json(PaginatedResponse {
        data: orders,
        total,
        limit,
        offset,
    }))
}

async fn find_customer(state: &AppState, id: DbId) -> AppResult<Customer> {
    Ok(CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Customer", id })?)
}
