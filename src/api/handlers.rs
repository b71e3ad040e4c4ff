use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::customer::{CustomerError, CustomerService};
use crate::models::{CustomerUpdate, NewCustomer};
use super::error::ApiError;
use super::merchant::MerchantContext;

// ============================================================================
// Customer HTTP Handlers
// ============================================================================
//
// Every route acts for the merchant in `MerchantContext`. Per-customer routes
// resolve the customer through the merchant-scoped lookup first, so another
// merchant's customer is indistinguishable from a missing one.
//
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddLoyaltyPointsRequest {
    pub points: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddLoyaltyPointsResponse {
    pub total_points: i32,
}

pub async fn create_customer(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let customer = service
        .create_customer(NewCustomer {
            id: None,
            merchant_id: merchant.merchant_id,
            name: body.name,
            phone: body.phone,
            email: body.email,
            address: body.address,
        })
        .await?;

    Ok(HttpResponse::Created().json(customer))
}

pub async fn list_customers(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = service
        .list_customers(
            &merchant.merchant_id.to_string(),
            query.page.unwrap_or(0),
            query.page_size.unwrap_or(0),
            query.search.as_deref().unwrap_or(""),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

pub async fn find_customer_by_phone(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    phone: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let customer = service
        .find_customer_by_phone(&merchant.merchant_id.to_string(), &phone)
        .await?;

    Ok(HttpResponse::Ok().json(customer))
}

pub async fn get_customer(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let customer = service
        .get_customer_for_merchant(&merchant.merchant_id.to_string(), &id)
        .await?;

    Ok(HttpResponse::Ok().json(customer))
}

pub async fn update_customer(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    id: web::Path<String>,
    body: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let existing = service
        .get_customer_for_merchant(&merchant.merchant_id.to_string(), &id)
        .await?;

    let body = body.into_inner();
    let updated = service
        .update_customer(CustomerUpdate {
            id: existing.id,
            name: body.name,
            phone: body.phone,
            email: body.email,
            address: body.address,
        })
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Responds 204 for unknown ids too. Customers of other merchants are left alone.
pub async fn delete_customer(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    match service
        .get_customer_for_merchant(&merchant.merchant_id.to_string(), &id)
        .await
    {
        Ok(customer) => service.delete_customer(&customer.id.to_string()).await?,
        Err(CustomerError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_loyalty_points(
    service: web::Data<dyn CustomerService>,
    merchant: MerchantContext,
    id: web::Path<String>,
    body: web::Json<AddLoyaltyPointsRequest>,
) -> Result<HttpResponse, ApiError> {
    let customer = service
        .get_customer_for_merchant(&merchant.merchant_id.to_string(), &id)
        .await?;

    let total_points = service
        .add_loyalty_points(&customer.id.to_string(), body.points)
        .await?;

    Ok(HttpResponse::Ok().json(AddLoyaltyPointsResponse { total_points }))
}
