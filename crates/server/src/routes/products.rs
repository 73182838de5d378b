//! Catalog product handlers.
//!
//! Create and update accept `multipart/form-data`: scalar fields carry
//! the product attributes, file fields carry images forwarded to the
//! image-storage collaborator.

use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{CategoryId, ProductId};

use crate::auth::{Bearer, Operation};
use crate::error::ApiError;
use crate::models::{Product, ProductInput};
use crate::response::ApiResponse;
use crate::services::ImageUpload;
use crate::state::AppState;

use super::PageQuery;

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    state
        .gate()
        .authorize(Operation::ProductsList.required_roles(), auth.as_deref())?;
    let (products, meta) = state.products().list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::paged(products, meta)))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn get(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    state
        .gate()
        .authorize(Operation::ProductsGet.required_roles(), auth.as_deref())?;
    let product = state.products().get(id).await?;
    Ok(Json(ApiResponse::ok(product)))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    state
        .gate()
        .authorize(Operation::ProductsCreate.required_roles(), auth.as_deref())?;
    let (input, uploads) = parse_product_form(multipart).await?;
    let product = state.products().create(input, uploads).await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok(Json(ApiResponse::ok(product)))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    state
        .gate()
        .authorize(Operation::ProductsUpdate.required_roles(), auth.as_deref())?;
    let (input, uploads) = parse_product_form(multipart).await?;
    let product = state.products().update(id, input, uploads).await?;
    Ok(Json(ApiResponse::ok(product)))
}

#[instrument(skip_all, fields(product_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<ProductId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .gate()
        .authorize(Operation::ProductsDelete.required_roles(), auth.as_deref())?;
    state.products().delete(id).await?;
    Ok(Json(ApiResponse::ok_with_message(None, "Product deleted")))
}

/// Target of the image passthrough endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub product_id: ProductId,
}

#[instrument(skip_all, fields(product_id = %query.product_id))]
pub async fn upload_images(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    state.gate().authorize(
        Operation::ProductsUploadImages.required_roles(),
        auth.as_deref(),
    )?;
    let (_, uploads) = parse_product_form(multipart).await?;
    let product = state
        .products()
        .upload_images(query.product_id, uploads)
        .await?;
    Ok(Json(ApiResponse::ok(product)))
}

/// Split a multipart form into product attributes and file uploads.
///
/// Fields carrying a filename are treated as images regardless of their
/// field name; scalar fields map onto [`ProductInput`]. Unknown scalar
/// fields are ignored.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(ProductInput, Vec<ImageUpload>), ApiError> {
    let mut input = ProductInput::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidArgument(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if let Some(filename) = field.file_name() {
            let filename = filename.to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidArgument(format!("Malformed form data: {e}")))?;
            uploads.push(ImageUpload {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::InvalidArgument(format!("Malformed form data: {e}")))?;
        match name.as_str() {
            "name" => input.name = Some(value),
            "description" => input.description = Some(value),
            "price" => input.price = Some(parse_decimal("price", &value)?),
            "discountPrice" => input.discount_price = Some(parse_decimal("discountPrice", &value)?),
            "stock" => {
                input.stock = Some(value.parse().map_err(|_| {
                    ApiError::InvalidArgument(format!("Invalid stock value: {value}"))
                })?);
            }
            "categoryId" => {
                input.category_id = Some(value.parse::<CategoryId>().map_err(|_| {
                    ApiError::InvalidArgument(format!("Invalid categoryId: {value}"))
                })?);
            }
            _ => {}
        }
    }

    Ok((input, uploads))
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::InvalidArgument(format!("Invalid {field} value: {value}")))
}
