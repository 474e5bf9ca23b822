//! Offer ledger handlers.
//!
//! ```text
//! POST  /offers                {"propertyId":"…","userEmail":"…","amount":250000}
//! GET   /offers?userEmail=&propertyId=
//! GET   /offers/{id}
//! PATCH /offers/{id}/accept
//! PATCH /offers/{id}/reject
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NewOfferRequest, Offer, OfferFilter, OfferPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::access_gate::{CurrentActor, FORBIDDEN_MESSAGE, MaybeAuthenticated};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    USER_EMAIL, parse_amount, parse_email, parse_offer_id, parse_property_id,
};

/// Body for `POST /offers`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOfferRequest {
    #[schema(example = "9b2f3c4e-1a2b-4c3d-8e9f-0a1b2c3d4e5f")]
    pub property_id: String,
    #[schema(example = "buyer@example.com")]
    pub user_email: String,
    /// Whole currency units.
    #[schema(example = 250000)]
    pub amount: i64,
}

/// Filters for `GET /offers`; omitted filters match every offer.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OfferQuery {
    pub user_email: Option<String>,
    pub property_id: Option<String>,
}

impl OfferQuery {
    fn into_filter(self) -> Result<OfferFilter, Error> {
        let user_email = non_empty(self.user_email)
            .map(|raw| parse_email(USER_EMAIL, &raw))
            .transpose()?;
        let property_id = non_empty(self.property_id)
            .map(|raw| parse_property_id(&raw))
            .transpose()?;
        Ok(OfferFilter {
            property_id,
            user_email,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Submit a purchase offer in the `pending` state.
///
/// When the caller is signed in, the offer must be made in their own name.
#[utoipa::path(
    post,
    path = "/offers",
    request_body = SubmitOfferRequest,
    responses(
        (status = 201, description = "Offer recorded", body = OfferPayload),
        (status = 400, description = "Invalid amount, email or property id", body = Error),
        (status = 401, description = "Session required by route policy", body = Error),
        (status = 403, description = "Offer made on behalf of someone else", body = Error),
        (status = 404, description = "Property not found", body = Error)
    ),
    tags = ["offers"],
    operation_id = "submitOffer",
    security((), ("cookieAuth" = []))
)]
pub async fn submit_offer(
    state: web::Data<HttpState>,
    MaybeAuthenticated(identity): MaybeAuthenticated,
    payload: web::Json<SubmitOfferRequest>,
) -> ApiResult<HttpResponse> {
    let SubmitOfferRequest {
        property_id,
        user_email,
        amount,
    } = payload.into_inner();
    let request = NewOfferRequest {
        property_id: parse_property_id(&property_id)?,
        user_email: parse_email(USER_EMAIL, &user_email)?,
        amount: parse_amount(amount)?,
    };
    if identity.is_some_and(|identity| identity.email() != &request.user_email) {
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    let offer = state.offers.submit(&request).await?;
    Ok(HttpResponse::Created().json(offer))
}

/// List offers, optionally by buyer and/or property.
#[utoipa::path(
    get,
    path = "/offers",
    params(OfferQuery),
    responses(
        (status = 200, description = "Offers in submission order", body = [OfferPayload]),
        (status = 400, description = "Malformed filter", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listOffers",
    security([])
)]
pub async fn list_offers(
    state: web::Data<HttpState>,
    query: web::Query<OfferQuery>,
) -> ApiResult<web::Json<Vec<Offer>>> {
    let filter = query.into_inner().into_filter()?;
    Ok(web::Json(state.offers.list(&filter).await?))
}

/// Fetch one offer.
#[utoipa::path(
    get,
    path = "/offers/{id}",
    params(("id" = String, Path, description = "Offer identifier")),
    responses(
        (status = 200, description = "Offer", body = OfferPayload),
        (status = 404, description = "Offer not found", body = Error)
    ),
    tags = ["offers"],
    operation_id = "getOffer",
    security([])
)]
pub async fn get_offer(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Offer>> {
    let id = parse_offer_id(&path)?;
    Ok(web::Json(state.offers.get(&id).await?))
}

/// Accept an offer and reject every other offer on the same property.
#[utoipa::path(
    patch,
    path = "/offers/{id}/accept",
    params(("id" = String, Path, description = "Offer identifier")),
    responses(
        (status = 200, description = "Accepted offer", body = OfferPayload),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Caller is neither admin nor owner", body = Error),
        (status = 404, description = "Offer not found", body = Error)
    ),
    tags = ["offers"],
    operation_id = "acceptOffer",
    security(("cookieAuth" = []))
)]
pub async fn accept_offer(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<Offer>> {
    let id = parse_offer_id(&path)?;
    Ok(web::Json(state.offers.accept(&actor, &id).await?))
}

/// Reject an offer. Rejecting twice is harmless; accepted offers stay
/// accepted.
#[utoipa::path(
    patch,
    path = "/offers/{id}/reject",
    params(("id" = String, Path, description = "Offer identifier")),
    responses(
        (status = 200, description = "Rejected offer", body = OfferPayload),
        (status = 400, description = "Offer is already accepted", body = Error),
        (status = 401, description = "No valid session", body = Error),
        (status = 403, description = "Caller is neither admin nor owner", body = Error),
        (status = 404, description = "Offer not found", body = Error)
    ),
    tags = ["offers"],
    operation_id = "rejectOffer",
    security(("cookieAuth" = []))
)]
pub async fn reject_offer(
    state: web::Data<HttpState>,
    CurrentActor(actor): CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<Offer>> {
    let id = parse_offer_id(&path)?;
    Ok(web::Json(state.offers.reject(&actor, &id).await?))
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
