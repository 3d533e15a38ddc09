//! Query parameter types for the read endpoints.

use aquawatch_core::alert_log::{AlertFilter, AlertStatusFilter};
use aquawatch_core::timeseries::{ReadingQuery, DEFAULT_QUERY_LIMIT};
use aquawatch_core::types::Timestamp;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;

/// Query-string extractor whose rejection is an [`AppError`], so malformed
/// parameters get the same JSON error body as every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// `GET /api/readings?stationId=&from=&to=&limit=`
///
/// `from` and `to` are RFC 3339 timestamps, both inclusive.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsParams {
    pub station_id: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<usize>,
}

impl ReadingsParams {
    /// Convert into a store query. A zero limit is rejected.
    pub fn to_query(&self) -> Result<ReadingQuery, AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        if limit == 0 {
            return Err(AppError::BadRequest("limit must be at least 1".into()));
        }
        Ok(ReadingQuery {
            from: self.from,
            to: self.to,
            limit,
        })
    }
}

/// `GET /api/alerts?stationId=&status=open|resolved`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsParams {
    pub station_id: Option<String>,
    pub status: Option<AlertStatusFilter>,
}

impl From<AlertsParams> for AlertFilter {
    fn from(params: AlertsParams) -> Self {
        AlertFilter {
            station_id: params.station_id.filter(|id| !id.is_empty()),
            status: params.status,
        }
    }
}
