use crate::domain::BookId;
use crate::ports::rating_service::{
    RatingAck, RatingService, RatingServiceError, RatingSubmission, Result,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

/// `GET /ratings/{id}` のレスポンス
#[derive(Debug, Deserialize)]
struct AverageResponse {
    average: f64,
}

/// HTTP implementation of RatingService
///
/// Talks to the external rating microservice at a configured base URL.
/// The request timeout bounds every call, so an unresponsive service
/// surfaces as `RatingServiceError::Timeout`.
#[derive(Clone)]
pub struct HttpRatingClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRatingClient {
    /// Build a client for `base_url` whose calls give up after `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RatingServiceError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn ratings_url(&self, book_id: BookId) -> String {
        format!("{}/ratings/{}", self.base_url, book_id)
    }

    fn map_send_error(&self, err: reqwest::Error) -> RatingServiceError {
        if err.is_timeout() {
            RatingServiceError::Timeout(self.timeout)
        } else {
            RatingServiceError::Request(err.to_string())
        }
    }

    /// Reject non-2xx responses before the body is decoded
    fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(RatingServiceError::UnexpectedStatus(status.as_u16()));
        }
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                RatingServiceError::Timeout(self.timeout)
            } else {
                RatingServiceError::MalformedResponse(e.to_string())
            }
        })
    }
}

#[async_trait]
impl RatingService for HttpRatingClient {
    async fn fetch_average(&self, book_id: BookId) -> Result<f64> {
        let response = self
            .client
            .get(self.ratings_url(book_id))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body: AverageResponse = self.decode(Self::ensure_success(response)?).await?;
        Ok(body.average)
    }

    async fn submit_rating(
        &self,
        book_id: BookId,
        rating: &RatingSubmission,
    ) -> Result<RatingAck> {
        let response = self
            .client
            .post(self.ratings_url(book_id))
            .query(&[("value", rating.value.as_str()), ("email", rating.email.as_str())])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        self.decode(Self::ensure_success(response)?).await
    }
}
