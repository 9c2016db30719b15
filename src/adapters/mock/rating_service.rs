use crate::domain::BookId;
use crate::ports::rating_service::{
    RatingAck, RatingService as RatingServiceTrait, RatingServiceError, RatingSubmission, Result,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Mock implementation of RatingService
///
/// Averages are registered per book. The service can be switched to fail
/// or to stall before answering, which is how the deadline handling is
/// exercised in tests. Submitted ratings are recorded.
#[allow(dead_code)]
pub struct RatingService {
    averages: Mutex<HashMap<BookId, f64>>,
    submissions: Mutex<Vec<(BookId, RatingSubmission)>>,
    failing: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

#[allow(dead_code)]
impl RatingService {
    pub fn new() -> Self {
        Self {
            averages: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
            delay: Mutex::new(None),
        }
    }

    /// Register the average reported for a book
    pub fn set_average(&self, book_id: BookId, average: f64) {
        self.averages.lock().unwrap().insert(book_id, average);
    }

    /// Make every call fail with a malformed-response error
    pub fn fail_requests(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Stall every call for `delay` before answering
    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Ratings received so far, in submission order
    pub fn submissions(&self) -> Vec<(BookId, RatingSubmission)> {
        self.submissions.lock().unwrap().clone()
    }

    async fn simulate_latency(&self) -> Result<()> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(RatingServiceError::MalformedResponse(
                "mock rating service failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RatingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RatingServiceTrait for RatingService {
    /// Return the registered average, or 0 when the book has none
    async fn fetch_average(&self, book_id: BookId) -> Result<f64> {
        self.simulate_latency().await?;
        Ok(self
            .averages
            .lock()
            .unwrap()
            .get(&book_id)
            .copied()
            .unwrap_or(0.0))
    }

    /// Record the submission and acknowledge it
    async fn submit_rating(
        &self,
        book_id: BookId,
        rating: &RatingSubmission,
    ) -> Result<RatingAck> {
        self.simulate_latency().await?;
        self.submissions
            .lock()
            .unwrap()
            .push((book_id, rating.clone()));
        Ok(json!({ "book_id": book_id.value(), "value": rating.value }))
    }
}
