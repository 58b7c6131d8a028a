use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::SubmissionRateLimiter;
use crate::submission::SubmissionPipeline;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub pipeline: SubmissionPipeline,
    pub submission_limiter: SubmissionRateLimiter,
}
