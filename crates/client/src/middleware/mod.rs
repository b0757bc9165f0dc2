//! Middleware pipeline for outgoing requests
//!
//! The transport runs every request through an ordered list of stages:
//! request stages mutate the outgoing request before transmission, and
//! response stages observe the response and either let it through or ask
//! for the original request to be sent again. Retry state is carried in an
//! explicit per-call [`AttemptContext`] rather than stashed on the request
//! object itself.

pub mod authorization;
pub mod reauth;

pub use authorization::BearerAuth;
pub use reauth::RefreshOnUnauthorized;

use async_trait::async_trait;

use crate::error::ClientError;

/// Per-call retry state threaded through the response stages
///
/// At most one replay is ever attempted for a single call.
#[derive(Debug, Default)]
pub struct AttemptContext {
    retried: bool,
}

impl AttemptContext {
    /// Whether a replay has already been attempted for this call
    pub fn retried(&self) -> bool {
        self.retried
    }

    /// Mark the replay as spent
    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// Decision returned by a response stage
#[derive(Debug)]
pub enum ResponseAction {
    /// Hand the response to the next stage, or to the caller
    Deliver(reqwest::Response),
    /// Discard the response and send the original request again
    Replay,
}

/// Pre-transmission transform applied to every outgoing request
pub trait RequestStage: Send + Sync {
    /// Mutate the request in place; must not fail
    fn apply(&self, request: &mut reqwest::Request);
}

/// Post-response hook that passes a response through or requests a replay
#[async_trait]
pub trait ResponseStage: Send + Sync {
    async fn handle(
        &self,
        response: reqwest::Response,
        attempt: &mut AttemptContext,
    ) -> Result<ResponseAction, ClientError>;
}

/// Ordered middleware stages driving a request to completion
pub struct Pipeline {
    http: reqwest::Client,
    request_stages: Vec<Box<dyn RequestStage>>,
    response_stages: Vec<Box<dyn ResponseStage>>,
}

impl Pipeline {
    pub(crate) fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        }
    }

    pub(crate) fn push_request_stage(&mut self, stage: impl RequestStage + 'static) {
        self.request_stages.push(Box::new(stage));
    }

    pub(crate) fn push_response_stage(&mut self, stage: impl ResponseStage + 'static) {
        self.response_stages.push(Box::new(stage));
    }

    /// Run `request` through the stages until a response is delivered
    ///
    /// Each attempt works on a fresh clone of the original request, so a
    /// replay picks up whatever the request stages read at that moment
    /// (in particular, a renewed access token).
    pub async fn execute(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, ClientError> {
        let mut attempt = AttemptContext::default();

        loop {
            let mut outgoing = request.try_clone().ok_or_else(|| {
                ClientError::Configuration("request body is not replayable".into())
            })?;
            for stage in &self.request_stages {
                stage.apply(&mut outgoing);
            }

            let response = self.http.execute(outgoing).await?;

            match self.run_response_stages(response, &mut attempt).await? {
                Some(response) => return Ok(response),
                None => continue,
            }
        }
    }

    async fn run_response_stages(
        &self,
        mut response: reqwest::Response,
        attempt: &mut AttemptContext,
    ) -> Result<Option<reqwest::Response>, ClientError> {
        for stage in &self.response_stages {
            match stage.handle(response, attempt).await? {
                ResponseAction::Deliver(delivered) => response = delivered,
                ResponseAction::Replay => return Ok(None),
            }
        }
        Ok(Some(response))
    }
}
