use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::InterviewType,
    error::ApiFailure,
    protocol::{
        EvaluationRequest, Feedback, QuestionResponse, SelectTechnologyRequest, SelectTypeRequest,
        SelectTypeResponse, TechnologiesResponse,
    },
};
use tracing::{debug, warn};

/// The remote question/evaluation service.
#[async_trait]
pub trait InterviewApi: Send + Sync {
    async fn select_type(
        &self,
        interview_type: InterviewType,
    ) -> Result<SelectTypeResponse, ApiFailure>;
    async fn list_technologies(&self) -> Result<Vec<String>, ApiFailure>;
    async fn select_technology(&self, technology: &str) -> Result<QuestionResponse, ApiFailure>;
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Feedback, ApiFailure>;
}

pub struct HttpInterviewClient {
    http: Client,
    base_url: String,
}

impl HttpInterviewClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn read_json<T: DeserializeOwned>(path: &str, res: Response) -> Result<T, ApiFailure> {
    let status = res.status();
    if !status.is_success() {
        warn!(path, status = status.as_u16(), "interview service returned error status");
        return Err(ApiFailure::Status {
            status: status.as_u16(),
        });
    }
    res.json::<T>()
        .await
        .map_err(|err| ApiFailure::Decode(err.to_string()))
}

fn transport(err: reqwest::Error) -> ApiFailure {
    ApiFailure::Transport(err.to_string())
}

#[async_trait]
impl InterviewApi for HttpInterviewClient {
    async fn select_type(
        &self,
        interview_type: InterviewType,
    ) -> Result<SelectTypeResponse, ApiFailure> {
        debug!(%interview_type, "POST /select-type");
        let res = self
            .http
            .post(self.endpoint("/select-type"))
            .json(&SelectTypeRequest { interview_type })
            .send()
            .await
            .map_err(transport)?;
        read_json("/select-type", res).await
    }

    async fn list_technologies(&self) -> Result<Vec<String>, ApiFailure> {
        debug!("GET /technologies");
        let res = self
            .http
            .get(self.endpoint("/technologies"))
            .send()
            .await
            .map_err(transport)?;
        let body: TechnologiesResponse = read_json("/technologies", res).await?;
        Ok(body.technologies)
    }

    async fn select_technology(&self, technology: &str) -> Result<QuestionResponse, ApiFailure> {
        debug!(technology, "POST /select-technology");
        let res = self
            .http
            .post(self.endpoint("/select-technology"))
            .json(&SelectTechnologyRequest {
                technology: technology.to_string(),
            })
            .send()
            .await
            .map_err(transport)?;
        read_json("/select-technology", res).await
    }

    async fn evaluate(&self, request: &EvaluationRequest) -> Result<Feedback, ApiFailure> {
        debug!(interview_type = %request.interview_type, "POST /evaluate");
        let res = self
            .http
            .post(self.endpoint("/evaluate"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        read_json("/evaluate", res).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
