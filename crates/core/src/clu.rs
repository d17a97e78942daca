// crates/core/src/clu.rs
//! Azure Conversational Language Understanding (CLU) client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{IntentClassifier, Prediction};
use crate::error::ClassifierError;

const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Connection settings for a deployed CLU project.
#[derive(Clone)]
pub struct CluConfig {
    /// Full `:analyze-conversations` URL of the language resource.
    pub endpoint: String,
    pub api_key: String,
    pub project_name: String,
    pub deployment_name: String,
    pub timeout: Duration,
}

impl fmt::Debug for CluConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CluConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("deployment_name", &self.deployment_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// `IntentClassifier` backed by a CLU deployment.
pub struct CluClient {
    http: reqwest::Client,
    config: CluConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'static str,
    analysis_input: AnalysisInput<'a>,
    parameters: AnalyzeParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisInput<'a> {
    conversation_item: ConversationItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationItem<'a> {
    id: &'static str,
    participant_id: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeParameters<'a> {
    project_name: &'a str,
    deployment_name: &'a str,
    string_index_type: &'static str,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    result: AnalyzeResult,
}

#[derive(Deserialize)]
struct AnalyzeResult {
    prediction: Prediction,
}

impl CluClient {
    pub fn new(config: CluConfig) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn request_body<'a>(&'a self, text: &'a str) -> AnalyzeRequest<'a> {
        AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: "1",
                    participant_id: "1",
                    text,
                },
            },
            parameters: AnalyzeParameters {
                project_name: &self.config.project_name,
                deployment_name: &self.config.deployment_name,
                string_index_type: "TextElement_V8",
            },
        }
    }
}

#[async_trait]
impl IntentClassifier for CluClient {
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse =
            serde_json::from_str(&body).map_err(|e| ClassifierError::Decode(e.to_string()))?;
        debug!(
            top_intent = %parsed.result.prediction.top_intent,
            candidates = parsed.result.prediction.intents.len(),
            "CLU prediction received"
        );
        Ok(parsed.result.prediction)
    }

    fn name(&self) -> &str {
        "azure-clu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> CluConfig {
        CluConfig {
            endpoint: format!("{}/language/:analyze-conversations", server.uri()),
            api_key: "test-key".into(),
            project_name: "bot_intents".into(),
            deployment_name: "bot_dep".into(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = CluConfig {
            endpoint: "https://lang.example.com/language/:analyze-conversations".into(),
            api_key: "sk-live-1234".into(),
            project_name: "bot_intents".into(),
            deployment_name: "bot_dep".into(),
            timeout: Duration::from_secs(10),
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-live-1234"), "{printed}");
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("bot_intents"));
    }

    #[tokio::test]
    async fn classify_sends_conversation_request_and_parses_prediction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/language/:analyze-conversations"))
            .and(header("Ocp-Apim-Subscription-Key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "kind": "Conversation",
                "analysisInput": {
                    "conversationItem": { "id": "1", "participantId": "1", "text": "hello there" }
                },
                "parameters": {
                    "projectName": "bot_intents",
                    "deploymentName": "bot_dep",
                    "stringIndexType": "TextElement_V8"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "ConversationResult",
                "result": {
                    "query": "hello there",
                    "prediction": {
                        "topIntent": "greet",
                        "projectKind": "Conversation",
                        "intents": [
                            { "category": "greet", "confidenceScore": 0.95 },
                            { "category": "None", "confidenceScore": 0.03 }
                        ],
                        "entities": []
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CluClient::new(config_for(&server)).unwrap();
        let prediction = client.classify("hello there").await.unwrap();

        assert_eq!(prediction.top_intent, "greet");
        assert_eq!(prediction.intents.len(), 2);
        assert_eq!(prediction.top_confidence(), Some(0.95));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("access denied"))
            .mount(&server)
            .await;

        let client = CluClient::new(config_for(&server)).unwrap();
        let err = client.classify("hi").await.unwrap_err();

        match err {
            ClassifierError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "access denied");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"unexpected\":true}"))
            .mount(&server)
            .await;

        let client = CluClient::new(config_for(&server)).unwrap();
        let err = client.classify("hi").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.timeout = Duration::from_millis(100);
        let client = CluClient::new(config).unwrap();

        let err = client.classify("hi").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Request(_)));
    }
}
