use serde::{Deserialize, Serialize};

pub mod models {
    use super::*;
    use chrono::{DateTime, Utc};
    use std::fmt;

    /// A subscription tier. Prices are kept in minor currency units.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Plan {
        pub id: String,
        pub name: String,
        pub description: String,
        pub price: i64,
        pub issued_key: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SubscriptionStatus {
        Active,
    }

    impl SubscriptionStatus {
        pub fn as_str(&self) -> &'static str {
            match self {
                SubscriptionStatus::Active => "active",
            }
        }

        /// Capitalised form used in chat messages.
        pub fn label(&self) -> &'static str {
            match self {
                SubscriptionStatus::Active => "Active",
            }
        }
    }

    impl fmt::Display for SubscriptionStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Subscription {
        pub plan_id: String,
        pub issued_key: String,
        pub status: SubscriptionStatus,
        pub activated_at: DateTime<Utc>,
    }

    impl Subscription {
        pub fn activate(plan: &Plan) -> Self {
            Self {
                plan_id: plan.id.clone(),
                issued_key: plan.issued_key.clone(),
                status: SubscriptionStatus::Active,
                activated_at: Utc::now(),
            }
        }

        pub fn is_active(&self) -> bool {
            self.status == SubscriptionStatus::Active
        }
    }
}

pub mod api {
    use super::*;

    pub mod gemini {
        use super::*;

        #[derive(Debug, Serialize, Deserialize)]
        pub struct GenerateContentRequest {
            pub contents: Vec<Content>,
        }

        impl GenerateContentRequest {
            pub fn from_prompt(prompt: &str) -> Self {
                Self {
                    contents: vec![Content {
                        parts: vec![Part {
                            text: Some(prompt.to_string()),
                        }],
                    }],
                }
            }
        }

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct Content {
            #[serde(default)]
            pub parts: Vec<Part>,
        }

        #[derive(Debug, Default, Serialize, Deserialize)]
        pub struct Part {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub text: Option<String>,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct GenerateContentResponse {
            #[serde(default)]
            pub candidates: Vec<Candidate>,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct Candidate {
            pub content: Option<Content>,
        }

        impl GenerateContentResponse {
            /// Text of the first part of the first candidate, if the model produced one.
            pub fn first_text(&self) -> Option<&str> {
                self.candidates
                    .first()?
                    .content
                    .as_ref()?
                    .parts
                    .first()?
                    .text
                    .as_deref()
            }
        }
    }

    pub mod speech {
        use super::*;

        #[derive(Debug, Serialize, Deserialize)]
        pub struct RecognizeRequest {
            pub config: RecognitionConfig,
            pub audio: RecognitionAudio,
        }

        #[derive(Debug, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct RecognitionConfig {
            pub encoding: String,
            pub sample_rate_hertz: u32,
            pub language_code: String,
        }

        #[derive(Debug, Serialize, Deserialize)]
        pub struct RecognitionAudio {
            /// Base64 encoded audio bytes.
            pub content: String,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct RecognizeResponse {
            #[serde(default)]
            pub results: Vec<RecognitionResult>,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct RecognitionResult {
            #[serde(default)]
            pub alternatives: Vec<Alternative>,
        }

        #[derive(Debug, Default, Deserialize)]
        pub struct Alternative {
            #[serde(default)]
            pub transcript: String,
            pub confidence: Option<f32>,
        }

        impl RecognizeResponse {
            /// Joins the best alternative of every result. Long recordings come back
            /// as several consecutive results.
            pub fn transcript(&self) -> Option<String> {
                let text = self
                    .results
                    .iter()
                    .filter_map(|r| r.alternatives.first())
                    .map(|a| a.transcript.trim())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");

                if text.is_empty() { None } else { Some(text) }
            }
        }
    }
}
