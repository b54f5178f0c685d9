use serde::{Deserialize, Serialize};

use crate::domain::InterviewType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectTypeRequest {
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
}

/// `question` and `category` are only populated for HR interviews.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectTypeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologiesResponse {
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectTechnologyRequest {
    pub technology: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub question: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub interview_type: InterviewType,
    pub technology: Option<String>,
    pub question: String,
    pub answer: String,
}

/// Structured evaluation returned by `/evaluate`; rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub strengths: Option<Vec<String>>,
    #[serde(default)]
    pub weaknesses: Option<Vec<String>>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_type_request_uses_type_key() {
        let body = serde_json::to_value(SelectTypeRequest {
            interview_type: InterviewType::Hr,
        })
        .expect("encode");
        assert_eq!(body, serde_json::json!({ "type": "HR" }));
    }

    #[test]
    fn evaluation_request_sends_null_technology_for_hr() {
        let body = serde_json::to_value(EvaluationRequest {
            interview_type: InterviewType::Hr,
            technology: None,
            question: "Tell me about yourself".into(),
            answer: "I build things".into(),
        })
        .expect("encode");
        assert_eq!(body["interview_type"], "HR");
        assert!(body["technology"].is_null());
        assert_eq!(body["answer"], "I build things");
    }

    #[test]
    fn feedback_tolerates_missing_sections_and_extra_fields() {
        let feedback: Feedback = serde_json::from_str(
            r#"{"strengths":["clear"],"suggestions":[],"score":7}"#,
        )
        .expect("decode");
        assert_eq!(feedback.strengths, Some(vec!["clear".to_string()]));
        assert_eq!(feedback.weaknesses, None);
        assert_eq!(feedback.suggestions, Some(Vec::new()));
    }

    #[test]
    fn technical_select_type_response_has_no_question() {
        let response: SelectTypeResponse =
            serde_json::from_str(r#"{"type":"Technical","technologies":["Python"]}"#)
                .expect("decode");
        assert_eq!(response, SelectTypeResponse::default());
    }
}
