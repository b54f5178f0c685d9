use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownInterviewType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterviewType {
    #[serde(rename = "HR")]
    Hr,
    Technical,
}

impl InterviewType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::Technical => "Technical",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = UnknownInterviewType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hr" => Ok(Self::Hr),
            "technical" | "tech" => Ok(Self::Technical),
            _ => Err(UnknownInterviewType(raw.to_string())),
        }
    }
}

/// A question as shown on the question panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub category: String,
}

impl Question {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("{} Interview Question", self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interview_type_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&InterviewType::Hr).expect("encode"),
            "\"HR\""
        );
        assert_eq!(
            serde_json::from_str::<InterviewType>("\"Technical\"").expect("decode"),
            InterviewType::Technical
        );
    }

    #[test]
    fn parses_interview_type_case_insensitively() {
        assert_eq!("hr".parse::<InterviewType>(), Ok(InterviewType::Hr));
        assert_eq!(" Tech ".parse::<InterviewType>(), Ok(InterviewType::Technical));
        assert!("sales".parse::<InterviewType>().is_err());
    }

    #[test]
    fn question_title_includes_category() {
        assert_eq!(
            Question::new("Explain decorators", "Python").title(),
            "Python Interview Question"
        );
    }
}
