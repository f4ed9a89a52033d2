use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Результат успешного перевода
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
    pub provider_id: String,
    pub source_lang: String,
    pub target_lang: String,
    pub latency_ms: u64,
    /// Словарное определение для выделений из одного слова
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Отказы провайдеров, опробованных до успешного
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ProviderFailure>,
}

impl TranslationResult {
    pub fn with_definition(mut self, definition: Option<String>) -> Self {
        self.definition = definition;
        self
    }
}

impl fmt::Display for TranslationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}->{} {}мс] {}",
            self.provider_id, self.source_lang, self.target_lang, self.latency_ms, self.text
        )
    }
}

/// Причина отказа отдельного кандидата
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Timeout { timeout_ms: u64 },
    InvocationFailed(String),
    UnsupportedLanguage { source_lang: String, target_lang: String },
}

impl From<&AppError> for FailureReason {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::ProviderTimeout { timeout_ms, .. }
            | AppError::CommandTimeout { timeout_ms, .. } => FailureReason::Timeout {
                timeout_ms: *timeout_ms,
            },
            AppError::ProviderInvocationFailed { reason, .. } => {
                FailureReason::InvocationFailed(reason.clone())
            }
            other => FailureReason::InvocationFailed(other.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout { timeout_ms } => write!(f, "таймаут {}мс", timeout_ms),
            FailureReason::InvocationFailed(reason) => write!(f, "{}", reason),
            FailureReason::UnsupportedLanguage {
                source_lang,
                target_lang,
            } => write!(f, "пара {}-{} не поддерживается", source_lang, target_lang),
        }
    }
}

/// Запись об отказе провайдера в цепочке fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider_id: String,
    pub reason: FailureReason,
}

impl ProviderFailure {
    pub fn new(provider_id: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            provider_id: provider_id.into(),
            reason,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.reason)
    }
}

/// Ошибка перевода в виде, пригодном для показа пользователю
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationFailure {
    pub message: String,
    pub attempts: Vec<ProviderFailure>,
}

impl From<&AppError> for TranslationFailure {
    fn from(error: &AppError) -> Self {
        let attempts = match error {
            AppError::AllProvidersExhausted(attempts) => attempts.clone(),
            _ => Vec::new(),
        };
        Self {
            message: error.to_string(),
            attempts,
        }
    }
}

/// То, что получает UI: перевод или ошибка
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Translated(TranslationResult),
    Failed(TranslationFailure),
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

impl From<crate::error::Result<TranslationResult>> for TranslationOutcome {
    fn from(result: crate::error::Result<TranslationResult>) -> Self {
        match result {
            Ok(translation) => TranslationOutcome::Translated(translation),
            Err(e) => TranslationOutcome::Failed(TranslationFailure::from(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_attempts_from_exhaustion() {
        let attempts = vec![ProviderFailure::new(
            "apertium",
            FailureReason::InvocationFailed("exit 1".to_string()),
        )];
        let outcome: TranslationOutcome =
            Err(AppError::AllProvidersExhausted(attempts.clone())).into();

        match outcome {
            TranslationOutcome::Failed(failure) => {
                assert_eq!(failure.attempts, attempts);
                assert!(failure.message.contains("apertium"));
            }
            other => panic!("ожидалась ошибка, получено {:?}", other),
        }
    }

    #[test]
    fn test_reason_from_provider_errors() {
        let timeout = AppError::ProviderTimeout {
            provider: "google".to_string(),
            timeout_ms: 250,
        };
        assert_eq!(FailureReason::from(&timeout), FailureReason::Timeout { timeout_ms: 250 });

        let failed = AppError::ProviderInvocationFailed {
            provider: "google".to_string(),
            reason: "503".to_string(),
        };
        assert_eq!(
            FailureReason::from(&failed),
            FailureReason::InvocationFailed("503".to_string())
        );
    }

    #[test]
    fn test_invalid_input_has_no_attempts() {
        let outcome: TranslationOutcome =
            Err(AppError::InvalidInput("пустой текст".to_string())).into();
        assert!(!outcome.is_success());
        if let TranslationOutcome::Failed(failure) = outcome {
            assert!(failure.attempts.is_empty());
        }
    }
}
