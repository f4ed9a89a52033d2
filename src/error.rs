use crate::events::ProviderFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Неизвестный провайдер: {0}")]
    UnknownProvider(String),

    #[error("Провайдер недоступен: {0}")]
    ProviderUnavailable(String),

    #[error("Провайдер {provider} не ответил за {timeout_ms}мс")]
    ProviderTimeout { provider: String, timeout_ms: u64 },

    #[error("Ошибка вызова провайдера {provider}: {reason}")]
    ProviderInvocationFailed { provider: String, reason: String },

    #[error("Все провайдеры перевода исчерпаны: {}", format_failures(.0))]
    AllProvidersExhausted(Vec<ProviderFailure>),

    #[error("Не удалось прочитать выделение: {0}")]
    SelectionReadFailed(String),

    #[error("Некорректный ввод: {0}")]
    InvalidInput(String),

    #[error("Утилита {0} не найдена")]
    ToolNotFound(String),

    #[error("Команда {program} завершилась с ошибкой: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Команда {program} не завершилась за {timeout_ms}мс")]
    CommandTimeout { program: String, timeout_ms: u64 },

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_input<T>(msg: impl Into<String>) -> Result<T> {
        Err(AppError::InvalidInput(msg.into()))
    }
}

fn format_failures(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "нет кандидатов".to_string();
    }
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, AppError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! app_error {
    (invalid_input, $($arg:tt)*) => {
        $crate::error::AppError::InvalidInput(format!($($arg)*))
    };
    (unknown_provider, $($arg:tt)*) => {
        $crate::error::AppError::UnknownProvider(format!($($arg)*))
    };
    (provider_unavailable, $($arg:tt)*) => {
        $crate::error::AppError::ProviderUnavailable(format!($($arg)*))
    };
    (selection_read, $($arg:tt)*) => {
        $crate::error::AppError::SelectionReadFailed(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::AppError::Internal(format!($($arg)*))
    };
}
