use crate::error::{AppError, Result};
use crate::events::{FailureReason, ProviderFailure, TranslationResult};
use crate::services::registry::{ProviderDescriptor, ProviderRegistry};
use crate::utils::text::preview;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

type Candidates = SmallVec<[Arc<ProviderDescriptor>; 4]>;

/// Выбор провайдера и переход к следующему при отказе
pub struct TranslationDispatcher {
    registry: Arc<ProviderRegistry>,
}

impl TranslationDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
        preferred_provider: Option<&str>,
    ) -> Result<TranslationResult> {
        let text = text.trim();
        if text.is_empty() {
            return AppError::invalid_input("пустой текст");
        }
        if source_lang.trim().is_empty() || target_lang.trim().is_empty() {
            return AppError::invalid_input(format!(
                "пустой код языка: '{}'-'{}'",
                source_lang, target_lang
            ));
        }

        let candidates = self.candidates(preferred_provider);
        if candidates.is_empty() {
            return Err(AppError::ProviderUnavailable(
                "ни у одного провайдера нет нужных утилит".to_string(),
            ));
        }

        let mut failures = Vec::with_capacity(candidates.len());

        for descriptor in candidates {
            match self.try_candidate(&descriptor, text, source_lang, target_lang).await {
                Ok(mut result) => {
                    info!(
                        "Перевод получен от {} за {}мс (отказов до этого: {})",
                        result.provider_id,
                        result.latency_ms,
                        failures.len()
                    );
                    result.failures = failures;
                    return Ok(result);
                }
                Err(reason) => {
                    failures.push(ProviderFailure::new(descriptor.id.clone(), reason));
                }
            }
        }

        Err(AppError::AllProvidersExhausted(failures))
    }

    /// Предпочтительный провайдер (если доступен), затем остальные по приоритету
    fn candidates(&self, preferred_provider: Option<&str>) -> Candidates {
        let mut available: Candidates = self.registry.available().into_iter().collect();

        if let Some(preferred) = preferred_provider {
            match available.iter().position(|d| d.id == preferred) {
                Some(index) => {
                    let descriptor = available.remove(index);
                    available.insert(0, descriptor);
                }
                None => match self.registry.resolve(preferred) {
                    Ok(_) => debug!("Предпочтительный провайдер {} недоступен", preferred),
                    Err(_) => debug!("Предпочтительный провайдер {} не зарегистрирован", preferred),
                },
            }
        }

        available
    }

    async fn try_candidate(
        &self,
        descriptor: &ProviderDescriptor,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> std::result::Result<TranslationResult, FailureReason> {
        if !descriptor.provider.supports(source_lang, target_lang).await {
            debug!("{} не поддерживает {}-{}", descriptor.id, source_lang, target_lang);
            return Err(FailureReason::UnsupportedLanguage {
                source_lang: source_lang.to_string(),
                target_lang: target_lang.to_string(),
            });
        }

        debug!("Пробуем {}: {}", descriptor.id, preview(text, 50));
        let started = Instant::now();
        let timeout_ms = descriptor.timeout.as_millis() as u64;

        let invocation = descriptor.provider.invoke(text, source_lang, target_lang);
        let error = match tokio::time::timeout(descriptor.timeout, invocation).await {
            Ok(Ok(translation)) => {
                return Ok(TranslationResult {
                    text: translation,
                    provider_id: descriptor.id.clone(),
                    source_lang: source_lang.to_string(),
                    target_lang: target_lang.to_string(),
                    latency_ms: started.elapsed().as_millis() as u64,
                    definition: None,
                    failures: Vec::new(),
                })
            }
            Ok(Err(AppError::CommandTimeout { .. })) | Err(_) => AppError::ProviderTimeout {
                provider: descriptor.id.clone(),
                timeout_ms,
            },
            Ok(Err(e)) => AppError::ProviderInvocationFailed {
                provider: descriptor.id.clone(),
                reason: e.to_string(),
            },
        };

        warn!("{}", error);
        Err(FailureReason::from(&error))
    }
}
