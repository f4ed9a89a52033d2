use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::services::providers::{create_provider, TranslationProvider};
use crate::utils::dependencies::{SystemToolProbe, ToolProbe};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Описание зарегистрированного провайдера. Не меняется после регистрации.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub id: String,
    pub priority: u32,
    pub requires: BTreeSet<String>,
    pub timeout: Duration,
    pub provider: Arc<dyn TranslationProvider>,
}

impl ProviderDescriptor {
    pub fn new(provider: Arc<dyn TranslationProvider>, priority: u32, timeout: Duration) -> Self {
        Self {
            id: provider.id().to_string(),
            priority,
            requires: provider.required_tools().into_iter().collect(),
            timeout,
            provider,
        }
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("requires", &self.requires)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Упорядоченный набор провайдеров перевода.
///
/// Доступность провайдера определяется только наличием его внешних утилит;
/// сетевые провайдеры ничего не требуют и считаются доступными всегда.
pub struct ProviderRegistry {
    providers: RwLock<Vec<Arc<ProviderDescriptor>>>,
    probe: Arc<dyn ToolProbe>,
}

impl ProviderRegistry {
    pub fn new(probe: Arc<dyn ToolProbe>) -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
            probe,
        }
    }

    /// Построить реестр по `translation.provider_priority`: приоритет = позиция в списке
    pub fn from_context(ctx: &AppContext) -> Result<Self> {
        let probe: Arc<dyn ToolProbe> = Arc::new(SystemToolProbe);
        let registry = Self::new(probe);

        for (priority, id) in ctx.config.translation.provider_priority.iter().enumerate() {
            let provider = create_provider(id, ctx)?;
            let timeout = ctx.config.provider_timeout(id);
            registry.register(ProviderDescriptor::new(provider, priority as u32, timeout))?;
        }

        info!(
            "Зарегистрировано {} провайдеров перевода: {:?}",
            registry.len(),
            registry.ids()
        );
        Ok(registry)
    }

    pub fn register(&self, descriptor: ProviderDescriptor) -> Result<()> {
        let mut providers = self.providers.write();
        if providers.iter().any(|d| d.id == descriptor.id) {
            return AppError::invalid_input(format!(
                "провайдер '{}' уже зарегистрирован",
                descriptor.id
            ));
        }

        debug!(
            "Регистрация провайдера {} - {} (приоритет {}, утилиты {:?}, сеть: {})",
            descriptor.id,
            descriptor.provider.description(),
            descriptor.priority,
            descriptor.requires,
            descriptor.provider.requires_internet()
        );
        providers.push(Arc::new(descriptor));
        // Стабильная сортировка сохраняет порядок регистрации при равных приоритетах
        providers.sort_by_key(|d| d.priority);
        Ok(())
    }

    /// Провайдеры, у которых есть все нужные утилиты, по возрастанию приоритета
    pub fn available(&self) -> Vec<Arc<ProviderDescriptor>> {
        self.providers
            .read()
            .iter()
            .filter(|d| d.requires.iter().all(|tool| self.probe.is_installed(tool)))
            .cloned()
            .collect()
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<ProviderDescriptor>> {
        self.providers
            .read()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| AppError::UnknownProvider(id.to_string()))
    }

    /// Строки вида `id - описание [доступен]` в порядке приоритета
    pub fn overview(&self) -> Vec<String> {
        self.providers
            .read()
            .iter()
            .map(|d| {
                let available = d.requires.iter().all(|tool| self.probe.is_installed(tool));
                format!(
                    "{} - {} [{}]",
                    d.id,
                    d.provider.description(),
                    if available { "доступен" } else { "недоступен" }
                )
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.providers.read().iter().map(|d| d.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    pub struct FakeProbe(pub HashSet<String>);

    impl FakeProbe {
        pub fn with(tools: &[&str]) -> Arc<Self> {
            Arc::new(Self(tools.iter().map(|t| t.to_string()).collect()))
        }
    }

    impl ToolProbe for FakeProbe {
        fn is_installed(&self, tool: &str) -> bool {
            self.0.contains(tool)
        }
    }

    struct StubProvider {
        id: &'static str,
        tools: Vec<String>,
    }

    #[async_trait::async_trait]
    impl TranslationProvider for StubProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn required_tools(&self) -> Vec<String> {
            self.tools.clone()
        }

        async fn supports(&self, _: &str, _: &str) -> bool {
            true
        }

        async fn invoke(&self, text: &str, _: &str, _: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    fn descriptor(id: &'static str, priority: u32, tools: &[&str]) -> ProviderDescriptor {
        ProviderDescriptor::new(
            Arc::new(StubProvider {
                id,
                tools: tools.iter().map(|t| t.to_string()).collect(),
            }),
            priority,
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_available_ordered_by_priority() {
        let registry = ProviderRegistry::new(FakeProbe::with(&["apertium"]));
        registry.register(descriptor("google", 2, &[])).unwrap();
        registry.register(descriptor("apertium", 0, &["apertium"])).unwrap();
        registry.register(descriptor("libretranslate", 1, &[])).unwrap();

        let ids: Vec<String> = registry.available().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["apertium", "libretranslate", "google"]);
    }

    #[test]
    fn test_missing_tool_hides_provider() {
        let registry = ProviderRegistry::new(FakeProbe::with(&[]));
        registry.register(descriptor("apertium", 0, &["apertium"])).unwrap();
        registry.register(descriptor("google", 1, &[])).unwrap();

        let ids: Vec<String> = registry.available().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["google"]);
        // Недоступный провайдер всё равно разрешается по id
        assert!(registry.resolve("apertium").is_ok());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = ProviderRegistry::new(FakeProbe::with(&[]));
        assert!(matches!(
            registry.resolve("deepl"),
            Err(AppError::UnknownProvider(id)) if id == "deepl"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = ProviderRegistry::new(FakeProbe::with(&[]));
        registry.register(descriptor("google", 0, &[])).unwrap();
        assert!(matches!(
            registry.register(descriptor("google", 1, &[])),
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let registry = ProviderRegistry::new(FakeProbe::with(&[]));
        registry.register(descriptor("b", 0, &[])).unwrap();
        registry.register(descriptor("a", 0, &[])).unwrap();
        assert_eq!(registry.ids(), vec!["b", "a"]);
    }

    #[test]
    fn test_overview_lists_description_and_availability() {
        let registry = ProviderRegistry::new(FakeProbe::with(&[]));
        registry.register(descriptor("google", 1, &[])).unwrap();
        registry.register(descriptor("apertium", 0, &["apertium"])).unwrap();

        assert_eq!(
            registry.overview(),
            vec!["apertium - stub [недоступен]", "google - stub [доступен]"]
        );
    }

    #[test]
    fn test_from_context_dry_run() {
        let ctx = AppContext::new(crate::config::Config::default(), true);
        let registry = ProviderRegistry::from_context(&ctx).unwrap();
        assert_eq!(registry.ids(), vec!["apertium", "google", "libretranslate"]);
        assert_eq!(registry.available().len(), 3);
    }
}
