use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
mod config;
mod context;
mod error;
mod events;
mod services;
mod utils;

use config::{Config, KNOWN_PROVIDERS};
use context::AppContext;
use services::{
    create_desktop, create_selection_source, ConsoleSink, DictionaryLookup, Mailbox, Orchestrator,
    ProviderRegistry, SelectionWatcher, TranslationDispatcher, UiContext,
};
use utils::dependencies::{check_dependencies, SystemToolProbe};
use utils::logging::{init_tracing, LogTargets};

#[derive(Parser, Debug)]
#[command(name = "select-translate")]
#[command(about = "Перевод выделенного текста со всплывающим окном у курсора")]
struct Args {
    /// Путь к файлу конфигурации (по умолчанию из каталога пользователя или текущего)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (без внешних утилит и сети)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Файл логов (по умолчанию в каталоге конфигурации пользователя)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Не выводить логи в консоль
    #[arg(long)]
    no_console: bool,

    /// Предпочтительный провайдер перевода
    #[arg(short, long)]
    provider: Option<String>,

    /// Только проверить внешние зависимости и выйти
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let config = Config::load(&config_path)?;

    // Инициализация системы логирования
    let directives = match &args.log_level {
        Some(level) => level.clone(),
        None => format!("{},{}", config.logging.level, config.logging.filter),
    };
    let log_file = init_tracing(&LogTargets {
        directives,
        format: config.logging.format.clone(),
        console: config.logging.console && !args.no_console,
        file: args.log_file.clone().or_else(|| config.log_file()),
    })?;

    info!("Запуск select-translate v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {:?}", config_path);
    if let Some(path) = &log_file {
        info!("Логи пишутся в файл: {:?}", path);
    }

    // Проверка внешних утилит
    let probe = SystemToolProbe;
    let report = check_dependencies(&config, &probe);
    if args.check {
        if report.is_complete() {
            println!("Все внешние утилиты найдены");
        } else {
            for (tool, purpose) in &report.missing {
                println!("Не найдено: {} ({})", tool, purpose);
            }
        }

        let ctx = AppContext::new(config, args.dry_run);
        println!("Провайдеры перевода:");
        for line in ProviderRegistry::from_context(&ctx)?.overview() {
            println!("  {}", line);
        }
        return Ok(());
    }

    if args.dry_run {
        warn!("Режим сухого запуска - внешние утилиты и сеть не используются");
    }

    if let Some(provider) = &args.provider {
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            warn!(
                "Неизвестный провайдер '{}' будет проигнорирован (известные: {})",
                provider,
                KNOWN_PROVIDERS.join(", ")
            );
        }
    }

    let ctx = AppContext::new(config, args.dry_run);

    // Инициализация компонентов
    let registry = Arc::new(ProviderRegistry::from_context(&ctx)?);
    let dispatcher = Arc::new(TranslationDispatcher::new(registry));
    let dictionary = create_dictionary(&ctx, &probe);
    let (cursor, geometry) = create_desktop(&ctx);
    let mailbox = Arc::new(Mailbox::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let watcher = SelectionWatcher::new(
        &ctx,
        create_selection_source(&ctx),
        cursor,
        mailbox.clone(),
        shutdown_rx,
    );
    let (ui, ui_handle) = UiContext::new(Box::new(ConsoleSink::default()));
    let orchestrator = Arc::new(
        Orchestrator::new(&ctx, dispatcher, dictionary, geometry, mailbox, ui_handle)?
            .with_preferred_provider(args.provider.clone()),
    );

    info!("Все компоненты инициализированы");

    // Запуск всех сервисов параллельно
    let ui_task = tokio::spawn(ui.run());
    let orchestrator_task = tokio::spawn(orchestrator.clone().run());
    let watcher_task = tokio::spawn(watcher.run());

    info!("Все сервисы запущены");

    // Ожидание сигнала завершения
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");

    // Сначала останавливаем опрос, затем оркестратор
    if shutdown_tx.send(true).is_err() {
        warn!("SelectionWatcher уже остановлен");
    }
    orchestrator.shutdown();

    // Ожидаем завершения задач (с таймаутом)
    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = watcher_task.await;
        let _ = orchestrator_task.await;
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    ui_task.abort();

    info!("select-translate завершил работу");
    Ok(())
}

/// Словарь нужен только если он включён, есть `dict` и это не сухой запуск
fn create_dictionary(ctx: &AppContext, probe: &SystemToolProbe) -> Option<DictionaryLookup> {
    let dictionary = DictionaryLookup::new(ctx.config.dictionary.clone());

    if !dictionary.is_enabled() {
        info!("Словарные определения отключены");
        return None;
    }
    if ctx.dry_run {
        info!("Словарные определения отключены в режиме сухого запуска");
        return None;
    }
    if !dictionary.is_available(probe) {
        warn!("'{}' не найден, словарные определения отключены", ctx.config.dictionary.command);
        return None;
    }

    Some(dictionary)
}
