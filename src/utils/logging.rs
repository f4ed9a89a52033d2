use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Ротация при превышении размера файла логов
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
const LOG_BACKUPS: usize = 5;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Куда и в каком виде писать логи
#[derive(Debug, Clone)]
pub struct LogTargets {
    pub directives: String,
    pub format: String,
    pub console: bool,
    pub file: Option<PathBuf>,
}

/// Инициализировать tracing. Возвращает файл логов, если запись в него удалось настроить.
pub fn init_tracing(targets: &LogTargets) -> Result<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&targets.directives))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if targets.console {
        layers.push(fmt_layer(&targets.format, std::io::stdout));
    }

    // Без файла продолжаем с консолью, ошибку покажем после инициализации
    let mut file_error = None;
    let mut log_file = None;
    if let Some(path) = &targets.file {
        match open_log_file(path) {
            Ok(file) => {
                layers.push(fmt_layer(&targets.format, Mutex::new(file)));
                log_file = Some(path.clone());
            }
            Err(e) => file_error = Some(e),
        }
    }

    tracing_subscriber::registry().with(layers).with(filter).init();

    if let Some(e) = file_error {
        tracing::warn!("Не удалось настроить запись логов в файл: {:#}", e);
    }

    Ok(log_file)
}

fn fmt_layer<W>(format: &str, writer: W) -> BoxedLayer
where
    W: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer().with_writer(writer);
    if format == "json" {
        layer.json().boxed()
    } else {
        layer.compact().boxed()
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Не удалось создать каталог логов {:?}", dir))?;
    }

    rotate_if_needed(path, MAX_LOG_BYTES, LOG_BACKUPS)
        .with_context(|| format!("Не удалось выполнить ротацию {:?}", path))?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Не удалось открыть файл логов {:?}", path))
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Сдвинуть `log` -> `log.1` -> ... -> `log.N`, если файл больше `max_bytes`.
/// Самая старая копия удаляется.
pub fn rotate_if_needed(path: &Path, max_bytes: u64, backups: usize) -> std::io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size < max_bytes {
        return Ok(false);
    }

    if backups == 0 {
        fs::remove_file(path)?;
        return Ok(true);
    }

    let oldest = backup_path(path, backups);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backups).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, bytes: usize) {
        fs::write(path, vec![b'x'; bytes]).unwrap();
    }

    #[test]
    fn test_small_file_is_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        write(&log, 10);

        assert!(!rotate_if_needed(&log, 100, 3).unwrap());
        assert!(log.exists());
        assert!(!backup_path(&log, 1).exists());
    }

    #[test]
    fn test_missing_file_is_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!rotate_if_needed(&dir.path().join("none.log"), 100, 3).unwrap());
    }

    #[test]
    fn test_rotation_shifts_backups_and_drops_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        write(&backup_path(&log, 1), 1);
        write(&backup_path(&log, 2), 2);
        write(&log, 200);

        assert!(rotate_if_needed(&log, 100, 2).unwrap());

        assert!(!log.exists());
        assert_eq!(fs::metadata(backup_path(&log, 1)).unwrap().len(), 200);
        assert_eq!(fs::metadata(backup_path(&log, 2)).unwrap().len(), 1);
        assert!(!backup_path(&log, 3).exists());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("nested").join("app.log");

        open_log_file(&log).unwrap();
        assert!(log.exists());
    }
}
