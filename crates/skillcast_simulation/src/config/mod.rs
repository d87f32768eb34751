//! Конфигурация симуляции эффектов
//!
//! - tuning: физические константы по типам эффектов (EffectTuning)
//! - skills: таблицы параметров скиллов по уровням (SkillTable)
//!
//! Оба формата: RON (serde), все поля имеют defaults (#[serde(default)]),
//! поэтому файл может переопределять только нужные значения.

use std::path::PathBuf;
use thiserror::Error;

pub mod skills;
pub mod tuning;


pub use skills::*;
pub use tuning::*;

/// Ошибка загрузки/валидации конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Helper: поле должно быть > 0 и конечным
pub(crate) fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite value > 0, got {}", value),
        })
    }
}

/// Helper: поле должно быть ≥ 0 и конечным
pub(crate) fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite value >= 0, got {}", value),
        })
    }
}

/// Читает RON файл целиком
pub(crate) fn read_ron_file(path: impl Into<PathBuf>) -> Result<String, ConfigError> {
    let path = path.into();
    std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
}
