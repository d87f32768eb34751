//! EffectTuning: физические константы эффектов
//!
//! Все значения в метрах / секундах / м/с.
//! Default = боевой баланс; тесты и редактор переопределяют через RON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{read_ron_file, require_non_negative, require_positive, ConfigError};

/// Magic Missile: Rising → Seeking → Falling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileTuning {
    /// Гравитация в Rising/Falling (м/с², вниз)
    pub gravity: f32,
    /// Доля гравитации во время Seeking
    pub seek_gravity_scale: f32,
    /// Ниже этой высоты ракета не переходит в Seeking
    pub min_seek_height: f32,
    /// Радиус поиска цели
    pub seek_range: f32,
    /// Скорость поворота (доля blend'а направления в секунду)
    pub turn_rate: f32,
    /// Разгон в Seeking (м/с²)
    pub acceleration: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Радиус попадания (distance ≤ hit_radius → урон)
    pub hit_radius: f32,
    /// Falloff: damage × (1 − (d / r) × falloff)
    pub falloff: f32,
    /// Минимальный множитель урона после falloff
    pub min_damage_multiplier: f32,
    /// Высота удержания, пока цели нет
    pub cruise_height: f32,
    /// Сила height-hold коррекции (1/с)
    pub height_hold_gain: f32,
    /// Сколько секунд без цели до перехода в Falling
    pub lost_target_grace: f32,
    /// Упреждение: target.position + target.velocity × lead
    pub prediction_lead: f32,
    /// Полное время жизни ракеты
    pub lifetime: f32,
    /// Уровень земли (ниже: ракета удаляется без урона)
    pub ground_height: f32,
    /// Стартовая горизонтальная скорость
    pub launch_horizontal_speed: f32,
    /// Стартовая вертикальная скорость
    pub launch_vertical_speed: f32,
    /// Веер запуска (градусы, полная ширина)
    pub spread_degrees: f32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            seek_gravity_scale: 0.3,
            min_seek_height: 2.5,
            seek_range: 30.0,
            turn_rate: 4.0,
            acceleration: 12.0,
            min_speed: 6.0,
            max_speed: 18.0,
            hit_radius: 1.0,
            falloff: 0.5,
            min_damage_multiplier: 0.5,
            cruise_height: 3.0,
            height_hold_gain: 4.0,
            lost_target_grace: 1.5,
            prediction_lead: 0.25,
            lifetime: 6.0,
            ground_height: 0.0,
            launch_horizontal_speed: 4.0,
            launch_vertical_speed: 9.0,
            spread_degrees: 70.0,
        }
    }
}

/// Boomerang: Outward → Return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoomerangTuning {
    pub speed: f32,
    /// Боковое ускорение (знак = curve_sign)
    pub curve_acceleration: f32,
    pub seek_range: f32,
    pub seek_turn_rate: f32,
    /// Дальше этой дистанции от точки спавна → Return
    pub max_distance: f32,
    /// Ближе этой дистанции к кастеру (XZ) → удаление
    pub return_radius: f32,
    pub return_turn_rate: f32,
    pub hit_radius: f32,
    pub falloff: f32,
    pub min_damage_multiplier: f32,
    /// Скорость выравнивания высоты к кастеру (1/с)
    pub height_ease_rate: f32,
    /// Отступ точки спавна от кастера по направлению броска
    pub spawn_offset: f32,
    pub lifetime: f32,
}

impl Default for BoomerangTuning {
    fn default() -> Self {
        Self {
            speed: 15.0,
            curve_acceleration: 6.0,
            seek_range: 12.0,
            seek_turn_rate: 2.5,
            max_distance: 15.0,
            return_radius: 1.5,
            return_turn_rate: 3.0,
            hit_radius: 1.2,
            falloff: 0.3,
            min_damage_multiplier: 0.6,
            height_ease_rate: 3.0,
            spawn_offset: 0.5,
            lifetime: 8.0,
        }
    }
}

/// Nova: расширяющееся кольцо
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaTuning {
    /// Доля duration, за которую радиус растёт от 0 до максимума (урон только здесь)
    pub expansion_fraction: f32,
    /// Эффект живёт до fade_fraction × duration (визуальный fade-out)
    pub fade_fraction: f32,
}

impl Default for NovaTuning {
    fn default() -> Self {
        Self {
            expansion_fraction: 0.8,
            fade_fraction: 1.5,
        }
    }
}

/// Chain Lightning: последовательные хопы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainTuning {
    /// Радиус поиска первой цели от кастера
    pub cast_range: f32,
    /// Радиус поиска следующей цели от предыдущего хопа
    pub chain_range: f32,
    /// Пауза между хопами (секунды)
    pub chain_delay: f32,
    /// Множитель урона на каждый хоп
    pub decay: f32,
}

impl Default for ChainTuning {
    fn default() -> Self {
        Self {
            cast_range: 15.0,
            chain_range: 8.0,
            chain_delay: 0.15,
            decay: 0.75,
        }
    }
}

/// Lightning Storm: периодические удары по случайной цели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StormTuning {
    pub strike_interval: f32,
    /// Количество ambient flicker'ов (косметика, без урона)
    pub ambient_count: usize,
    pub ambient_interval: f32,
    /// Высота, с которой бьют молнии (визуал)
    pub cloud_height: f32,
}

impl Default for StormTuning {
    fn default() -> Self {
        Self {
            strike_interval: 0.4,
            ambient_count: 4,
            ambient_interval: 0.12,
            cloud_height: 12.0,
        }
    }
}

/// Все константы симуляции эффектов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    pub missile: MissileTuning,
    pub boomerang: BoomerangTuning,
    pub nova: NovaTuning,
    pub chain: ChainTuning,
    pub storm: StormTuning,
    /// Время жизни косметической молнии (Lightning)
    pub lightning_flash_duration: f32,
    /// Ёмкость TrailBuffer (позиций на эффект)
    pub trail_capacity: usize,
    /// Лимит активных эффектов (None = без лимита, старейшие вытесняются)
    pub max_active_effects: Option<usize>,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            missile: MissileTuning::default(),
            boomerang: BoomerangTuning::default(),
            nova: NovaTuning::default(),
            chain: ChainTuning::default(),
            storm: StormTuning::default(),
            lightning_flash_duration: 0.15,
            trail_capacity: 16,
            max_active_effects: Some(1024),
        }
    }
}

impl EffectTuning {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Self = ron::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = read_ron_file(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load из файла, при любой ошибке: defaults (ошибка логируется)
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from_path(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                crate::logger::log_warning(&format!(
                    "EffectTuning: {} ({:?}), using defaults",
                    e,
                    path.as_ref()
                ));
                Self::default()
            }
        }
    }

    /// Tuning, собранный в коде: при невалидных значениях: defaults (ошибка логируется)
    pub fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                crate::logger::log_warning(&format!("EffectTuning: {}, using defaults", e));
                Self::default()
            }
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.missile;
        require_non_negative("missile.gravity", m.gravity)?;
        require_non_negative("missile.seek_gravity_scale", m.seek_gravity_scale)?;
        require_positive("missile.turn_rate", m.turn_rate)?;
        require_positive("missile.min_speed", m.min_speed)?;
        require_positive("missile.max_speed", m.max_speed)?;
        if m.min_speed > m.max_speed {
            return Err(ConfigError::Invalid {
                field: "missile.min_speed",
                reason: format!("min_speed {} > max_speed {}", m.min_speed, m.max_speed),
            });
        }
        require_non_negative("missile.hit_radius", m.hit_radius)?;
        require_non_negative("missile.min_damage_multiplier", m.min_damage_multiplier)?;
        require_positive("missile.lifetime", m.lifetime)?;

        let b = &self.boomerang;
        require_positive("boomerang.speed", b.speed)?;
        require_positive("boomerang.max_distance", b.max_distance)?;
        require_positive("boomerang.return_radius", b.return_radius)?;
        require_positive("boomerang.return_turn_rate", b.return_turn_rate)?;
        require_positive("boomerang.lifetime", b.lifetime)?;

        let n = &self.nova;
        require_positive("nova.expansion_fraction", n.expansion_fraction)?;
        if n.fade_fraction < n.expansion_fraction {
            return Err(ConfigError::Invalid {
                field: "nova.fade_fraction",
                reason: format!(
                    "fade_fraction {} < expansion_fraction {}",
                    n.fade_fraction, n.expansion_fraction
                ),
            });
        }

        let c = &self.chain;
        require_non_negative("chain.cast_range", c.cast_range)?;
        require_non_negative("chain.chain_range", c.chain_range)?;
        require_positive("chain.chain_delay", c.chain_delay)?;
        require_non_negative("chain.decay", c.decay)?;

        let s = &self.storm;
        require_positive("storm.strike_interval", s.strike_interval)?;
        require_positive("storm.ambient_interval", s.ambient_interval)?;

        require_positive("lightning_flash_duration", self.lightning_flash_duration)?;
        if self.trail_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "trail_capacity",
                reason: "expected at least 1 entry".to_string(),
            });
        }
        if self.max_active_effects == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_active_effects",
                reason: "cap of 0 would evict every cast; use None for unbounded".to_string(),
            });
        }
        Ok(())
    }
}
