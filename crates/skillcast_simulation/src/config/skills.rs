//! SkillTable: параметры скиллов по уровням
//!
//! Формула для всех scaled параметров: value = base + per_level × level.
//! Cooldown хранится здесь только как данные: gating каста снаружи симуляции.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{read_ron_file, require_non_negative, require_positive, ConfigError};

/// Идентификатор скилла (ключ таблицы параметров)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillId {
    MagicMissile,
    Boomerang,
    Nova,
    ChainLightning,
    LightningStorm,
}

impl SkillId {
    pub const ALL: [SkillId; 5] = [
        SkillId::MagicMissile,
        SkillId::Boomerang,
        SkillId::Nova,
        SkillId::ChainLightning,
        SkillId::LightningStorm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillId::MagicMissile => "magic_missile",
            SkillId::Boomerang => "boomerang",
            SkillId::Nova => "nova",
            SkillId::ChainLightning => "chain_lightning",
            SkillId::LightningStorm => "lightning_storm",
        }
    }
}

/// Максимальный уровень скилла, который принимает EffectFactory
pub const MAX_SKILL_LEVEL: u32 = 100;

/// Потолок для count-параметров (ракеты, бумеранги, хопы, удары)
pub const MAX_SCALED_COUNT: u32 = 256;

/// Линейно масштабируемый по уровню параметр
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelScaled {
    pub base: f32,
    pub per_level: f32,
}

impl LevelScaled {
    pub const fn new(base: f32, per_level: f32) -> Self {
        Self { base, per_level }
    }

    pub fn at(&self, level: u32) -> f32 {
        self.base + self.per_level * level as f32
    }

    /// Целочисленное значение (floor, в [0, MAX_SCALED_COUNT])
    pub fn count_at(&self, level: u32) -> u32 {
        self.at(level).floor().max(0.0).min(MAX_SCALED_COUNT as f32) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagicMissileSkill {
    pub count: LevelScaled,
    pub damage: LevelScaled,
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoomerangSkill {
    pub count: LevelScaled,
    pub damage: LevelScaled,
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NovaSkill {
    pub damage: LevelScaled,
    pub radius: LevelScaled,
    /// Базовая длительность расширения (урон в первые expansion_fraction × duration)
    pub duration: f32,
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainLightningSkill {
    pub damage: LevelScaled,
    /// Количество хопов после первого удара
    pub chains: LevelScaled,
    pub cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningStormSkill {
    pub damage: LevelScaled,
    pub strikes: LevelScaled,
    pub radius: LevelScaled,
    pub lifetime: f32,
    pub cooldown: f32,
}

/// Таблица всех скиллов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillTable {
    pub magic_missile: MagicMissileSkill,
    pub boomerang: BoomerangSkill,
    pub nova: NovaSkill,
    pub chain_lightning: ChainLightningSkill,
    pub lightning_storm: LightningStormSkill,
}

impl Default for SkillTable {
    fn default() -> Self {
        Self {
            magic_missile: MagicMissileSkill {
                count: LevelScaled::new(5.0, 2.0),
                damage: LevelScaled::new(30.0, 5.0),
                cooldown: 2.0,
            },
            boomerang: BoomerangSkill {
                count: LevelScaled::new(1.0, 0.34),
                damage: LevelScaled::new(25.0, 5.0),
                cooldown: 3.0,
            },
            nova: NovaSkill {
                damage: LevelScaled::new(40.0, 10.0),
                radius: LevelScaled::new(5.0, 0.5),
                duration: 0.6,
                cooldown: 5.0,
            },
            chain_lightning: ChainLightningSkill {
                damage: LevelScaled::new(50.0, 8.0),
                chains: LevelScaled::new(3.0, 1.0),
                cooldown: 4.0,
            },
            lightning_storm: LightningStormSkill {
                damage: LevelScaled::new(35.0, 5.0),
                strikes: LevelScaled::new(6.0, 2.0),
                radius: LevelScaled::new(8.0, 1.0),
                lifetime: 6.0,
                cooldown: 12.0,
            },
        }
    }
}

impl SkillTable {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let table: Self = ron::from_str(source)?;
        table.validate()?;
        Ok(table)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = read_ron_file(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    pub fn validated_or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                crate::logger::log_warning(&format!("SkillTable: {}, using defaults", e));
                Self::default()
            }
        }
    }

    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Cooldown скилла (для внешнего gating)
    pub fn cooldown(&self, skill: SkillId) -> f32 {
        match skill {
            SkillId::MagicMissile => self.magic_missile.cooldown,
            SkillId::Boomerang => self.boomerang.cooldown,
            SkillId::Nova => self.nova.cooldown,
            SkillId::ChainLightning => self.chain_lightning.cooldown,
            SkillId::LightningStorm => self.lightning_storm.cooldown,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for skill in SkillId::ALL {
            require_non_negative("cooldown", self.cooldown(skill))?;
        }
        require_positive("nova.duration", self.nova.duration)?;
        require_positive("lightning_storm.lifetime", self.lightning_storm.lifetime)?;
        // Урон на уровне 1 не может быть отрицательным
        for (field, scaled) in [
            ("magic_missile.damage", self.magic_missile.damage),
            ("boomerang.damage", self.boomerang.damage),
            ("nova.damage", self.nova.damage),
            ("nova.radius", self.nova.radius),
            ("chain_lightning.damage", self.chain_lightning.damage),
            ("lightning_storm.damage", self.lightning_storm.damage),
            ("lightning_storm.radius", self.lightning_storm.radius),
        ] {
            require_non_negative(field, scaled.at(1))?;
        }
        Ok(())
    }
}
