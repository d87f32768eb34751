//! Tests for chain lightning hops.

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::*;
    use crate::config::{EffectTuning, LevelScaled, SkillId, SkillTable};
    use crate::targeting::Target;
    use bevy::prelude::*;
    use std::collections::BTreeSet;

    fn chain_table(chains: f32) -> SkillTable {
        let mut table = SkillTable::default();
        table.chain_lightning.chains = LevelScaled::new(chains, 0.0);
        table.chain_lightning.damage = LevelScaled::new(100.0, 0.0);
        table
    }

    fn line_of_targets(count: u64, spacing: f32) -> Vec<Target> {
        (1..=count)
            .map(|i| Target::new(i, Vec3::new(i as f32 * spacing, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn test_fizzles_without_target() {
        let mut harness = Harness::with_tables(chain_table(3.0), EffectTuning::default());
        let id = harness.cast(SkillId::ChainLightning, Vec3::Z)[0];

        harness.step();

        assert_eq!(harness.removal_reason(id), Some(RemovalReason::Fizzled));
        assert!(harness.hits.is_empty());
        assert_eq!(harness.count_kind(EffectKind::Lightning), 0);
    }

    #[test]
    fn test_hits_at_most_k_plus_one_unique_targets() {
        let mut harness = Harness::with_tables(chain_table(3.0), EffectTuning::default());
        harness.targets = line_of_targets(6, 3.0);

        let id = harness.cast(SkillId::ChainLightning, Vec3::Z)[0];
        let reason = harness.run_until_removed(id, 3.0);

        assert_eq!(reason, Some(RemovalReason::Exhausted));
        let unique: BTreeSet<_> = harness.hits.iter().map(|h| h.target).collect();
        assert_eq!(harness.hits.len(), 4);
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_damage_decays_per_hop() {
        let tuning = EffectTuning::default();
        let decay = tuning.chain.decay;
        let mut harness = Harness::with_tables(chain_table(3.0), tuning);
        harness.targets = line_of_targets(4, 3.0);

        let id = harness.cast(SkillId::ChainLightning, Vec3::Z)[0];
        harness.run_until_removed(id, 3.0);

        let amounts: Vec<f32> = harness.hits.iter().map(|h| h.amount).collect();
        assert_eq!(amounts.len(), 4);
        assert_eq!(amounts[0], 100.0);
        for pair in amounts.windows(2) {
            assert!((pair[1] - pair[0] * decay).abs() < 1e-4);
        }
        // Порядок хопов: от ближайшей к кастеру по цепочке
        let order: Vec<u64> = harness.hits.iter().map(|h| h.target.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_hops_wait_for_chain_delay() {
        let tuning = EffectTuning::default();
        let delay = tuning.chain.chain_delay;
        let mut harness = Harness::with_tables(chain_table(3.0), tuning);
        harness.targets = line_of_targets(4, 3.0);

        harness.cast(SkillId::ChainLightning, Vec3::Z);
        harness.step();
        assert_eq!(harness.hits.len(), 1);

        // До истечения delay: второго хопа нет
        harness.run(((delay / DT) as usize).saturating_sub(2));
        assert_eq!(harness.hits.len(), 1);

        harness.run(4);
        assert_eq!(harness.hits.len(), 2);
    }

    #[test]
    fn test_stops_when_next_target_out_of_range() {
        let tuning = EffectTuning::default();
        let chain_range = tuning.chain.chain_range;
        let mut harness = Harness::with_tables(chain_table(5.0), tuning);
        harness.targets = vec![
            Target::new(1, Vec3::new(2.0, 0.0, 0.0)),
            Target::new(2, Vec3::new(2.0 + chain_range + 1.0, 0.0, 0.0)),
        ];

        let id = harness.cast(SkillId::ChainLightning, Vec3::Z)[0];
        let reason = harness.run_until_removed(id, 3.0);

        assert_eq!(reason, Some(RemovalReason::Exhausted));
        assert_eq!(harness.hits.len(), 1);
    }

    #[test]
    fn test_each_hop_spawns_cosmetic_bolt() {
        let mut harness = Harness::with_tables(chain_table(1.0), EffectTuning::default());
        harness.targets = line_of_targets(2, 3.0);

        let id = harness.cast(SkillId::ChainLightning, Vec3::Z)[0];
        harness.step();

        // Первый удар: молния появилась после итерации, урона от неё нет
        let spawned: Vec<EffectId> = harness.reports[0].spawned.clone();
        assert_eq!(spawned.len(), 1);
        let bolt = harness.registry.get(spawned[0]).expect("bolt in snapshot");
        let flash = bolt.lightning().expect("lightning");
        assert_eq!(flash.source, id);
        assert_eq!(flash.from, Vec3::ZERO);
        assert_eq!(flash.to, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(bolt.common.damage, 0.0);

        harness.run(30);
        assert!(harness.hits.iter().all(|h| h.kind == EffectKind::ChainLightning));
    }
}
