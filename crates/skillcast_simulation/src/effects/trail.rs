//! TrailBuffer: история позиций движущихся эффектов (для рендера)
//!
//! Чисто наблюдательный: симуляция никогда не читает trails.
//! Порядок: самая свежая позиция первой.

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use super::EffectId;

/// Ring buffer последних позиций одного эффекта
#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Новая позиция в начало; старейшая вытесняется при переполнении
    pub fn push(&mut self, position: Vec3) {
        self.points.push_front(position);
        self.points.truncate(self.capacity);
    }

    /// Позиции, самая свежая первой
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<Vec3> {
        self.points.front().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Trails всех эффектов (ключ = EffectId, удаляются вместе с эффектом)
#[derive(Debug, Clone, Default)]
pub(crate) struct TrailStore {
    trails: HashMap<EffectId, TrailBuffer>,
    capacity: usize,
}

impl TrailStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: HashMap::new(),
            capacity,
        }
    }

    pub fn record(&mut self, id: EffectId, position: Vec3) {
        let capacity = self.capacity;
        self.trails
            .entry(id)
            .or_insert_with(|| TrailBuffer::new(capacity))
            .push(position);
    }

    pub fn get(&self, id: EffectId) -> Option<&TrailBuffer> {
        self.trails.get(&id)
    }

    pub fn remove(&mut self, id: EffectId) {
        self.trails.remove(&id);
    }

    pub fn clear(&mut self) {
        self.trails.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.trails.len()
    }
}
