// Goods storage for a single settlement, and the settlement-level goods API

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use super::Disposed;
use crate::error::{Result, SettlementError};
use crate::game::Game;
use crate::types::{AbstractGoods, GoodsType, SettlementId};

/// Per-settlement warehouse: goods type -> amount, capped per type.
///
/// Works in canonical storage types only; coercion through the registry
/// happens at the settlement level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoodsStore {
    goods: BTreeMap<GoodsType, u32>,
    capacity: u32,
}

impl GoodsStore {
    pub fn new(capacity: u32) -> Self {
        Self {
            goods: BTreeMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Room left for `goods` before the cap.
    pub fn space_for(&self, goods: GoodsType) -> u32 {
        self.capacity.saturating_sub(self.count(goods))
    }

    pub fn add(&mut self, goods: GoodsType, amount: u32) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let held = self.count(goods);
        if held.saturating_add(amount) > self.capacity {
            return Err(SettlementError::CapacityExceeded {
                goods,
                requested: amount,
                held,
                capacity: self.capacity,
            });
        }
        *self.goods.entry(goods).or_insert(0) += amount;
        Ok(())
    }

    pub fn remove(&mut self, goods: GoodsType, amount: u32) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.count(goods);
        if amount > available {
            return Err(SettlementError::InsufficientGoods {
                goods,
                requested: amount,
                available,
            });
        }
        if amount == available {
            self.goods.remove(&goods);
        } else if let Some(held) = self.goods.get_mut(&goods) {
            *held -= amount;
        }
        Ok(())
    }

    /// Remove every unit of `goods`, returning how much there was.
    pub fn remove_all(&mut self, goods: GoodsType) -> u32 {
        self.goods.remove(&goods).unwrap_or(0)
    }

    pub fn count(&self, goods: GoodsType) -> u32 {
        self.goods.get(&goods).copied().unwrap_or(0)
    }

    /// One entry per present type.
    pub fn list_compact(&self) -> Vec<AbstractGoods> {
        self.iter_goods().collect()
    }

    pub fn iter_goods(&self) -> GoodsIter<'_> {
        GoodsIter {
            inner: self.goods.iter(),
        }
    }

    pub fn total(&self) -> u32 {
        self.goods.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }

    /// Empty the store, handing back its contents for the game to collect.
    pub fn dispose(self) -> Vec<Disposed> {
        self.goods
            .into_iter()
            .map(|(goods_type, amount)| Disposed::Goods(AbstractGoods::new(goods_type, amount)))
            .collect()
    }
}

/// Single pass over the present lots of a [`GoodsStore`].
#[derive(Debug)]
pub struct GoodsIter<'a> {
    inner: btree_map::Iter<'a, GoodsType, u32>,
}

impl Iterator for GoodsIter<'_> {
    type Item = AbstractGoods;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(goods_type, amount)| AbstractGoods::new(*goods_type, *amount))
    }
}

// ============================================================================
// Settlement goods API
// ============================================================================

impl Game {
    /// Add goods, coerced to their canonical storage type.
    pub fn add_goods(&mut self, id: SettlementId, goods: GoodsType, amount: u32) -> Result<()> {
        if !self.registry.is_storable(goods) {
            return Err(SettlementError::NotStorable(goods));
        }
        let canonical = self.registry.stored_as(goods);
        self.settlement_mut_internal(id)?.goods.add(canonical, amount)
    }

    pub fn remove_goods(&mut self, id: SettlementId, goods: GoodsType, amount: u32) -> Result<()> {
        let canonical = self.registry.stored_as(goods);
        self.settlement_mut_internal(id)?.goods.remove(canonical, amount)
    }

    /// Remove all goods of one type, returning how much there was.
    pub fn remove_all_goods(&mut self, id: SettlementId, goods: GoodsType) -> Result<u32> {
        let canonical = self.registry.stored_as(goods);
        Ok(self.settlement_mut_internal(id)?.goods.remove_all(canonical))
    }

    /// Amount on hand. Types warehoused under another type always read 0;
    /// ask for the canonical type instead.
    pub fn goods_count(&self, id: SettlementId, goods: GoodsType) -> Result<u32> {
        let settlement = self.settlement_or_err(id)?;
        if self.registry.is_stored_as(goods) {
            return Ok(0);
        }
        Ok(settlement.goods.count(goods))
    }

    pub fn compact_goods(&self, id: SettlementId) -> Result<Vec<AbstractGoods>> {
        Ok(self.settlement_or_err(id)?.goods.list_compact())
    }
}
