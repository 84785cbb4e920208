// Orders captured in transit and run accounting

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Water,
    Snack,
}

/// A request taken from a person along the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Cumulative path position at capture time, centimetres into the pass.
    pub path_position: u32,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("order ledger is full")]
pub struct LedgerFull;

/// Bounded store of captured, not-yet-delivered orders. Capture order is
/// delivery order.
#[derive(Debug)]
pub struct OrderLedger {
    orders: Vec<Order>,
    capacity: usize,
}

impl OrderLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            orders: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Records an order, rejecting it once the ledger holds `capacity` entries.
    pub fn capture(&mut self, path_position: u32, kind: ItemKind) -> Result<(), LedgerFull> {
        if self.is_full() {
            return Err(LedgerFull);
        }
        self.orders.push(Order {
            path_position,
            kind,
        });
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.orders.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Orders in capture order. Restartable: each call yields a fresh walk.
    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }

    pub fn water_count(&self) -> u32 {
        self.count(ItemKind::Water)
    }

    pub fn snack_count(&self) -> u32 {
        self.count(ItemKind::Snack)
    }

    fn count(&self, kind: ItemKind) -> u32 {
        self.orders.iter().filter(|o| o.kind == kind).count() as u32
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

/// Items actually handed out, accumulated across every pass of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub snacks: u32,
    pub waters: u32,
}

impl RunTotals {
    pub fn record(&mut self, snacks: u32, waters: u32) {
        self.snacks += snacks;
        self.waters += waters;
    }

    pub fn fold(&mut self, other: RunTotals) {
        self.snacks += other.snacks;
        self.waters += other.waters;
    }
}
