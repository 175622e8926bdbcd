//! Gift catalog for point redemption.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, LedgerError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftItem {
    pub id: String,
    pub name: String,
    /// Points needed to redeem this gift
    pub cost: i64,
}

impl GiftItem {
    pub fn new(name: impl Into<String>, cost: i64) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name").into());
        }
        if cost <= 0 {
            return Err(LedgerError::InvalidAmount { amount: cost }.into());
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            cost,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftCatalog {
    items: Vec<GiftItem>,
}

impl GiftCatalog {
    pub fn from_items(items: Vec<GiftItem>) -> Self {
        Self { items }
    }

    /// Starter catalog offered on a fresh install.
    pub fn starter() -> Self {
        let items = [
            ("Pen", 20),
            ("Chocolate", 30),
            ("Notebook", 50),
            ("Spiritual book", 100),
            ("Icon", 150),
            ("Trip", 500),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (name, cost))| GiftItem {
            id: (i + 1).to_string(),
            name: name.to_string(),
            cost,
        })
        .collect();
        Self { items }
    }

    pub fn items(&self) -> &[GiftItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&GiftItem> {
        self.items.iter().find(|g| g.id == id)
    }

    pub fn add(&mut self, name: &str, cost: i64) -> Result<&GiftItem, CoreError> {
        let item = GiftItem::new(name, cost)?;
        self.items.push(item);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Option<GiftItem> {
        let index = self.items.iter().position(|g| g.id == id)?;
        Some(self.items.remove(index))
    }

    /// Gifts the given balance can afford, cheapest first.
    pub fn affordable(&self, balance: i64) -> Vec<&GiftItem> {
        let mut items: Vec<&GiftItem> = self.items.iter().filter(|g| g.cost <= balance).collect();
        items.sort_by_key(|g| g.cost);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_free_or_negative_gifts() {
        let mut catalog = GiftCatalog::default();
        let err = catalog.add("Sticker", 0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Ledger(LedgerError::InvalidAmount { amount: 0 })
        ));
        assert!(catalog.items().is_empty());
    }

    #[test]
    fn affordable_filters_by_balance() {
        let catalog = GiftCatalog::starter();
        let names: Vec<&str> = catalog.affordable(50).iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Pen", "Chocolate", "Notebook"]);
    }

    #[test]
    fn remove_by_id() {
        let mut catalog = GiftCatalog::starter();
        assert_eq!(catalog.remove("6").map(|g| g.name), Some("Trip".to_string()));
        assert!(catalog.get("6").is_none());
    }
}
