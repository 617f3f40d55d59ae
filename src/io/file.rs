use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::{Order, StaffMember};
use crate::Result;

/// Everything the host keeps between sessions: open orders and the roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub roster: Vec<StaffMember>,
}

/// Save a snapshot as pretty-printed JSON.
pub fn save_snapshot(snapshot: &ShopSnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), orders = snapshot.orders.len(), "snapshot saved");
    Ok(())
}

/// Load a snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<ShopSnapshot> {
    let json = std::fs::read_to_string(path)?;
    let snapshot: ShopSnapshot = serde_json::from_str(&json)?;
    info!(
        path = %path.display(),
        orders = snapshot.orders.len(),
        staff = snapshot.roster.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, OrderStatus};
    use crate::Error;
    use chrono::NaiveDate;

    #[test]
    fn snapshot_survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        let staff = StaffMember::new("Mara");
        let snapshot = ShopSnapshot {
            orders: vec![Order::new("ORD-7", "Ada")
                .with_status(OrderStatus::Fitting)
                .due(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap())
                .with_item(LineItem::new("Take in waist").with_estimate(45).assigned_to(staff.id))],
            roster: vec![staff],
        };
        save_snapshot(&snapshot, &path).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), snapshot);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "roster": [] }"#).unwrap();
        assert!(load_snapshot(&path).unwrap().orders.is_empty());
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(Error::Json(_))));
        assert!(matches!(
            load_snapshot(&dir.path().join("absent.json")),
            Err(Error::Io(_))
        ));
    }
}
