//! ShipStream shipment store.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRow {
    #[serde(rename = "ShipmentID")]
    pub shipment_id: u32,
    #[serde(rename = "OrderID")]
    pub order_id: u32,
    #[serde(rename = "TrackingNumber")]
    pub tracking_number: &'static str,
    #[serde(rename = "EstimatedArrival")]
    pub estimated_arrival: &'static str,
    #[serde(rename = "Status")]
    pub status: &'static str,
}

/// In-memory ShipStream dataset, one shipment per seeded order.
pub struct ShippingStore {
    shipments: Vec<ShipmentRow>,
}

impl ShippingStore {
    /// Shipment statuses mirror the order statuses; processing orders are
    /// still in the Preparing stage.
    pub fn seeded() -> Self {
        let shipments = vec![
            ShipmentRow { shipment_id: 1, order_id: 1, tracking_number: "TRK001", estimated_arrival: "2025-08-16", status: "Delivered" },
            ShipmentRow { shipment_id: 2, order_id: 2, tracking_number: "TRK002", estimated_arrival: "2025-08-13", status: "Delivered" },
            ShipmentRow { shipment_id: 3, order_id: 3, tracking_number: "TRK003", estimated_arrival: "2025-08-21", status: "In Transit" },
            ShipmentRow { shipment_id: 4, order_id: 4, tracking_number: "TRK004", estimated_arrival: "2025-08-10", status: "Returned" },
            ShipmentRow { shipment_id: 5, order_id: 5, tracking_number: "TRK005", estimated_arrival: "2025-08-24", status: "Preparing" },
            ShipmentRow { shipment_id: 6, order_id: 6, tracking_number: "TRK006", estimated_arrival: "2025-08-22", status: "In Transit" },
            ShipmentRow { shipment_id: 7, order_id: 7, tracking_number: "TRK007", estimated_arrival: "2025-08-25", status: "Preparing" },
        ];
        Self { shipments }
    }

    pub fn shipment_for_order(&self, order_id: u32) -> Option<&ShipmentRow> {
        self.shipments.iter().find(|s| s.order_id == order_id)
    }

    pub fn shipment_by_tracking(&self, tracking: &str) -> Option<&ShipmentRow> {
        self.shipments
            .iter()
            .find(|s| s.tracking_number.eq_ignore_ascii_case(tracking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_one_is_delivered_under_trk001() {
        let store = ShippingStore::seeded();
        let shipment = store.shipment_for_order(1).unwrap();
        assert_eq!(shipment.tracking_number, "TRK001");
        assert_eq!(shipment.status, "Delivered");
    }

    #[test]
    fn test_tracking_lookup() {
        let store = ShippingStore::seeded();
        assert_eq!(store.shipment_by_tracking("trk003").unwrap().order_id, 3);
        assert!(store.shipment_by_tracking("TRK999").is_none());
    }
}
