use crate::models::{shipment::ShipmentStatus, user::UserRole};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with the receiving end for [`process_events`]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends after a commit. Failures are logged and swallowed since the
    /// change they describe is already durable.
    pub async fn publish(&self, event: Event) {
        let kind = event.kind();
        if let Err(e) = self.send(event).await {
            warn!(event = kind, "Dropping domain event: {}", e);
        }
    }
}

/// Domain events emitted after a unit of work commits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ShipmentCreated {
        shipment_id: i32,
        customer_id: Option<i32>,
        total_amount: Decimal,
    },
    ShipmentStatusChanged {
        shipment_id: i32,
        old_status: ShipmentStatus,
        new_status: ShipmentStatus,
        location: Option<String>,
        timestamp: DateTime<Utc>,
    },
    InventoryStocked {
        inventory_id: i32,
        warehouse_id: i32,
        item_name: String,
        quantity: i32,
    },
    InventoryAdjusted {
        inventory_id: i32,
        warehouse_id: i32,
        item_name: String,
        old_quantity: i32,
        new_quantity: i32,
    },
    UserCreated {
        user_id: i32,
        username: String,
        role: UserRole,
    },
}

impl Event {
    /// Short name used in logs and metrics labels
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ShipmentCreated { .. } => "shipment_created",
            Event::ShipmentStatusChanged { .. } => "shipment_status_changed",
            Event::InventoryStocked { .. } => "inventory_stocked",
            Event::InventoryAdjusted { .. } => "inventory_adjusted",
            Event::UserCreated { .. } => "user_created",
        }
    }
}

/// Drains the channel until every sender is dropped
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        metrics::counter!("logistics_events.processed", 1, "kind" => event.kind());

        match event {
            Event::ShipmentCreated {
                shipment_id,
                customer_id,
                total_amount,
            } => {
                info!(shipment_id, ?customer_id, %total_amount, "Shipment created");
            }
            Event::ShipmentStatusChanged {
                shipment_id,
                old_status,
                new_status,
                location,
                timestamp,
            } => {
                info!(
                    shipment_id,
                    %old_status,
                    %new_status,
                    location = location.as_deref().unwrap_or("-"),
                    %timestamp,
                    "Shipment status changed"
                );
                if new_status == ShipmentStatus::Delayed {
                    warn!(shipment_id, "Shipment delayed");
                }
            }
            Event::InventoryStocked {
                inventory_id,
                warehouse_id,
                item_name,
                quantity,
            } => {
                info!(inventory_id, warehouse_id, %item_name, quantity, "Inventory stocked");
            }
            Event::InventoryAdjusted {
                inventory_id,
                warehouse_id,
                item_name,
                old_quantity,
                new_quantity,
            } => {
                info!(
                    inventory_id,
                    warehouse_id,
                    %item_name,
                    old_quantity,
                    new_quantity,
                    "Inventory adjusted"
                );
                if new_quantity == 0 {
                    warn!(warehouse_id, %item_name, "Item out of stock");
                }
            }
            Event::UserCreated {
                user_id,
                username,
                role,
            } => {
                info!(user_id, %username, %role, "User created");
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_on_closed_channel_does_not_fail() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        assert!(sender
            .send(Event::UserCreated {
                user_id: 1,
                username: "admin".into(),
                role: UserRole::Admin,
            })
            .await
            .is_err());
        // Swallowed
        sender
            .publish(Event::UserCreated {
                user_id: 1,
                username: "admin".into(),
                role: UserRole::Admin,
            })
            .await;
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let (sender, mut rx) = EventSender::channel(4);
        sender
            .publish(Event::ShipmentCreated {
                shipment_id: 1,
                customer_id: Some(2),
                total_amount: Decimal::new(1000, 2),
            })
            .await;
        sender
            .publish(Event::InventoryStocked {
                inventory_id: 1,
                warehouse_id: 1,
                item_name: "Widget".into(),
                quantity: 3,
            })
            .await;

        assert_eq!(rx.recv().await.unwrap().kind(), "shipment_created");
        assert_eq!(rx.recv().await.unwrap().kind(), "inventory_stocked");
    }

    #[tokio::test]
    async fn processor_stops_when_senders_drop() {
        let (sender, rx) = EventSender::channel(2);
        let handle = tokio::spawn(process_events(rx));
        sender
            .publish(Event::InventoryAdjusted {
                inventory_id: 1,
                warehouse_id: 1,
                item_name: "Widget".into(),
                old_quantity: 3,
                new_quantity: 0,
            })
            .await;
        drop(sender);
        handle.await.unwrap();
    }
}
