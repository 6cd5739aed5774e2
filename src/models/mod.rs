// Directory entities referenced by shipments
pub mod customer;
pub mod driver;
pub mod route;
pub mod vehicle;
pub mod warehouse;

// Shipment lifecycle
pub mod shipment;
pub mod shipment_status_history;
pub mod tracking;

pub mod inventory;
pub mod user;

pub use shipment::ShipmentStatus;
pub use user::UserRole;

pub type Customer = customer::Model;
pub type Driver = driver::Model;
pub type Route = route::Model;
pub type Vehicle = vehicle::Model;
pub type Warehouse = warehouse::Model;
pub type Shipment = shipment::Model;
pub type Tracking = tracking::Model;
pub type ShipmentStatusHistory = shipment_status_history::Model;
pub type Inventory = inventory::Model;
pub type User = user::Model;
