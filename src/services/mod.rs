pub mod directory;
pub mod inventory;
pub mod shipments;
pub mod users;

pub use directory::DirectoryService;
pub use inventory::InventoryService;
pub use shipments::ShipmentService;
pub use users::UserService;
