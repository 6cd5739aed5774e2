pub mod adjust_inventory_command;
pub mod stock_item_command;
