pub mod create_shipment_command;
pub mod transition_shipment_status_command;
