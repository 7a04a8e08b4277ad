pub mod cpu;
pub mod disk;
pub mod event;
pub mod interface;
pub mod inventory;
pub mod memory;
pub mod metric;
pub mod ncpa_connection;
pub mod plugin_result;
pub mod process;
pub mod service_state;
pub mod system;
pub mod unit_value;
