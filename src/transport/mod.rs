pub mod ble;
pub mod discovery;
pub mod link;
