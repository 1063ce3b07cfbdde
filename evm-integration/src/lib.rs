pub mod contracts;
pub mod registry_evm;
pub mod session_connector_evm;
