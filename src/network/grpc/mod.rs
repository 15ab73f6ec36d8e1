mod grpc_metadata_service;
mod grpc_transport;
pub use grpc_metadata_service::*;
pub use grpc_transport::*;

#[cfg(test)]
mod grpc_metadata_service_test;
