pub mod client; // TCP request/response client
pub mod ecu;    // Response record types and decoders
pub mod frame;  // Frame reading and validation
