// Domain layer: audit event model, notification result and the store ports.

pub mod model;
pub mod ports;
