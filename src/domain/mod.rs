// Domain layer: payroll records, rounding settings and the ports the engine depends on.

pub mod model;
pub mod ports;
