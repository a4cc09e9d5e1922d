// Domain layer: core models and ports (interfaces). No OS bindings here.

pub mod model;
pub mod ports;
