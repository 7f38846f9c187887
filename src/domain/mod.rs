// Domain layer: endpoint table, request/paging models, scripts and ports.

pub mod endpoint;
pub mod model;
pub mod paging;
pub mod ports;
pub mod script;
