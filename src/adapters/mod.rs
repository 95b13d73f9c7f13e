// Adapters layer: concrete bindings of the domain to external systems.

pub mod http;
