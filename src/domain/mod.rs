// Domain layer: wire model of the chat-completion API and the client port.

pub mod model;
pub mod ports;
