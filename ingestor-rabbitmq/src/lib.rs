//! RabbitMQ broker adapter: the confirm-mode publisher state machine and the
//! manual-ack consumer loop described by the pipeline's broker contract.

pub mod consumer;
pub mod publisher;

pub use consumer::{Consumer, ConsumerConfig};
pub use publisher::{BrokerPublisher, PublisherConfig, PublisherState};
