//! `shmbus` — a lock-free inter-process message bus carried entirely in a
//! single shared-memory region.
//!
//! The core is [`region`] (layout + builder + attach), [`publisher`] (the
//! SWMR and MWMR publish algorithms) and [`subscriber`] (the consumer
//! cursor). [`facade`] and [`config`] are thin adapters around that core —
//! see SPEC_FULL.md §2.1 for the line between the two.

pub mod config;
pub mod error;
pub mod facade;
pub mod layout;
pub mod publisher;
pub mod region;
pub mod shm;
pub mod subscriber;

pub use error::{BusError, Result};
pub use facade::{Bus, HealthSnapshot};
pub use publisher::Publisher;
pub use region::{Region, RingType, TopicConfig};
pub use subscriber::{Received, Subscriber};
