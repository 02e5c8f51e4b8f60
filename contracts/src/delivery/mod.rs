//! # Delivery Escrow
//!
//! One application per order holds the customer's payment until the order
//! is completed, cancelled or disputed.
//!
//! ```text
//! customer: deploy ─► (courier: pick up ─► delivered) ─► customer: complete
//!                                               └──────► courier: claim funds
//! either side: cancel        customer: start dispute
//! ```
//!
//! The program enforces who may do what and when; these clients only shape
//! the calls.

pub mod courier;
pub mod customer;
pub mod types;

pub use courier::CourierDeliveryClient;
pub use customer::{escrow_funding, CustomerDeliveryClient};
pub use types::{DeliveryAction, DeliveryOrder, Escrow, EscrowRef, ESCROW_SCHEMA};
