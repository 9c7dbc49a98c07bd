/*
 * PS/2 to Apple II keyboard bridge
 *
 * Board-independent half of the firmware: compiled-in configuration and the
 * dispatch loop tying the PS/2 link, the translator and the Apple II writer
 * together. The bootable image lives in main.rs.
 */

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod config;

pub use bridge::{Bridge, PortSource};
pub use config::BridgeConfig;
