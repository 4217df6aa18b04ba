#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod aead;
pub mod context;
pub mod error;
pub mod kdf;
pub mod kem;
pub mod suite;
