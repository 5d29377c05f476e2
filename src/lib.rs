//! Ray tracing for synchrotron beamlines. A beamline is described as
//! light sources followed by optical elements (mirrors, gratings,
//! slits, zone plates, crystals, foils); the tracer propagates
//! individual photons through the chain and returns the chronological
//! event trace of every ray path.

#[macro_use]
extern crate impl_ops;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde;

pub mod beamline;
pub mod behaviours;
pub mod core;
pub mod elements;
pub mod ray;
pub mod sources;
pub mod surfaces;
pub mod tracer;
