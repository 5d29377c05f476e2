//! The trace driver. It batches rays from the sources through the
//! per-ray kernel, compacts the sparse event slots into dense arrays
//! and transposes them into the column layout callers consume.

pub mod collision;
pub mod cpu;
pub mod kernel;

pub use cpu::CpuTracer;

// others
use thiserror::Error;
// rayx
use crate::behaviours::BraggFailurePolicy;
use crate::core::rayx::Float;
use crate::ray::{EventType, Ray};
use num::complex::Complex64;

// if no batch size is configured, this is the batch size
pub const DEFAULT_BATCH_SIZE: u32 = 100_000;
pub const DEFAULT_MAX_EVENTS: u32 = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sequential {
    /// ray i visits element k+1 only directly after element k
    Yes,
    /// any element may be hit next, chosen by geometry
    No,
}

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("invalid trace configuration: {0}")]
    Config(String),
    #[error("tracing backend unavailable: {0}")]
    Device(String),
}

/// Bitset choosing which ray attributes are materialised in the
/// output columns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RayAttrFlag(pub u32);

impl RayAttrFlag {
    pub const PATH_ID: RayAttrFlag = RayAttrFlag(1 << 0);
    pub const PATH_EVENT_ID: RayAttrFlag = RayAttrFlag(1 << 1);
    pub const EVENT_TYPE: RayAttrFlag = RayAttrFlag(1 << 2);
    pub const OBJECT_ID: RayAttrFlag = RayAttrFlag(1 << 3);
    pub const SOURCE_ID: RayAttrFlag = RayAttrFlag(1 << 4);
    pub const ORDER: RayAttrFlag = RayAttrFlag(1 << 5);
    pub const POSITION: RayAttrFlag = RayAttrFlag(1 << 6);
    pub const DIRECTION: RayAttrFlag = RayAttrFlag(1 << 7);
    pub const ENERGY: RayAttrFlag = RayAttrFlag(1 << 8);
    pub const OPTICAL_PATH_LENGTH: RayAttrFlag = RayAttrFlag(1 << 9);
    pub const ELECTRIC_FIELD: RayAttrFlag = RayAttrFlag(1 << 10);

    pub const ALL: RayAttrFlag = RayAttrFlag((1 << 11) - 1);
    pub const NONE: RayAttrFlag = RayAttrFlag(0);

    pub fn contains(&self, other: RayAttrFlag) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for RayAttrFlag {
    type Output = RayAttrFlag;
    fn bitor(self, rhs: RayAttrFlag) -> RayAttrFlag {
        RayAttrFlag(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    pub sequential: Sequential,
    /// hard per-path cap on recorded events
    pub max_events_per_path: u32,
    /// hard cap on rays per kernel dispatch
    pub max_batch_size: u32,
    /// drives all per-path random numbers
    pub seed: u64,
    /// which objects (sources and elements, in that order) may record
    /// events; `None` records everything
    pub record_mask_objects: Option<Vec<bool>>,
    /// which attributes are materialised in the output
    pub record_mask_attrs: RayAttrFlag,
    /// what happens to rays a crystal cannot diffract
    pub bragg_failure: BraggFailurePolicy,
}

impl Default for TraceConfig {
    fn default() -> Self {
        TraceConfig {
            sequential: Sequential::No,
            max_events_per_path: DEFAULT_MAX_EVENTS,
            max_batch_size: DEFAULT_BATCH_SIZE,
            seed: 42,
            record_mask_objects: None,
            record_mask_attrs: RayAttrFlag::ALL,
            bragg_failure: BraggFailurePolicy::Absorb,
        }
    }
}

/// The recorded events as a structure of arrays. Columns that were not
/// requested stay empty; all requested columns share the same length.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaySoA {
    pub path_id: Vec<i32>,
    pub path_event_id: Vec<i32>,
    pub event_type: Vec<EventType>,
    pub object_id: Vec<i32>,
    pub source_id: Vec<i32>,
    pub order: Vec<i32>,
    pub position_x: Vec<Float>,
    pub position_y: Vec<Float>,
    pub position_z: Vec<Float>,
    pub direction_x: Vec<Float>,
    pub direction_y: Vec<Float>,
    pub direction_z: Vec<Float>,
    pub energy: Vec<Float>,
    pub optical_path_length: Vec<Float>,
    pub field_x: Vec<Complex64>,
    pub field_y: Vec<Complex64>,
    pub field_z: Vec<Complex64>,

    /// number of ray paths with at least one recorded event
    pub num_paths: usize,
    /// total number of recorded events
    pub num_events: usize,
    /// at least one path ran out of event storage
    pub too_many_events: bool,
}

impl RaySoA {
    /// append one compacted event under the given attribute mask
    pub(crate) fn push(&mut self, ray: &Ray, attr: RayAttrFlag) {
        if attr.contains(RayAttrFlag::PATH_ID) {
            self.path_id.push(ray.path_id);
        }
        if attr.contains(RayAttrFlag::PATH_EVENT_ID) {
            self.path_event_id.push(ray.path_event_id);
        }
        if attr.contains(RayAttrFlag::EVENT_TYPE) {
            self.event_type.push(ray.event_type);
        }
        if attr.contains(RayAttrFlag::OBJECT_ID) {
            self.object_id.push(ray.object_id);
        }
        if attr.contains(RayAttrFlag::SOURCE_ID) {
            self.source_id.push(ray.source_id);
        }
        if attr.contains(RayAttrFlag::ORDER) {
            self.order.push(ray.order);
        }
        if attr.contains(RayAttrFlag::POSITION) {
            self.position_x.push(ray.position.x);
            self.position_y.push(ray.position.y);
            self.position_z.push(ray.position.z);
        }
        if attr.contains(RayAttrFlag::DIRECTION) {
            self.direction_x.push(ray.direction.x);
            self.direction_y.push(ray.direction.y);
            self.direction_z.push(ray.direction.z);
        }
        if attr.contains(RayAttrFlag::ENERGY) {
            self.energy.push(ray.energy);
        }
        if attr.contains(RayAttrFlag::OPTICAL_PATH_LENGTH) {
            self.optical_path_length.push(ray.optical_path_length);
        }
        if attr.contains(RayAttrFlag::ELECTRIC_FIELD) {
            self.field_x.push(ray.field.x);
            self.field_y.push(ray.field.y);
            self.field_z.push(ray.field.z);
        }
    }
}

/// Contains all the events of a single ray path in chronological order.
pub type RayHistory = Vec<Ray>;

/// hist[i][j] is the j'th event of the i'th path that recorded events.
pub type BundleHistory = Vec<RayHistory>;

/// An execution backend. The geometry and physics code is backend
/// independent; a backend only decides where the per-path kernel runs
/// and owns the buffers it needs.
pub trait DeviceTracer {
    fn trace(
        &mut self,
        beamline: &crate::beamline::Beamline,
        config: &TraceConfig,
    ) -> Result<RaySoA, TraceError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Cpu,
    Gpu,
}

/// Front door over the available backends.
pub struct Tracer {
    device: Box<dyn DeviceTracer>,
}

impl Tracer {
    pub fn new(platform: Platform) -> Result<Self, TraceError> {
        match platform {
            Platform::Cpu => Ok(Tracer {
                device: Box::new(CpuTracer::new()?),
            }),
            Platform::Gpu => Err(TraceError::Device(
                "gpu tracing was not enabled during build".to_string(),
            )),
        }
    }

    pub fn trace(
        &mut self,
        beamline: &crate::beamline::Beamline,
        config: &TraceConfig,
    ) -> Result<RaySoA, TraceError> {
        self.device.trace(beamline, config)
    }
}
