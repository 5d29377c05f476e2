//! The per-ray control loop. One invocation traces one ray path to
//! termination and writes its events into the path's private slice of
//! the event buffer, so any number of paths can run concurrently
//! without coordination.

// rayx
use crate::behaviours::{behave, BehaveContext, BraggFailurePolicy};
use crate::core::rayx::{energy_to_wave_length, Float};
use crate::elements::OpticalElement;
use crate::ray::{EventType, Ray};
use crate::surfaces::Collision;
use crate::tracer::collision::{find_collision, find_collision_with};
use crate::tracer::Sequential;

/// Everything a kernel invocation reads; lives for one dispatch.
pub struct KernelArgs<'a> {
    pub elements: &'a [OpticalElement],
    pub material_indices: &'a [i32],
    pub material_table: &'a [Float],
    /// per-object recording filter over sources then elements
    pub record_mask: Option<&'a [bool]>,
    pub sequential: Sequential,
    pub num_sources: usize,
    pub bragg_failure: BraggFailurePolicy,
}

/// What one path left behind: how many slots it filled and whether it
/// ran out of space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PathResult {
    pub event_count: u32,
    pub too_many_events: bool,
}

struct Recorder<'a> {
    events: &'a mut [Ray],
    next: usize,
    finalized: bool,
    too_many: bool,
    record_mask: Option<&'a [bool]>,
}

impl<'a> Recorder<'a> {
    fn new(events: &'a mut [Ray], record_mask: Option<&'a [bool]>) -> Self {
        Recorder {
            events,
            next: 0,
            finalized: false,
            too_many: false,
            record_mask,
        }
    }

    fn object_recorded(&self, object_id: i32) -> bool {
        match self.record_mask {
            Some(mask) => mask.get(object_id as usize).copied().unwrap_or(true),
            None => true,
        }
    }

    /// Stores a snapshot of the ray. The snapshot's field is advanced
    /// by the phase of the path travelled so far; the in-flight field
    /// keeps its emission phase so later hits accumulate correctly.
    fn record(&mut self, ray: &Ray) {
        if self.finalized {
            return;
        }
        if !self.object_recorded(ray.object_id) {
            return;
        }

        if self.next >= self.events.len() {
            // out of slots: the last stored event becomes the marker
            self.too_many = true;
            self.finalized = true;
            if let Some(last) = self.events.last_mut() {
                last.event_type = EventType::TooManyEvents;
            }
            return;
        }

        let mut snapshot: Ray = *ray;
        snapshot.path_event_id = self.next as i32;
        snapshot.field = snapshot.field.advance(
            energy_to_wave_length(snapshot.energy),
            snapshot.optical_path_length,
        );
        self.events[self.next] = snapshot;
        self.next += 1;
    }
}

/// advance to the hitpoint and run the element's physics
fn process_hit(
    ray: Ray,
    element: &OpticalElement,
    element_index: usize,
    col: &Collision,
    args: &KernelArgs,
) -> Ray {
    let mut elem_ray: Ray = ray.transformed(&element.in_trans);

    elem_ray.optical_path_length += (elem_ray.position - col.hitpoint).length();
    elem_ray.position = col.hitpoint;
    elem_ray.object_id = (args.num_sources + element_index) as i32;
    elem_ray.event_type = EventType::HitElement;

    let ctx = BehaveContext {
        material_indices: args.material_indices,
        material_table: args.material_table,
        bragg_failure: args.bragg_failure,
    };
    behave(elem_ray, element, col, &ctx)
}

/// Traces one ray to termination. `events` is this path's exclusive
/// slice of the event buffer, `max_events` slots long.
pub fn trace_path(mut ray: Ray, args: &KernelArgs, events: &mut [Ray]) -> PathResult {
    let mut recorder = Recorder::new(events, args.record_mask);

    // the emission itself is the first event of every path
    ray = check_numerics(ray);
    recorder.record(&ray);

    match args.sequential {
        Sequential::Yes => {
            for (element_index, element) in args.elements.iter().enumerate() {
                if !ray.is_active() || recorder.finalized {
                    break;
                }

                let mut rng = ray.rng;
                let found = find_collision_with(&ray, element, &mut rng);
                ray.rng = rng;
                let col = match found {
                    Some(col) => col,
                    // the chain is broken, tracing is done
                    None => break,
                };

                let elem_ray = process_hit(ray, element, element_index, &col, args);
                let elem_ray = check_numerics(elem_ray);
                recorder.record(&elem_ray);
                ray = elem_ray.transformed(&element.out_trans);
            }
        }
        Sequential::No => {
            while ray.is_active() && !recorder.finalized {
                let mut rng = ray.rng;
                let found = find_collision(&ray, args.elements, &mut rng);
                ray.rng = rng;
                let (element_index, col) = match found {
                    Some(hit) => hit,
                    // no element was hit, tracing is done
                    None => break,
                };

                let element = &args.elements[element_index];
                let elem_ray = process_hit(ray, element, element_index, &col, args);
                let elem_ray = check_numerics(elem_ray);
                recorder.record(&elem_ray);
                ray = elem_ray.transformed(&element.out_trans);
            }
        }
    }

    PathResult {
        event_count: recorder.next as u32,
        too_many_events: recorder.too_many,
    }
}

/// NaN or infinity must never reach the output buffers.
fn check_numerics(ray: Ray) -> Ray {
    if ray.is_finite() {
        ray
    } else {
        ray.terminated(EventType::FatalError)
    }
}
