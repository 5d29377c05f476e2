//! The CPU execution backend. One rayon worker owns one ray path per
//! dispatch; all buffers are partitioned by path so the kernel runs
//! without locks. Buffers are grown to the next power of two and kept
//! across batches and across trace calls, they are never shrunk.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// others
use rayon::prelude::*;
// rayx
use crate::beamline::Beamline;
use crate::core::efield::ElectricField;
use crate::core::geometry::Vector3;
use crate::core::rng::Rng;
use crate::ray::{EventType, Ray};
use crate::tracer::kernel::{trace_path, KernelArgs, PathResult};
use crate::tracer::{DeviceTracer, RaySoA, Sequential, TraceConfig, TraceError};

/// grow-only allocation size, in units of whole buffers
fn next_power_of_two(value: usize) -> usize {
    value.max(1).next_power_of_two()
}

fn uninitialized_ray() -> Ray {
    Ray {
        position: Vector3::default(),
        direction: Vector3::default(),
        energy: 0.0,
        optical_path_length: 0.0,
        field: ElectricField::default(),
        rng: Rng::default(),
        path_id: -1,
        path_event_id: -1,
        order: 0,
        object_id: -1,
        source_id: -1,
        event_type: EventType::Uninitialized,
    }
}

/// Traces beamlines on the host CPU. The tracer owns its working
/// buffers, so repeated calls on similar workloads do not reallocate.
pub struct CpuTracer {
    pool: rayon::ThreadPool,

    /// input rays of the running batch
    rays: Vec<Ray>,
    /// event slots, one `max_events` sized slice per path
    events: Vec<Ray>,
    /// events per path
    event_counts: Vec<u32>,
    /// exclusive prefix sums of `event_counts`
    event_offsets: Vec<u32>,
    /// maps dense event indices to their sparse slot
    gather_src_indices: Vec<u32>,
}

impl CpuTracer {
    pub fn new() -> Result<Self, TraceError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .build()
            .map_err(|e| TraceError::Device(e.to_string()))?;
        Ok(CpuTracer {
            pool,
            rays: Vec::new(),
            events: Vec::new(),
            event_counts: Vec::new(),
            event_offsets: Vec::new(),
            gather_src_indices: Vec::new(),
        })
    }

    /// ensure buffer capacities for the preferred batch size
    fn reserve(&mut self, batch_size: usize, max_events: usize) {
        let event_len = next_power_of_two(batch_size * max_events);
        if self.events.len() < event_len {
            self.events.resize(event_len, uninitialized_ray());
            self.gather_src_indices.resize(event_len, 0);
        }
        let path_len = next_power_of_two(batch_size);
        if self.rays.len() < path_len {
            self.rays.resize(path_len, uninitialized_ray());
            self.event_counts.resize(path_len, 0);
            self.event_offsets.resize(path_len, 0);
        }
    }

    /// Traces the whole beamline and returns the recorded events in
    /// column layout, in path order.
    pub fn trace(
        &mut self,
        beamline: &Beamline,
        config: &TraceConfig,
    ) -> Result<RaySoA, TraceError> {
        if config.max_events_per_path == 0 {
            return Err(TraceError::Config(
                "max_events_per_path must be at least 1".to_string(),
            ));
        }
        if config.max_batch_size == 0 {
            return Err(TraceError::Config(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if let Some(mask) = &config.record_mask_objects {
            if mask.len() < beamline.num_objects() {
                return Err(TraceError::Config(format!(
                    "object record mask covers {} objects, beamline has {}",
                    mask.len(),
                    beamline.num_objects()
                )));
            }
        }

        let max_events = config.max_events_per_path as usize;
        let num_rays_total = beamline.num_rays_total();
        let preferred_batch_size = num_rays_total.min(config.max_batch_size as usize).max(1);
        let num_batches = (num_rays_total + preferred_batch_size - 1) / preferred_batch_size;

        self.reserve(preferred_batch_size, max_events);

        log::debug!(
            "tracing beamline: {} elements, {} sources, {} rays, {} batches, sequential: {}",
            beamline.elements.len(),
            beamline.sources.len(),
            num_rays_total,
            num_batches,
            matches!(config.sequential, Sequential::Yes),
        );

        // source boundaries as prefix sums over their ray counts
        let mut source_starts: Vec<usize> = Vec::with_capacity(beamline.sources.len());
        let mut acc: usize = 0;
        for source in &beamline.sources {
            source_starts.push(acc);
            acc += source.num_rays();
        }

        let mut soa = RaySoA::default();
        let mut too_many_events = false;

        for batch_index in 0..num_batches {
            let batch_start = batch_index * preferred_batch_size;
            let batch_size = preferred_batch_size.min(num_rays_total - batch_start);

            self.gen_rays_batch(beamline, config, &source_starts, batch_start, batch_size);
            let (num_events_batch, batch_overflowed) =
                self.trace_batch(beamline, config, batch_size, max_events);
            too_many_events |= batch_overflowed;
            self.collect_batch(config, batch_size, max_events, &mut soa);

            log::debug!(
                "batch ({}/{}) with batch size = {}, traced {} events",
                batch_index + 1,
                num_batches,
                batch_size,
                num_events_batch,
            );
        }

        soa.too_many_events = too_many_events;
        if too_many_events {
            log::warn!(
                "capacity of events exceeded. could not record all events! \
                 consider increasing max events."
            );
        }
        Ok(soa)
    }

    /// generate the input rays of one batch, in parallel over paths
    fn gen_rays_batch(
        &mut self,
        beamline: &Beamline,
        config: &TraceConfig,
        source_starts: &[usize],
        batch_start: usize,
        batch_size: usize,
    ) {
        let num_rays_total = beamline.num_rays_total();
        let seed = config.seed;
        let sources = &beamline.sources;
        let rays = &mut self.rays[..batch_size];

        self.pool.install(|| {
            rays.par_iter_mut().enumerate().for_each(|(i, slot)| {
                let path_index = batch_start + i;
                // the last source whose first path index is not past
                // this path; robust against empty sources in between
                let source_index = source_starts.partition_point(|s| *s <= path_index) - 1;
                let local_index = path_index - source_starts[source_index];

                let rng = Rng::new(path_index as u64, num_rays_total as u64, seed);
                *slot = sources[source_index].gen_ray(
                    local_index,
                    path_index as i32,
                    source_index as i32,
                    rng,
                );
            });
        });
    }

    /// dispatch the kernel over all paths of the batch; returns the
    /// batch event total and whether any path overflowed its slots
    fn trace_batch(
        &mut self,
        beamline: &Beamline,
        config: &TraceConfig,
        batch_size: usize,
        max_events: usize,
    ) -> (usize, bool) {
        let args = KernelArgs {
            elements: &beamline.elements,
            material_indices: &beamline.material_tables.indices,
            material_table: &beamline.material_tables.table,
            record_mask: config.record_mask_objects.as_deref(),
            sequential: config.sequential,
            num_sources: beamline.sources.len(),
            bragg_failure: config.bragg_failure,
        };

        let rays = &self.rays[..batch_size];
        let counts = &mut self.event_counts[..batch_size];
        let events = &mut self.events[..batch_size * max_events];

        let overflowed = AtomicBool::new(false);
        self.pool.install(|| {
            events
                .par_chunks_mut(max_events)
                .zip(counts.par_iter_mut())
                .zip(rays.par_iter())
                .for_each(|((slots, count), ray)| {
                    for slot in slots.iter_mut() {
                        slot.event_type = EventType::Uninitialized;
                    }
                    let result: PathResult = trace_path(*ray, &args, slots);
                    *count = result.event_count;
                    if result.too_many_events {
                        overflowed.store(true, Ordering::Relaxed);
                    }
                });
        });

        let num_events = counts.iter().map(|c| *c as usize).sum();
        (num_events, overflowed.into_inner())
    }

    /// compact the sparse event slots and append them to the output
    /// columns
    fn collect_batch(
        &mut self,
        config: &TraceConfig,
        batch_size: usize,
        max_events: usize,
        soa: &mut RaySoA,
    ) {
        // prefix sum over the counts gives each path its output offset
        let mut running: u32 = 0;
        for i in 0..batch_size {
            self.event_offsets[i] = running;
            running += self.event_counts[i];
        }
        let num_events_batch = running as usize;

        // gather indices are computed per path so the gather itself
        // can run over events
        {
            let counts = &self.event_counts[..batch_size];
            let offsets = &self.event_offsets[..batch_size];
            let gather = &mut self.gather_src_indices;
            for path in 0..batch_size {
                for k in 0..counts[path] as usize {
                    gather[offsets[path] as usize + k] = (path * max_events + k) as u32;
                }
            }
        }

        for path in 0..batch_size {
            if self.event_counts[path] > 0 {
                soa.num_paths += 1;
            }
        }

        for dense in 0..num_events_batch {
            let src = self.gather_src_indices[dense] as usize;
            soa.push(&self.events[src], config.record_mask_attrs);
        }
        soa.num_events += num_events_batch;
    }
}

impl DeviceTracer for CpuTracer {
    fn trace(
        &mut self,
        beamline: &Beamline,
        config: &TraceConfig,
    ) -> Result<RaySoA, TraceError> {
        CpuTracer::trace(self, beamline, config)
    }
}
